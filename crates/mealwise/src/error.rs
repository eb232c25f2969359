use crate::config::ConfigError;
use crate::discounts::DiscountSourceError;
use crate::meals::MealSuggestionError;
use crate::planner::PlanError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Discounts(DiscountSourceError),
    Assistant(MealSuggestionError),
    Plan(PlanError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Discounts(err) => write!(f, "discount source error: {}", err),
            AppError::Assistant(err) => write!(f, "meal assistant error: {}", err),
            AppError::Plan(err) => write!(f, "planning error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Discounts(err) => Some(err),
            AppError::Assistant(err) => Some(err),
            AppError::Plan(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Plan(PlanError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Plan(PlanError::Upstream(_)) | AppError::Discounts(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Assistant(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DiscountSourceError> for AppError {
    fn from(value: DiscountSourceError) -> Self {
        Self::Discounts(value)
    }
}

impl From<MealSuggestionError> for AppError {
    fn from(value: MealSuggestionError) -> Self {
        Self::Assistant(value)
    }
}

impl From<PlanError> for AppError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}
