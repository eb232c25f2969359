use crate::infra::{AppState, OptimizeOutcome};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use mealwise::discounts::DiscountSource;
use mealwise::planner::{OptimizeRequest, PlanError, Recommendation};
use serde_json::json;
use std::time::Instant;

pub(crate) const UPSTREAM_FAILURE_MESSAGE: &str =
    "We could not fetch discounts right now. Please try again in a few minutes.";

pub(crate) fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/health/detailed", get(detailed_health))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_snapshot))
        .route("/metrics/summary", get(metrics_summary))
        .route("/metrics/prometheus", get(prometheus_endpoint))
        .route("/api/optimize", post(optimize_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn detailed_health(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let planner = &state.planner;
    let cache = planner.source().cache_stats();

    Json(json!({
        "status": if ready { "ok" } else { "starting" },
        "ready": ready,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment.label(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "components": {
            "discount_source": {
                "mode": planner.source().describe(),
                "search_radius_km": planner.default_radius_km(),
                "cache": cache,
            },
            "meal_assistant": {
                "mode": planner.meal_mode(),
                "model": state.assistant_model,
            },
        },
    }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "optimize": state.usage.snapshot(),
    }))
}

pub(crate) async fn metrics_summary(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.usage.snapshot();
    Json(json!({
        "total_requests": snapshot.optimize_requests,
        "success_rate": snapshot.success_rate(),
        "average_latency_ms": snapshot.average_latency_ms,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

pub(crate) async fn prometheus_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn optimize_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            state
                .usage
                .record(OptimizeOutcome::Invalid, started.elapsed());
            let body = json!({
                "success": false,
                "error": "Invalid request body",
                "details": [rejection.body_text()],
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match state.planner.plan(request).await {
        Ok(recommendation) => {
            state.usage.record(
                OptimizeOutcome::Success {
                    empty: recommendation.is_empty(),
                    meal_source: recommendation.meal_source,
                },
                started.elapsed(),
            );
            let body = json!({ "success": true, "recommendation": recommendation });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(PlanError::Validation(errors)) => {
            state
                .usage
                .record(OptimizeOutcome::Invalid, started.elapsed());
            let body = json!({
                "success": false,
                "error": "Invalid request",
                "details": errors.messages(),
            });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(PlanError::Upstream(error)) => {
            tracing::warn!(%error, "discount lookup failed");
            state
                .usage
                .record(OptimizeOutcome::Upstream, started.elapsed());
            let body = json!({
                "success": false,
                "error": UPSTREAM_FAILURE_MESSAGE,
                "recommendation": Recommendation::empty(UPSTREAM_FAILURE_MESSAGE, Utc::now()),
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
