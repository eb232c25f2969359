use async_trait::async_trait;

use super::domain::DiscountItem;
use crate::geo::Location;

/// Anything that can list clearance offers around a point.
#[async_trait]
pub trait DiscountSource: Send + Sync {
    async fn fetch(
        &self,
        origin: Location,
        radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError>;

    /// Short label surfaced by health endpoints.
    fn describe(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum DiscountSourceError {
    #[error("discount provider rate limit exceeded")]
    RateLimited,
    #[error("discount provider timed out")]
    Timeout,
    #[error("discount provider returned HTTP {0}")]
    Status(u16),
    #[error("discount provider unreachable: {0}")]
    Transport(String),
    #[error("discount provider sent an unreadable payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for DiscountSourceError {
    fn from(value: reqwest::Error) -> Self {
        let value = value.without_url();
        if value.is_timeout() {
            Self::Timeout
        } else if value.is_decode() {
            Self::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(value.to_string())
        }
    }
}
