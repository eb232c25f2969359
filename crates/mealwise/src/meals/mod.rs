//! Meal ideas built around the discounted basket.
//!
//! The generative suggester is best effort: its reply is free text and may not
//! parse. Callers fall back to [`RuleBasedMealSuggester`] in that case.

pub mod domain;
mod fallback;
mod gemini;
mod parser;
mod prompt;

use async_trait::async_trait;

pub use domain::{MealContext, MealIngredient, MealSource, MealSuggestion};
pub use fallback::RuleBasedMealSuggester;
pub use gemini::GeminiMealSuggester;
pub use parser::parse_suggestions;
pub use prompt::build_prompt;

#[async_trait]
pub trait MealSuggester: Send + Sync {
    async fn suggest(
        &self,
        context: &MealContext,
    ) -> Result<Vec<MealSuggestion>, MealSuggestionError>;

    fn describe(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum MealSuggestionError {
    #[error("model request timed out")]
    Timeout,
    #[error("model endpoint returned HTTP {0}")]
    Status(u16),
    #[error("model endpoint unreachable: {0}")]
    Transport(String),
    #[error("model reply contained no usable JSON")]
    Unparseable,
    #[error("model reply contained no meal suggestions")]
    Empty,
}

// The request URL carries the API key, so it never reaches error text.
impl From<reqwest::Error> for MealSuggestionError {
    fn from(value: reqwest::Error) -> Self {
        let value = value.without_url();
        if value.is_timeout() {
            Self::Timeout
        } else if value.is_decode() {
            Self::Unparseable
        } else {
            Self::Transport(value.to_string())
        }
    }
}
