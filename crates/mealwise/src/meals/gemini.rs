use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::domain::{MealContext, MealSuggestion};
use super::parser::parse_suggestions;
use super::prompt::build_prompt;
use super::{MealSuggester, MealSuggestionError};
use crate::config::AssistantConfig;

/// Meal suggestions from a hosted Gemini model via `generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiMealSuggester {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiMealSuggester {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MealSuggestionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MealSuggestionError::from)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &AssistantConfig) -> Result<Option<Self>, MealSuggestionError> {
        config
            .api_key
            .as_ref()
            .map(|key| {
                Self::new(
                    &config.api_base_url,
                    &config.model,
                    key,
                    config.request_timeout,
                )
            })
            .transpose()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl MealSuggester for GeminiMealSuggester {
    async fn suggest(
        &self,
        context: &MealContext,
    ) -> Result<Vec<MealSuggestion>, MealSuggestionError> {
        let prompt = build_prompt(context);
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "requesting meal ideas");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MealSuggestionError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body.into_text().ok_or(MealSuggestionError::Empty)?;
        let suggestions = parse_suggestions(&text, &context.meals)?;
        tracing::info!(model = %self.model, count = suggestions.len(), "model suggested meals");
        Ok(suggestions)
    }

    fn describe(&self) -> &'static str {
        "generative"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[{\"name\": "}, {"text": "\"Soup\"}]"}]}}]}"#,
        )
        .expect("response parses");
        assert_eq!(body.into_text().as_deref(), Some(r#"[{"name": "Soup"}]"#));
    }

    #[test]
    fn blocked_reply_has_no_text() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
                .expect("response parses");
        assert!(body.into_text().is_none());
    }

    #[test]
    fn disabled_without_api_key() {
        let suggester =
            GeminiMealSuggester::from_config(&AssistantConfig::default()).expect("config valid");
        assert!(suggester.is_none());
    }
}
