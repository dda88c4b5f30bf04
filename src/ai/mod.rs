//! Generative-text integration
//!
//! A narrow prompt-in, text-out contract ([`TextGenerationService`]) with one
//! client per provider, plus the [`ContentGenerator`] that turns an applicant
//! and a job description into a summary and a skills list.

pub mod cohere;
pub mod content;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use cohere::CohereTextClient;
pub use content::{normalize_skills, ContentGenerator, SKILLS_MAX_TOKENS, SUMMARY_MAX_TOKENS};
pub use gemini::GeminiTextClient;
pub use mock::MockTextGenerator;
pub use openai::OpenAiTextClient;

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Generate text for `prompt`, spending at most `max_tokens` output tokens.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Send a prepared provider request and decode its JSON body.
pub(crate) async fn send_json<Resp: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<Resp> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("Failed to send request to {}: {}", provider, e);
        e
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        tracing::error!("{} API error (status {}): {}", provider, status, error_text);
        return Err(Error::Generation(format!(
            "{} API error (status {}): {}",
            provider, status, error_text
        )));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse {} response: {}\nBody: {}", provider, e, body);
        Error::Generation(format!("Failed to parse {} response: {}", provider, e))
    })
}

/// Trim provider output, rejecting missing or blank text.
pub(crate) fn usable_text(provider: &str, text: Option<String>) -> Result<String> {
    match text.map(|t| t.trim().to_string()) {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(Error::Generation(format!(
            "{} returned empty text",
            provider
        ))),
        None => Err(Error::Generation(format!(
            "No text in {} response",
            provider
        ))),
    }
}
