use super::types::{GenerateRequest, GenerateResponse};
use crate::ai::{send_json, usable_text, TextGenerationService};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";

/// Client for Cohere's `generate` endpoint.
pub struct CohereTextClient {
    client: Client,
    api_key: String,
    model: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl CohereTextClient {
    pub fn new(api_key: String, model: Option<String>, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: Option<String>,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl TextGenerationService for CohereTextClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        tracing::debug!("Sending generate request to Cohere ({} max tokens)", max_tokens);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens,
        };

        let builder = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        let response: GenerateResponse = send_json("Cohere", builder).await?;

        usable_text(
            "Cohere",
            response.generations.into_iter().next().and_then(|g| g.text),
        )
    }
}
