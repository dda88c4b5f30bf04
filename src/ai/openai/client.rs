use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::ai::{send_json, usable_text, TextGenerationService};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiTextClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiTextClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
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
impl TextGenerationService for OpenAiTextClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        tracing::debug!("Sending chat completion request to OpenAI");

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_completion_tokens: max_tokens,
        };

        let builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        let response: ChatCompletionResponse = send_json("OpenAI", builder).await?;

        usable_text(
            "OpenAI",
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer, model: &str) -> OpenAiTextClient {
        OpenAiTextClient::new("test-key".to_string(), model.to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "Python, SQL, Communication"
                    },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let text = make_client(&server, "gpt-4o-mini")
            .generate("List skills", 60)
            .await
            .unwrap();
        assert_eq!(text, "Python, SQL, Communication");
    }

    #[tokio::test]
    async fn test_generate_sends_model_and_budget() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "custom-model",
                "max_completion_tokens": 60,
                "messages": [{ "role": "user", "content": "List skills" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "SQL" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server, "custom-model")
            .generate("List skills", 60)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = make_client(&server, "gpt-4o-mini")
            .generate("p", 60)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_null_content_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": null },
                    "finish_reason": "length"
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server, "gpt-4o-mini")
            .generate("p", 60)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
