use super::TextGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory text generator.
///
/// Responses are picked by the first registered needle found in the prompt.
#[derive(Clone)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, needle: &str, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((needle.to_string(), response.to_string()));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Prompt and token budget of every call, in call order.
    pub fn get_calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Generation(message));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| "Generated text".to_string()))
    }
}
