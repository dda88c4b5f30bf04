//! Cohere generate-endpoint payloads.

use serde::{Deserialize, Serialize};

/// Request body for `/v1/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
pub struct Generation {
    pub text: Option<String>,
}
