//! Text-generation backend
//!
//! A trait seam plus one concrete HTTP implementation speaking the Gemini
//! `generateContent` protocol. Authentication is a static key in the query
//! string; there is no retry logic — a failed call surfaces immediately and
//! the dialogue layer falls back to an apology.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::{Message, Role};
use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint base URL
    pub endpoint: String,
    /// Static API key
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Text-generation backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a plain-text reply for the given messages
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Gemini `generateContent` backend
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: LlmConfig,
}

impl GeminiBackend {
    /// Create a new backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    /// Fold our message list into the Gemini request shape. System messages
    /// become the `system_instruction`; the rest map user/model roles.
    fn build_request(&self, messages: &[Message]) -> GeminiRequest {
        let system_text: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| GeminiContent {
                role: match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: if system_text.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: "user".to_string(),
                    parts: vec![GeminiPart {
                        text: system_text.join("\n"),
                    }],
                })
            },
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = self.build_request(messages);

        let mut builder = self.client.post(self.api_url()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Text-generation request failed");
            return Err(LlmError::Api(format!("{status}: {body}")));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
