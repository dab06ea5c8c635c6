//! Text-generation integration
//!
//! One outbound concern: a single call per turn to an external
//! text-generation service. The response is plain text that may carry a
//! completion sentinel or a JSON object; both are treated as untrusted.

pub mod backend;
pub mod extraction;
pub mod prompt;

pub use backend::{GeminiBackend, LlmBackend, LlmConfig};
pub use extraction::parse_booking_info;
pub use prompt::{Message, Role, BOOKING_READY_SENTINEL};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for busgo_core::Error {
    fn from(err: LlmError) -> Self {
        busgo_core::Error::Llm(err.to_string())
    }
}
