pub mod adapter;
pub mod http;

use crate::models::Citation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body for `POST {base}/chat`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatQuery {
    pub query: String,
}

/// Native backend answer schema.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub confidence: f64,
}

/// The answer-generation service, seen as an opaque request/response exchange.
///
/// Implementations return the raw success body; the adapter decides how to
/// read it.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, query: &str) -> Result<String, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
    #[error("Decode error: {0}")]
    Decode(String),
}
