//! Extraction
//!
//! Turns a free-text check-in into a [`StructuredRecord`]. Two backends:
//!
//! - **GeminiExtractor**: asks the Gemini API for a JSON record
//! - **HeuristicExtractor**: local keyword and regex matching, no network
//!
//! The analysis core never depends on which backend produced a record.

mod gemini;
mod heuristic;

pub use gemini::{parse_extraction, GeminiConfig, GeminiExtractor, EXTRACTION_PROMPT};
pub use heuristic::HeuristicExtractor;

use crate::journal::{RecordError, StructuredRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Common trait for all extraction backends
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &str;

    /// Extract a structured record from free text
    async fn extract(&self, text: &str) -> Result<StructuredRecord, ExtractError>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<(), ExtractError> {
        Ok(())
    }
}

/// Which backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Heuristic,
}

impl Provider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "heuristic" | "local" => Some(Provider::Heuristic),
            _ => None,
        }
    }
}

/// Build the configured extractor
pub fn build_extractor(
    provider: Provider,
    gemini: GeminiConfig,
) -> Result<Arc<dyn Extractor>, ExtractError> {
    match provider {
        Provider::Gemini => {
            if gemini.api_key.trim().is_empty() {
                return Err(ExtractError::NotConfigured(
                    "Gemini API key is missing (set GEMINI_API_KEY)".to_string(),
                ));
            }
            Ok(Arc::new(GeminiExtractor::new(gemini)?))
        }
        Provider::Heuristic => Ok(Arc::new(HeuristicExtractor::new())),
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Extraction service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    #[error("Extractor not configured: {0}")]
    NotConfigured(String),

    #[error("Nothing to extract: text is empty")]
    EmptyText,
}
