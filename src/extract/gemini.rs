//! Gemini REST API Client
//!
//! Sends check-in text to Gemini's `generateContent` endpoint in JSON mode
//! and parses the reply into a structured record.

use super::{ExtractError, Extractor};
use crate::journal::StructuredRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Prompt sent for every extraction; `{text}` is replaced with the check-in
pub const EXTRACTION_PROMPT: &str = r#"
Extract health variables from the following user text.
Return ONLY a valid JSON object with this exact structure:
{
  "symptoms": ["headache", "fatigue"],
  "sleep": "low | medium | high",
  "sleep_hours": 5,
  "food": ["pizza", "coffee"],
  "stress": "low | medium | high",
  "exercise": true,
  "mood": "bad | neutral | good"
}

Rules:
- symptoms: array of strings, empty [] if none mentioned
- sleep: infer quality from context if hours not explicit
- sleep_hours: integer or null if unknown
- food: array of foods/drinks mentioned, empty [] if none
- stress: infer from context if not explicit
- exercise: true/false, false if not mentioned
- mood: infer from overall tone

User text: "{text}"
"#;

const PING_PROMPT: &str = "Reply with the single word: ok";

/// Longest `Retry-After` wait honored before the next attempt
pub const MAX_RETRY_AFTER_SECS: u64 = 5;

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub base_url: String,
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Timeout of a single attempt in milliseconds
    pub request_timeout_ms: u64,
    /// Budget for all attempts and waits between them, in milliseconds
    pub total_timeout_ms: u64,
    /// Maximum attempts per request
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            request_timeout_ms: 10_000,
            total_timeout_ms: 25_000,
            max_retries: 3,
        }
    }
}

/// Extractor backed by the Gemini API
pub struct GeminiExtractor {
    client: Client,
    config: GeminiConfig,
}

impl GeminiExtractor {
    /// Create a new client with the given configuration
    pub fn new(config: GeminiConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Run a prompt and return the first candidate's text
    ///
    /// Timeouts, connection failures, rate limits and 5xx responses are
    /// retried with quadratic backoff (or the server's `Retry-After`, capped
    /// at [`MAX_RETRY_AFTER_SECS`]); other API errors fail immediately. No
    /// attempt starts or runs past `total_timeout_ms`.
    pub async fn generate(&self, prompt: &str, json_mode: bool) -> Result<String, ExtractError> {
        let url = self.endpoint();
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: json_mode.then(|| "application/json".to_string()),
                temperature: 0.0,
            },
        };

        let budget = Duration::from_millis(self.config.total_timeout_ms);
        let per_attempt = Duration::from_millis(self.config.request_timeout_ms);
        let started = Instant::now();
        let mut last_error = ExtractError::Timeout;
        let mut retry_after: Option<Duration> = None;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                let delay = retry_after.take().unwrap_or_else(|| backoff_delay(attempt));
                if started.elapsed() + delay >= budget {
                    tracing::warn!(attempt, "Gemini retry budget exhausted");
                    break;
                }
                tokio::time::sleep(delay).await;
            }

            let Some(remaining) = budget.checked_sub(started.elapsed()).filter(|r| !r.is_zero())
            else {
                break;
            };

            let response = match self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .timeout(per_attempt.min(remaining))
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    last_error = classify_transport_error(e);
                    tracing::warn!(attempt, error = %last_error, "Gemini request failed");
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let reply: GenerateResponse = response.json().await?;
                return reply.first_text().ok_or(ExtractError::EmptyResponse);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(retry_after_delay);
                last_error = ExtractError::RateLimited;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            let error = ExtractError::ApiError {
                status: status.as_u16(),
                message: text,
            };

            if status.is_server_error() {
                tracing::warn!(attempt, error = %error, "Gemini server error");
                last_error = error;
                continue;
            }

            return Err(error);
        }

        Err(last_error)
    }
}

/// Backoff before retry `attempt`: 1s, 4s, 9s...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt).pow(2))
}

/// Wait requested by a `Retry-After: <seconds>` header, capped
fn retry_after_delay(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}

#[async_trait]
impl Extractor for GeminiExtractor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn extract(&self, text: &str) -> Result<StructuredRecord, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyText);
        }

        let prompt = EXTRACTION_PROMPT.replace("{text}", text);
        let reply = self.generate(&prompt, true).await?;
        let record = parse_extraction(&reply)?;

        tracing::debug!(
            model = %self.config.model,
            symptoms = record.symptoms.len(),
            "Gemini extraction complete"
        );

        Ok(record)
    }

    async fn health_check(&self) -> Result<(), ExtractError> {
        self.generate(PING_PROMPT, false).await.map(|_| ())
    }
}

/// Parse a model reply into a record
///
/// Tolerates surrounding whitespace and a Markdown code fence.
pub fn parse_extraction(reply: &str) -> Result<StructuredRecord, ExtractError> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: Value =
        serde_json::from_str(body).map_err(|e| ExtractError::InvalidJson(e.to_string()))?;

    Ok(StructuredRecord::from_value(&value)?)
}

fn classify_transport_error(e: reqwest::Error) -> ExtractError {
    if e.is_timeout() {
        ExtractError::Timeout
    } else if e.is_connect() {
        ExtractError::Unavailable
    } else {
        ExtractError::Request(e)
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}
