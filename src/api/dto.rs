//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::journal::{Mood, PatternFinding, Prediction, StatsSummary};

// ============================================
// ENTRY DTOs
// ============================================

/// Draft entry request
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub user_id: String,
    /// Free-text check-in
    pub text: String,
    /// Entry date, `YYYY-MM-DD`
    pub date: String,
    /// Optional chronic condition tag
    #[serde(default)]
    pub condition: Option<String>,
    /// Optional condition readings merged into the extracted record
    #[serde(default)]
    pub condition_data: Option<Map<String, Value>>,
}

/// Draft entry response
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub entry_id: String,
    pub extracted_data: Value,
}

/// Confirm request: the (possibly user-edited) record
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub extracted_data: Value,
}

/// Confirm response
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub message: String,
    pub entry_id: String,
}

/// Timeline query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TimelineParams {
    /// `YYYY-MM`
    #[serde(default)]
    pub month: Option<String>,
}

/// One entry in the timeline
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub date: String,
    pub raw_text: String,
    pub tags: Vec<String>,
    pub mood: Mood,
}

/// Timeline response
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub entries: Vec<TimelineEntry>,
}

// ============================================
// PATTERN DTOs
// ============================================

/// Pattern analysis response
#[derive(Debug, Serialize, Deserialize)]
pub struct PatternsResponse {
    pub has_enough_data: bool,
    pub patterns: Vec<PatternFinding>,
    pub stats: Option<StatsSummary>,
    pub predictions: Vec<Prediction>,
}

impl PatternsResponse {
    /// Response for a user below the history threshold
    pub fn not_enough_data() -> Self {
        Self {
            has_enough_data: false,
            patterns: Vec::new(),
            stats: None,
            predictions: Vec::new(),
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Root response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
}

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub services: ServicesHealth,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Per-service health, each "ok" or an error description
#[derive(Debug, Serialize, Deserialize)]
pub struct ServicesHealth {
    pub api: String,
    pub storage: String,
    pub extractor: String,
}

impl ServicesHealth {
    pub fn all_ok(&self) -> bool {
        [&self.api, &self.storage, &self.extractor]
            .iter()
            .all(|s| s.as_str() == "ok")
    }
}
