//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::Config;
use crate::extract::Extractor;
use crate::storage::EntryStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Journal entry store
    pub store: Arc<EntryStore>,
    /// Free text → structured record
    pub extractor: Arc<dyn Extractor>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<EntryStore>, extractor: Arc<dyn Extractor>, config: ApiConfig) -> Self {
        Self {
            store,
            extractor,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Confirmed entries needed before patterns are computed
    pub min_entries: usize,
    /// Most recent confirmed entries fed to the analysis
    pub history_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            min_entries: 7,
            history_limit: 60,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            cors_origins: config.api.cors_origins.clone(),
            request_timeout_secs: config.api.request_timeout_secs,
            min_entries: config.analysis.min_entries,
            history_limit: config.analysis.history_limit,
        }
    }
}
