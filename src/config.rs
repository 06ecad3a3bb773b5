//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `KORU_*` environment variable overrides.

use crate::extract::{GeminiConfig, Provider};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Entry store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("koru").to_string_lossy().to_string())
        .unwrap_or_else(|| "./koru_data".to_string())
}

fn default_database_file() -> String {
    "koru.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

impl StorageConfig {
    /// Resolve into the store's own configuration, expanding a leading `~/`
    pub fn to_store_config(&self) -> crate::storage::StorageConfig {
        let data_dir = match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        };

        crate::storage::StorageConfig {
            data_dir,
            database_file: self.database_file.clone(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Pattern analysis policy
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Confirmed entries required before patterns are computed
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,

    /// Most recent confirmed entries fed to the analysis
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_min_entries() -> usize {
    7
}

fn default_history_limit() -> usize {
    60
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_entries: default_min_entries(),
            history_limit: default_history_limit(),
        }
    }
}

/// Extraction backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub gemini: GeminiSection,
}

fn default_provider() -> String {
    "heuristic".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini: GeminiSection::default(),
        }
    }
}

impl ExtractionConfig {
    /// Parsed provider, if the configured name is known
    pub fn provider(&self) -> Option<Provider> {
        Provider::parse(&self.provider)
    }
}

/// `[extraction.gemini]`
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSection {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_gemini_total_timeout")]
    pub total_timeout_ms: u64,

    #[serde(default = "default_gemini_retries")]
    pub max_retries: u32,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_timeout() -> u64 {
    10_000
}

fn default_gemini_total_timeout() -> u64 {
    25_000
}

fn default_gemini_retries() -> u32 {
    3
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_url(),
            request_timeout_ms: default_gemini_timeout(),
            total_timeout_ms: default_gemini_total_timeout(),
            max_retries: default_gemini_retries(),
        }
    }
}

impl GeminiSection {
    pub fn to_client_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            request_timeout_ms: self.request_timeout_ms,
            total_timeout_ms: self.total_timeout_ms,
            max_retries: self.max_retries,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default config file locations, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("koru").join("config.toml")),
            Some(PathBuf::from("/etc/koru/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file from `paths`
    ///
    /// Missing files are skipped; an existing file that cannot be read or
    /// parsed is an error rather than a silent fallback to defaults.
    pub fn load_first(paths: &[PathBuf]) -> Result<Option<(Self, PathBuf)>, ConfigError> {
        for path in paths {
            if path.exists() {
                let config = Self::load(path)?;
                return Ok(Some((config, path.clone())));
            }
        }
        Ok(None)
    }

    /// Load from default locations with environment overrides
    ///
    /// Returns the file the config came from, or `None` when only defaults
    /// and environment variables were used.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::load_first(&Self::default_paths())? {
            Some((mut config, path)) => {
                config.apply_env_overrides();
                Ok((config, Some(path)))
            }
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Gemini client settings whose retry budget ends before the HTTP
    /// request timeout
    pub fn gemini_client_config(&self) -> GeminiConfig {
        let mut client = self.extraction.gemini.to_client_config();
        let ceiling_ms = (self.api.request_timeout_secs.max(1) * 1000)
            .saturating_sub(GEMINI_TIMEOUT_MARGIN_MS)
            .max(MIN_GEMINI_BUDGET_MS);
        client.total_timeout_ms = client.total_timeout_ms.min(ceiling_ms);
        client.request_timeout_ms = client.request_timeout_ms.min(client.total_timeout_ms);
        client
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = var("KORU_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(host) = var("KORU_API_HOST") {
            self.api.host = host;
        }
        if let Some(p) = var("KORU_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = p;
        }
        if let Some(origins) = var("KORU_CORS_ORIGINS") {
            self.api.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        if let Some(n) = var("KORU_MIN_ENTRIES").and_then(|v| v.parse().ok()) {
            self.analysis.min_entries = n;
        }
        if let Some(n) = var("KORU_HISTORY_LIMIT").and_then(|v| v.parse().ok()) {
            self.analysis.history_limit = n;
        }

        if let Some(provider) = var("KORU_EXTRACTOR") {
            self.extraction.provider = provider;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.extraction.gemini.api_key = key;
        }
        if let Some(model) = var("KORU_GEMINI_MODEL") {
            self.extraction.gemini.model = model;
        }

        if let Some(level) = var("KORU_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("KORU_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Time left for storing the draft and writing the response after extraction
const GEMINI_TIMEOUT_MARGIN_MS: u64 = 2_000;
const MIN_GEMINI_BUDGET_MS: u64 = 500;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Koru Configuration
#
# Environment variables override these settings:
# - KORU_DATA_DIR
# - KORU_API_HOST
# - KORU_API_PORT
# - KORU_CORS_ORIGINS (comma separated)
# - KORU_MIN_ENTRIES
# - KORU_HISTORY_LIMIT
# - KORU_EXTRACTOR
# - GEMINI_API_KEY
# - KORU_GEMINI_MODEL
# - KORU_LOG_LEVEL
# - KORU_LOG_FORMAT

[storage]
# Directory holding the SQLite database
data_dir = "~/.local/share/koru"

# Database file name inside data_dir
database_file = "koru.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8000

# Allowed CORS origins (empty list allows any origin)
cors_origins = ["http://localhost:5173"]

# Request timeout in seconds
request_timeout_secs = 30

[analysis]
# Confirmed entries required before patterns are shown
min_entries = 7

# Most recent confirmed entries included in the analysis
history_limit = 60

[extraction]
# Extraction backend: gemini or heuristic
provider = "heuristic"

[extraction.gemini]
# Gemini API key (prefer the GEMINI_API_KEY environment variable)
api_key = ""

# Model name
model = "gemini-2.5-flash"

# API base URL
base_url = "https://generativelanguage.googleapis.com"

# Timeout of a single attempt (ms)
request_timeout_ms = 10000

# Budget for all attempts and backoff (ms); capped below api.request_timeout_secs
total_timeout_ms = 25000

# Attempts per request
max_retries = 3

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.api.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.analysis.min_entries, 7);
        assert_eq!(config.analysis.history_limit, 60);
        assert_eq!(config.extraction.provider(), Some(Provider::Heuristic));
        assert_eq!(config.storage.database_file, "koru.db");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.analysis.min_entries, 7);
        assert_eq!(config.extraction.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.extraction.gemini.max_retries, 3);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [api]
            port = 9000

            [extraction]
            provider = "gemini"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.extraction.provider(), Some(Provider::Gemini));
        assert_eq!(config.analysis.history_limit, 60);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[api]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\nmin_entries = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.min_entries, 3);

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_first_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&second, "[api]\nport = 9200\n").unwrap();
        std::fs::write(dir.path().join("third.toml"), "[api]\nport = 9300\n").unwrap();

        let paths = vec![first, second.clone(), dir.path().join("third.toml")];
        let (config, source) = Config::load_first(&paths).unwrap().unwrap();
        assert_eq!(source, second);
        assert_eq!(config.api.port, 9200);

        let none = Config::load_first(&[dir.path().join("nope.toml")]).unwrap();
        assert!(none.is_none());
        assert!(Config::load_first(&[]).unwrap().is_none());
    }

    #[test]
    fn test_load_first_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[api\nport = \"eight thousand\"\n").unwrap();
        std::fs::write(&valid, "[api]\nport = 9200\n").unwrap();

        // A broken file earlier in the list must not fall through to later ones
        let result = Config::load_first(&[broken.clone(), valid]);
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, broken),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KORU_API_PORT", "9100"),
            ("KORU_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("KORU_HISTORY_LIMIT", "30"),
            ("KORU_MIN_ENTRIES", "not-a-number"),
            ("GEMINI_API_KEY", "secret"),
            ("KORU_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9100);
        assert_eq!(config.api.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.analysis.history_limit, 30);
        assert_eq!(config.analysis.min_entries, 7);
        assert_eq!(config.extraction.gemini.api_key, "secret");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_store_config_resolution() {
        let storage = StorageConfig {
            data_dir: "/tmp/koru-test".to_string(),
            database_file: "journal.db".to_string(),
        };
        let resolved = storage.to_store_config();
        assert_eq!(resolved.database_path(), PathBuf::from("/tmp/koru-test/journal.db"));
    }

    #[test]
    fn test_gemini_client_config() {
        let mut section = GeminiSection::default();
        section.api_key = "k".to_string();
        let client = section.to_client_config();
        assert_eq!(client.api_key, "k");
        assert_eq!(client.request_timeout_ms, 10_000);
        assert_eq!(client.total_timeout_ms, 25_000);
    }

    #[test]
    fn test_gemini_budget_fits_request_timeout() {
        let config = Config::default();
        let client = config.gemini_client_config();
        assert!(client.total_timeout_ms < config.api.request_timeout_secs * 1000);

        let mut config = Config::parse(
            "[api]\nrequest_timeout_secs = 10\n\n[extraction.gemini]\nrequest_timeout_ms = 30000\ntotal_timeout_ms = 60000\n",
        )
        .unwrap();
        let client = config.gemini_client_config();
        assert_eq!(client.total_timeout_ms, 8_000);
        assert_eq!(client.request_timeout_ms, 8_000);

        config.api.request_timeout_secs = 1;
        assert_eq!(config.gemini_client_config().total_timeout_ms, MIN_GEMINI_BUDGET_MS);
    }
}
