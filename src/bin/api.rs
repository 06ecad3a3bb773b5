//! Koru API Server
//!
//! Run with: cargo run --bin koru-api
//!
//! # Configuration
//!
//! Loaded from `--config <path>` or the default locations
//! (`~/.config/koru/config.toml`, `/etc/koru/config.toml`, `./config.toml`),
//! then overridden by environment variables. A config file that exists but
//! cannot be parsed stops startup instead of falling back to defaults.
//!
//! Environment variables:
//! - `KORU_DATA_DIR`, `KORU_API_HOST`, `KORU_API_PORT`, `KORU_CORS_ORIGINS`
//! - `KORU_MIN_ENTRIES`, `KORU_HISTORY_LIMIT`
//! - `KORU_EXTRACTOR` (`gemini` or `heuristic`), `GEMINI_API_KEY`
//! - `KORU_LOG_LEVEL`, `KORU_LOG_FORMAT` (`pretty` or `json`)
//! - `RUST_LOG`: overrides the configured log level

use koru::api::{serve, ApiConfig, AppState};
use koru::config::{Config, LoggingConfig};
use koru::extract::{build_extractor, Extractor, HeuristicExtractor, Provider};
use koru::storage::EntryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = match config_path_arg() {
        Some(path) => Config::load_with_env(&path).map(|config| (config, Some(path))),
        None => Config::load_default(),
    };

    let (config, source) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            init_logging(&Config::from_env().logging);
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    init_logging(&config.logging);

    tracing::info!("Starting Koru API server v{}", env!("CARGO_PKG_VERSION"));
    match source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    // Initialize entry store
    let store_config = config.storage.to_store_config();
    tracing::info!("Database: {:?}", store_config.database_path());
    let store = Arc::new(EntryStore::open(&store_config)?);

    // Select extraction backend
    let extractor = select_extractor(&config);
    tracing::info!("Extractor: {}", extractor.name());

    startup_checks(&store, extractor.as_ref()).await;

    let api_config = ApiConfig::from(&config);
    let state = AppState::new(store, extractor, api_config.clone());

    serve(state, &api_config).await?;

    Ok(())
}

/// `--config <path>` or `--config=<path>`
fn config_path_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("koru={},tower_http=info", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Falls back to the local extractor when the configured one cannot be built
fn select_extractor(config: &Config) -> Arc<dyn Extractor> {
    let provider = config.extraction.provider().unwrap_or_else(|| {
        tracing::warn!(
            "Unknown extraction provider '{}', using heuristic",
            config.extraction.provider
        );
        Provider::Heuristic
    });

    match build_extractor(provider, config.gemini_client_config()) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::warn!("Extractor unavailable: {} (falling back to heuristic)", e);
            Arc::new(HeuristicExtractor::new())
        }
    }
}

/// Connectivity checks; failures are logged, never fatal
async fn startup_checks(store: &EntryStore, extractor: &dyn Extractor) {
    match store.ping().await {
        Ok(()) => tracing::info!("Database connection verified"),
        Err(e) => tracing::error!("Database check failed: {}", e),
    }

    match extractor.health_check().await {
        Ok(()) => tracing::info!("Extractor '{}' reachable", extractor.name()),
        Err(e) => tracing::warn!(
            "Extractor '{}' not reachable: {} (check-ins will fail until it recovers)",
            extractor.name(),
            e
        ),
    }
}
