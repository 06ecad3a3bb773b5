//! # Kōru
//!
//! Health journal intelligence: turns free-text daily check-ins into
//! structured records and finds which habits tend to come before bad (and
//! good) days.
//!
//! ## Features
//!
//! - **Extraction**: Gemini-backed or local keyword extraction of symptoms,
//!   sleep, food, stress, exercise and mood
//! - **Draft/confirm flow**: extracted records are reviewed before they count
//! - **Pattern detection**: ten fixed cause → effect rules with thresholds
//! - **Stats and predictions**: summary statistics and short, actionable tips
//!
//! ## Modules
//!
//! - [`journal`]: Pure analysis core (records, rules, patterns, stats, predictions)
//! - [`extract`]: Text → record extraction backends
//! - [`storage`]: SQLite entry store
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//! - [`import`]: CSV journal import
//!
//! ## Quick Start
//!
//! ```rust
//! use koru::extract::HeuristicExtractor;
//! use koru::journal::analyze;
//!
//! let extractor = HeuristicExtractor::new();
//! let records: Vec<_> = [
//!     "Slept 5 hours, woke up with a headache",
//!     "Only 4 hours of sleep. Headache again and exhausted",
//!     "Slept 8 hours, went for a run, felt great",
//! ]
//! .iter()
//! .map(|text| extractor.extract_record(text))
//! .collect();
//!
//! let analysis = analyze(&records);
//! println!("{} patterns", analysis.patterns.len());
//! ```

pub mod api;
pub mod config;
pub mod extract;
pub mod import;
pub mod journal;
pub mod storage;
