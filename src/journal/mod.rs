//! Journal Analysis
//!
//! Pattern detection and statistics over a user's structured journal
//! records. Everything in this module is pure and synchronous: callers
//! supply the records and receive the analysis, no I/O happens here.
//!
//! ## Pipeline
//!
//! ```text
//! records ─┬─> Flags ─> Pattern Detector ─┐
//!          │                              ├─> Prediction Generator
//!          └────────> Stats Aggregator ───┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use koru::journal::{analyze, StructuredRecord};
//! use serde_json::json;
//!
//! let records: Vec<StructuredRecord> = (0..7)
//!     .map(|i| {
//!         StructuredRecord::from_value(&json!({
//!             "sleep_hours": if i < 5 { 5 } else { 8 },
//!             "symptoms": if i < 5 { vec!["headache"] } else { vec![] },
//!         }))
//!         .unwrap()
//!     })
//!     .collect();
//!
//! let analysis = analyze(&records);
//! assert_eq!(analysis.patterns[0].cause, "Sleeping < 6h");
//! assert_eq!(analysis.stats.total_entries, 7);
//! ```

pub mod patterns;
pub mod predictions;
pub mod record;
pub mod rules;
pub mod stats;
pub mod tags;

pub use patterns::{detect_patterns, PatternFinding, Strength};
pub use predictions::{generate_predictions, Prediction, PredictionKind};
pub use record::{
    Flag, Flags, Level, Mood, RecordError, StructuredRecord, HIGH_SLEEP_HOURS, LOW_SLEEP_HOURS,
};
pub use rules::{CorrelationRule, Polarity, RULES};
pub use stats::{compute_stats, MoodDistribution, StatsSummary, StressDistribution, SymptomCount};
pub use tags::extract_tags;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full analysis of a record set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    pub patterns: Vec<PatternFinding>,
    pub stats: StatsSummary,
    pub predictions: Vec<Prediction>,
}

/// Analyze a record set
///
/// Records are expected most-recent-first, but the result does not depend
/// on order beyond tie-breaking in the symptom ranking. No minimum size is
/// enforced here; deciding whether there is enough history is the caller's
/// job.
pub fn analyze(records: &[StructuredRecord]) -> Analysis {
    let flags: Vec<Flags> = records.iter().map(Flags::from_record).collect();

    let patterns = detect_patterns(&flags);
    let stats = compute_stats(records);
    let predictions = generate_predictions(&patterns, &stats);

    tracing::debug!(
        records = records.len(),
        patterns = patterns.len(),
        predictions = predictions.len(),
        "Journal analysis complete"
    );

    Analysis {
        patterns,
        stats,
        predictions,
    }
}

/// Parse raw JSON records and analyze them
///
/// Fails on the first value that is not a JSON object.
pub fn analyze_values(values: &[Value]) -> Result<Analysis, RecordError> {
    let records = values
        .iter()
        .map(StructuredRecord::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(analyze(&records))
}

/// `part / whole` as a percentage rounded half-up; 0 for an empty whole
pub(crate) fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part * 200 + whole) / (whole * 2)) as u32
}
