//! Prediction Generator
//!
//! Turns strong findings and summary statistics into short insight cards.
//! Only `high` and `positive` findings produce a card; `med` findings are
//! shown on the patterns list but never messaged directly.

use crate::journal::patterns::{PatternFinding, Strength};
use crate::journal::record::{HIGH_SLEEP_HOURS, LOW_SLEEP_HOURS};
use crate::journal::stats::StatsSummary;
use serde::{Deserialize, Serialize};

/// Maximum number of predictions returned
pub const MAX_PREDICTIONS: usize = 6;

/// Exercise rates below this percentage produce a warning
pub const LOW_EXERCISE_RATE: u32 = 30;

/// Exercise rates at or above this percentage produce a positive insight
pub const HIGH_EXERCISE_RATE: u32 = 50;

/// Tone of a prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Warning,
    Positive,
}

/// A human-readable insight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prediction {
    #[serde(rename = "type")]
    pub kind: PredictionKind,
    pub icon: String,
    pub text: String,
    pub tip: String,
}

impl Prediction {
    fn warning(icon: &str, text: String, tip: String) -> Self {
        Self {
            kind: PredictionKind::Warning,
            icon: icon.to_string(),
            text,
            tip,
        }
    }

    fn positive(icon: &str, text: String, tip: String) -> Self {
        Self {
            kind: PredictionKind::Positive,
            icon: icon.to_string(),
            text,
            tip,
        }
    }
}

/// Generate predictions from findings and statistics
///
/// Pattern-derived insights come first (high warnings, then positives),
/// followed by sleep and exercise insights. At most [`MAX_PREDICTIONS`].
pub fn generate_predictions(patterns: &[PatternFinding], stats: &StatsSummary) -> Vec<Prediction> {
    let mut predictions = Vec::new();

    for finding in patterns.iter().filter(|f| f.strength == Strength::High) {
        predictions.push(Prediction::warning(
            "⚠️",
            format!(
                "{} is followed by {} {}% of the time",
                finding.cause,
                finding.effect.to_lowercase(),
                finding.percentage
            ),
            format!(
                "Try avoiding {} to reduce {}.",
                lower_first(&finding.cause),
                finding.effect.to_lowercase()
            ),
        ));
    }

    for finding in patterns.iter().filter(|f| f.strength == Strength::Positive) {
        predictions.push(Prediction::positive(
            "✨",
            format!(
                "{} goes with {} {}% of the time",
                finding.cause,
                finding.effect.to_lowercase(),
                finding.percentage
            ),
            format!("Keep it up! {} is working for you.", finding.cause),
        ));
    }

    match stats.avg_sleep_hours {
        Some(avg) if avg < LOW_SLEEP_HOURS => predictions.push(Prediction::warning(
            "😴",
            format!("You're averaging only {:.1}h of sleep", avg),
            "Aim for 7-8 hours. A consistent bedtime helps.".to_string(),
        )),
        Some(avg) if avg >= HIGH_SLEEP_HOURS => predictions.push(Prediction::positive(
            "🌙",
            format!("Great sleep! You're averaging {:.1}h per night", avg),
            "Consistent sleep is one of the best things for your health.".to_string(),
        )),
        _ => {}
    }

    if stats.exercise_rate < LOW_EXERCISE_RATE {
        predictions.push(Prediction::warning(
            "🏃",
            format!("You've exercised on only {}% of days", stats.exercise_rate),
            "Even a 20-minute walk can lift your mood and improve sleep.".to_string(),
        ));
    } else if stats.exercise_rate >= HIGH_EXERCISE_RATE {
        predictions.push(Prediction::positive(
            "💪",
            format!("You exercise on {}% of days", stats.exercise_rate),
            "Great consistency! Exercise is boosting your wellbeing.".to_string(),
        ));
    }

    predictions.truncate(MAX_PREDICTIONS);
    predictions
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
