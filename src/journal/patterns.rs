//! Pattern Detector
//!
//! Evaluates every rule in [`RULES`] against a record set and returns the
//! strongest cause → effect findings.
//!
//! A rule needs at least [`MIN_CAUSE_ROWS`] records where its cause holds
//! and an effect rate of at least [`MIN_PERCENTAGE`] to be reported.

use crate::journal::record::Flags;
use crate::journal::rules::{CorrelationRule, Polarity, RULES};
use crate::journal::rounded_percentage;
use serde::{Deserialize, Serialize};

/// Minimum number of cause occurrences for a rule to be evaluated
pub const MIN_CAUSE_ROWS: usize = 2;

/// Findings below this percentage are dropped
pub const MIN_PERCENTAGE: u32 = 40;

/// Negative findings at or above this percentage are `high`
pub const HIGH_PERCENTAGE: u32 = 75;

/// Maximum number of findings returned
pub const MAX_PATTERNS: usize = 5;

/// Strength classification of a finding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    High,
    Med,
    Positive,
}

/// One detected correlation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternFinding {
    /// Cause label, e.g. "Sleeping < 6h"
    pub cause: String,
    /// Effect label, e.g. "Headache"
    pub effect: String,
    /// Records where both cause and effect hold
    pub occurrences: u32,
    /// Records where the cause holds
    pub total: u32,
    /// `occurrences / total` as a rounded percentage
    pub percentage: u32,
    pub strength: Strength,
}

/// Detect correlation patterns across a record set
///
/// Returns at most [`MAX_PATTERNS`] findings sorted by percentage, highest
/// first. Findings with equal percentages keep rule-table order.
pub fn detect_patterns(flags: &[Flags]) -> Vec<PatternFinding> {
    let mut findings: Vec<PatternFinding> = RULES
        .iter()
        .filter_map(|rule| evaluate_rule(rule, flags))
        .collect();

    // sort_by is stable, so ties stay in rule order
    findings.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    findings.truncate(MAX_PATTERNS);

    tracing::debug!(
        records = flags.len(),
        findings = findings.len(),
        "Pattern detection complete"
    );

    findings
}

/// Evaluate a single rule, returning `None` when it is under-sampled or weak
pub fn evaluate_rule(rule: &CorrelationRule, flags: &[Flags]) -> Option<PatternFinding> {
    let cause_rows: Vec<&Flags> = flags.iter().filter(|f| f.get(rule.cause)).collect();
    let total = cause_rows.len();
    if total < MIN_CAUSE_ROWS {
        return None;
    }

    let occurrences = cause_rows.iter().filter(|f| f.get(rule.effect)).count();
    let percentage = rounded_percentage(occurrences, total);
    if percentage < MIN_PERCENTAGE {
        return None;
    }

    Some(PatternFinding {
        cause: rule.cause_label.to_string(),
        effect: rule.effect_label.to_string(),
        occurrences: occurrences as u32,
        total: total as u32,
        percentage,
        strength: classify(rule.polarity, percentage),
    })
}

fn classify(polarity: Polarity, percentage: u32) -> Strength {
    match polarity {
        Polarity::Positive => Strength::Positive,
        Polarity::Negative if percentage >= HIGH_PERCENTAGE => Strength::High,
        Polarity::Negative => Strength::Med,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::record::{Flag, Level, Mood, StructuredRecord};

    fn record(hours: Option<f64>, symptoms: &[&str]) -> StructuredRecord {
        StructuredRecord {
            sleep_hours: hours,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn flags_of(records: &[StructuredRecord]) -> Vec<Flags> {
        records.iter().map(StructuredRecord::flags).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_patterns(&[]).is_empty());
    }

    #[test]
    fn test_low_sleep_headache_scenario() {
        let mut records = vec![record(Some(5.0), &["headache"]); 5];
        records.extend(vec![record(Some(8.0), &[]); 2]);

        let findings = detect_patterns(&flags_of(&records));
        let headache = findings
            .iter()
            .find(|f| f.cause == "Sleeping < 6h" && f.effect == "Headache")
            .expect("low sleep -> headache finding");

        assert_eq!(
            *headache,
            PatternFinding {
                cause: "Sleeping < 6h".to_string(),
                effect: "Headache".to_string(),
                occurrences: 5,
                total: 5,
                percentage: 100,
                strength: Strength::High,
            }
        );
    }

    #[test]
    fn test_exercise_good_mood_scenario() {
        let mut records = vec![
            StructuredRecord {
                exercise: true,
                mood: Some(Mood::Good),
                ..Default::default()
            };
            3
        ];
        records.push(StructuredRecord {
            exercise: true,
            mood: Some(Mood::Bad),
            ..Default::default()
        });

        let findings = detect_patterns(&flags_of(&records));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].cause, "Exercise");
        assert_eq!(findings[0].effect, "Good mood");
        assert_eq!(findings[0].occurrences, 3);
        assert_eq!(findings[0].total, 4);
        assert_eq!(findings[0].percentage, 75);
        assert_eq!(findings[0].strength, Strength::Positive);
    }

    #[test]
    fn test_single_cause_row_is_skipped() {
        let records = vec![record(Some(4.0), &["headache"]), record(Some(8.0), &[])];
        let findings = detect_patterns(&flags_of(&records));
        assert!(findings.iter().all(|f| f.cause != "Sleeping < 6h"));
    }

    #[test]
    fn test_weak_correlation_is_dropped() {
        // 1 of 3 = 33%
        let records = vec![
            record(Some(5.0), &["headache"]),
            record(Some(5.0), &[]),
            record(Some(5.0), &[]),
        ];
        let rule = &RULES[0];
        assert_eq!(rule.effect, Flag::Headache);
        assert!(evaluate_rule(rule, &flags_of(&records)).is_none());
    }

    #[test]
    fn test_medium_strength_boundary() {
        // 2 of 5 = 40% qualifies as med
        let mut records = vec![record(Some(5.0), &["headache"]); 2];
        records.extend(vec![record(Some(5.0), &[]); 3]);
        let finding = evaluate_rule(&RULES[0], &flags_of(&records)).unwrap();
        assert_eq!(finding.percentage, 40);
        assert_eq!(finding.strength, Strength::Med);

        // 3 of 4 = 75% is high
        let mut records = vec![record(Some(5.0), &["headache"]); 3];
        records.push(record(Some(5.0), &[]));
        let finding = evaluate_rule(&RULES[0], &flags_of(&records)).unwrap();
        assert_eq!(finding.strength, Strength::High);
    }

    #[test]
    fn test_positive_rules_never_high_or_med() {
        // Exercise with good mood only 1 of 2 times (50%)
        let records = vec![
            StructuredRecord {
                exercise: true,
                stress: Some(Level::Low),
                mood: Some(Mood::Good),
                ..Default::default()
            },
            StructuredRecord {
                exercise: true,
                stress: Some(Level::Low),
                ..Default::default()
            },
        ];

        let findings = detect_patterns(&flags_of(&records));
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.strength == Strength::Positive));
    }

    #[test]
    fn test_sorted_and_truncated() {
        // Every negative rule and several positive ones fire
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(StructuredRecord {
                sleep_hours: Some(4.0),
                stress: Some(Level::High),
                mood: Some(Mood::Bad),
                symptoms: if i % 2 == 0 {
                    vec!["headache".to_string(), "fatigue".to_string()]
                } else {
                    vec!["fatigue".to_string()]
                },
                ..Default::default()
            });
        }
        for _ in 0..4 {
            records.push(StructuredRecord {
                sleep_hours: Some(8.0),
                exercise: true,
                stress: Some(Level::Low),
                mood: Some(Mood::Good),
                ..Default::default()
            });
        }

        let findings = detect_patterns(&flags_of(&records));
        assert_eq!(findings.len(), MAX_PATTERNS);
        assert!(findings
            .windows(2)
            .all(|w| w[0].percentage >= w[1].percentage));
        for f in &findings {
            assert!(f.occurrences <= f.total);
            assert!(f.percentage <= 100);
        }

        // Ties at 100% keep rule order: fatigue rule precedes bad mood rule
        assert_eq!(findings[0].effect, "Fatigue");
        assert_eq!(findings[1].effect, "Bad mood");
    }
}
