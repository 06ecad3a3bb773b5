//! Correlation Rule Table
//!
//! The fixed set of cause → effect predicates the pattern detector evaluates.
//! Rules are plain data; adding one does not touch the evaluation code.

use crate::journal::record::Flag;

/// Whether a rule's cause is framed as beneficial or harmful
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Negative,
    Positive,
}

/// A cause → effect predicate pair with display labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationRule {
    pub cause: Flag,
    pub effect: Flag,
    pub cause_label: &'static str,
    pub effect_label: &'static str,
    pub polarity: Polarity,
}

impl CorrelationRule {
    const fn new(
        cause: Flag,
        effect: Flag,
        cause_label: &'static str,
        effect_label: &'static str,
        polarity: Polarity,
    ) -> Self {
        Self {
            cause,
            effect,
            cause_label,
            effect_label,
            polarity,
        }
    }
}

const LOW_SLEEP: &str = "Sleeping < 6h";
const HIGH_STRESS: &str = "High stress";

/// All rules, in tie-break order
pub static RULES: [CorrelationRule; 10] = [
    CorrelationRule::new(Flag::LowSleep, Flag::Headache, LOW_SLEEP, "Headache", Polarity::Negative),
    CorrelationRule::new(Flag::LowSleep, Flag::Fatigue, LOW_SLEEP, "Fatigue", Polarity::Negative),
    CorrelationRule::new(Flag::LowSleep, Flag::BadMood, LOW_SLEEP, "Bad mood", Polarity::Negative),
    CorrelationRule::new(Flag::HighStress, Flag::Headache, HIGH_STRESS, "Headache", Polarity::Negative),
    CorrelationRule::new(Flag::HighStress, Flag::BadMood, HIGH_STRESS, "Bad mood", Polarity::Negative),
    CorrelationRule::new(Flag::HighStress, Flag::LowSleep, HIGH_STRESS, "Poor sleep", Polarity::Negative),
    CorrelationRule::new(Flag::Exercise, Flag::GoodMood, "Exercise", "Good mood", Polarity::Positive),
    CorrelationRule::new(Flag::Exercise, Flag::HighSleep, "Exercise", "Better sleep", Polarity::Positive),
    CorrelationRule::new(Flag::HighSleep, Flag::GoodMood, "Good sleep (7h+)", "Good mood", Polarity::Positive),
    CorrelationRule::new(Flag::LowStress, Flag::GoodMood, "Low stress", "Good mood", Polarity::Positive),
];
