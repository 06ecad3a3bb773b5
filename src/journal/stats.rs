//! Statistics Aggregator
//!
//! Descriptive statistics over a record set: mood and stress distributions,
//! average sleep, exercise rate, and the most frequent symptoms.

use crate::journal::record::{Level, Mood, StructuredRecord};
use crate::journal::rounded_percentage;
use serde::{Deserialize, Serialize};

/// Number of symptoms reported in [`StatsSummary::top_symptoms`]
pub const TOP_SYMPTOMS: usize = 5;

/// Aggregate statistics for a record set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsSummary {
    pub total_entries: u32,
    pub mood_distribution: MoodDistribution,
    /// Mean reported sleep, one decimal; `None` when no record has hours
    pub avg_sleep_hours: Option<f64>,
    /// Percentage of records with exercise
    pub exercise_rate: u32,
    pub stress_distribution: StressDistribution,
    pub top_symptoms: Vec<SymptomCount>,
}

/// Count of records per mood
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodDistribution {
    pub bad: u32,
    pub neutral: u32,
    pub good: u32,
}

impl MoodDistribution {
    pub fn total(&self) -> u32 {
        self.bad + self.neutral + self.good
    }

    fn add(&mut self, mood: Mood) {
        match mood {
            Mood::Bad => self.bad += 1,
            Mood::Neutral => self.neutral += 1,
            Mood::Good => self.good += 1,
        }
    }
}

/// Count of records per stress level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StressDistribution {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl StressDistribution {
    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high
    }

    fn add(&mut self, level: Level) {
        match level {
            Level::Low => self.low += 1,
            Level::Medium => self.medium += 1,
            Level::High => self.high += 1,
        }
    }
}

/// A symptom and how many records mention it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomCount {
    pub name: String,
    pub count: u32,
}

/// Compute statistics over a record set
pub fn compute_stats(records: &[StructuredRecord]) -> StatsSummary {
    let mut mood_distribution = MoodDistribution::default();
    let mut stress_distribution = StressDistribution::default();
    let mut exercise_days = 0usize;
    let mut sleep_total = 0.0;
    let mut sleep_reports = 0usize;
    // Insertion order doubles as the tie-break for equal counts
    let mut symptom_counts: Vec<SymptomCount> = Vec::new();

    for record in records {
        mood_distribution.add(record.mood());
        stress_distribution.add(record.stress_level());

        if record.exercise {
            exercise_days += 1;
        }

        if let Some(hours) = record.sleep_hours {
            sleep_total += hours;
            sleep_reports += 1;
        }

        for symptom in &record.symptoms {
            let name = symptom.to_lowercase();
            match symptom_counts.iter_mut().find(|s| s.name == name) {
                Some(entry) => entry.count += 1,
                None => symptom_counts.push(SymptomCount { name, count: 1 }),
            }
        }
    }

    symptom_counts.sort_by(|a, b| b.count.cmp(&a.count));
    symptom_counts.truncate(TOP_SYMPTOMS);

    let avg_sleep_hours = if sleep_reports > 0 {
        Some(round_one_decimal(sleep_total / sleep_reports as f64))
    } else {
        None
    };

    StatsSummary {
        total_entries: records.len() as u32,
        mood_distribution,
        avg_sleep_hours,
        exercise_rate: rounded_percentage(exercise_days, records.len()),
        stress_distribution,
        top_symptoms: symptom_counts,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
