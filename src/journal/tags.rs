//! Timeline tags
//!
//! Flattens a record into the short labels shown on the timeline.

use crate::journal::record::StructuredRecord;
use serde_json::Value;

/// Render display tags for a record
///
/// Order: symptoms, food, sleep quality, stress, exercise, then condition
/// readings sorted by key.
pub fn extract_tags(record: &StructuredRecord) -> Vec<String> {
    let mut tags: Vec<String> = record.symptoms.clone();
    tags.extend(record.food.iter().cloned());

    if let Some(sleep) = record.sleep_quality {
        tags.push(format!("{} sleep", sleep));
    }
    if let Some(stress) = record.stress {
        tags.push(format!("{} stress", stress));
    }
    if record.exercise {
        tags.push("exercise".to_string());
    }

    let mut keys: Vec<&String> = record.condition_data.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(tag) = condition_tag(key, &record.condition_data[key.as_str()]) {
            tags.push(tag);
        }
    }

    tags
}

fn condition_tag(key: &str, value: &Value) -> Option<String> {
    let label = key.replace('_', " ");
    match value {
        Value::Bool(true) => Some(label),
        Value::Number(n) => Some(format!("{} {}", label, n)),
        Value::String(s) if !s.trim().is_empty() => {
            Some(format!("{} {}", label, s.trim().to_lowercase()))
        }
        _ => None,
    }
}
