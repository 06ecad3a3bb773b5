//! Record Model
//!
//! The structured record extracted from one journal entry, its lenient
//! parsing from JSON, and the derived boolean flags used as rule predicates.
//!
//! All default resolution happens here. Downstream components read
//! [`StructuredRecord::mood`], [`StructuredRecord::stress_level`] and
//! [`Flags`] instead of inspecting raw optional fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Sleep hours below this count as low sleep
pub const LOW_SLEEP_HOURS: f64 = 6.0;

/// Sleep hours at or above this count as good sleep
pub const HIGH_SLEEP_HOURS: f64 = 7.0;

/// Three-step level used for sleep quality and stress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Parse a level name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Level::Low),
            "medium" | "med" | "moderate" => Some(Level::Medium),
            "high" => Some(Level::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall mood of an entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Bad,
    #[default]
    Neutral,
    Good,
}

impl Mood {
    /// Parse a mood name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bad" => Some(Mood::Bad),
            "neutral" => Some(Mood::Neutral),
            "good" => Some(Mood::Good),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One journal entry's extracted health variables
///
/// Every field is optional in the JSON form. Absent or malformed fields
/// resolve to defaults when the record is parsed with
/// [`StructuredRecord::from_value`]; only a non-object value is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredRecord {
    /// Lower-cased, de-duplicated symptom names
    pub symptoms: Vec<String>,
    /// Self-reported or inferred sleep quality
    #[serde(rename = "sleep", skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<Level>,
    /// Hours slept, never negative
    pub sleep_hours: Option<f64>,
    /// Foods and drinks mentioned
    pub food: Vec<String>,
    /// Stress level, `None` when not reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<Level>,
    pub exercise: bool,
    /// Mood, `None` when not reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Chronic condition tag (e.g. "diabetes")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Free-form condition readings, only used for tag rendering
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub condition_data: Map<String, Value>,
}

impl StructuredRecord {
    /// Parse a record from arbitrary JSON
    ///
    /// Fails only when `value` is not an object. Unknown keys are ignored and
    /// ill-typed fields fall back to their defaults.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RecordError::NotAMapping(json_type_name(value)))?;

        let mut symptoms: Vec<String> = Vec::new();
        for symptom in string_list(obj.get("symptoms")) {
            let symptom = symptom.to_lowercase();
            if !symptoms.contains(&symptom) {
                symptoms.push(symptom);
            }
        }

        let sleep_quality = obj
            .get("sleep")
            .or_else(|| obj.get("sleep_quality"))
            .and_then(Value::as_str)
            .and_then(Level::parse);

        let condition = obj
            .get("condition")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let condition_data = obj
            .get("condition_data")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            symptoms,
            sleep_quality,
            sleep_hours: obj.get("sleep_hours").and_then(parse_hours),
            food: string_list(obj.get("food")),
            stress: obj.get("stress").and_then(Value::as_str).and_then(Level::parse),
            exercise: obj.get("exercise").map(is_truthy).unwrap_or(false),
            mood: obj.get("mood").and_then(Value::as_str).and_then(Mood::parse),
            condition,
            condition_data,
        })
    }

    /// Serialize back to the JSON shape stored alongside entries
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Mood with the neutral default applied
    pub fn mood(&self) -> Mood {
        self.mood.unwrap_or_default()
    }

    /// Stress with the medium default applied
    pub fn stress_level(&self) -> Level {
        self.stress.unwrap_or(Level::Medium)
    }

    /// Case-insensitive symptom membership
    pub fn has_symptom(&self, name: &str) -> bool {
        self.symptoms.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    /// Derive the rule predicates for this record
    pub fn flags(&self) -> Flags {
        Flags::from_record(self)
    }
}

impl TryFrom<Value> for StructuredRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl<'de> Deserialize<'de> for StructuredRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// A boolean derived from one record and used as a rule predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    LowSleep,
    HighSleep,
    HighStress,
    LowStress,
    Exercise,
    GoodMood,
    BadMood,
    Headache,
    Fatigue,
}

impl Flag {
    pub fn name(&self) -> &'static str {
        match self {
            Flag::LowSleep => "low_sleep",
            Flag::HighSleep => "high_sleep",
            Flag::HighStress => "high_stress",
            Flag::LowStress => "low_stress",
            Flag::Exercise => "exercise",
            Flag::GoodMood => "good_mood",
            Flag::BadMood => "bad_mood",
            Flag::Headache => "headache",
            Flag::Fatigue => "fatigue",
        }
    }
}

/// The full flag set for one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub low_sleep: bool,
    pub high_sleep: bool,
    pub high_stress: bool,
    pub low_stress: bool,
    pub exercise: bool,
    pub good_mood: bool,
    pub bad_mood: bool,
    pub headache: bool,
    pub fatigue: bool,
}

impl Flags {
    pub fn from_record(record: &StructuredRecord) -> Self {
        let hours = record.sleep_hours;
        let mood = record.mood();

        Self {
            low_sleep: record.sleep_quality == Some(Level::Low)
                || hours.map_or(false, |h| h < LOW_SLEEP_HOURS),
            high_sleep: record.sleep_quality == Some(Level::High)
                || hours.map_or(false, |h| h >= HIGH_SLEEP_HOURS),
            high_stress: record.stress == Some(Level::High),
            low_stress: record.stress == Some(Level::Low),
            exercise: record.exercise,
            good_mood: mood == Mood::Good,
            bad_mood: mood == Mood::Bad,
            headache: record.has_symptom("headache"),
            fatigue: record.has_symptom("fatigue"),
        }
    }

    /// Look up a single flag
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::LowSleep => self.low_sleep,
            Flag::HighSleep => self.high_sleep,
            Flag::HighStress => self.high_stress,
            Flag::LowStress => self.low_stress,
            Flag::Exercise => self.exercise,
            Flag::GoodMood => self.good_mood,
            Flag::BadMood => self.bad_mood,
            Flag::Headache => self.headache,
            Flag::Fatigue => self.fatigue,
        }
    }
}

/// Errors raised while reading a structured record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record is not a JSON object
    #[error("Structured record must be a JSON object, got {0}")]
    NotAMapping(&'static str),
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collect trimmed, non-empty strings from a list (or a lone string)
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn parse_hours(value: &Value) -> Option<f64> {
    let hours = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if hours.is_finite() && hours >= 0.0 {
        Some(hours)
    } else {
        None
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_uses_defaults() {
        let record = StructuredRecord::from_value(&json!({})).unwrap();
        assert!(record.symptoms.is_empty());
        assert_eq!(record.sleep_hours, None);
        assert_eq!(record.mood(), Mood::Neutral);
        assert_eq!(record.stress_level(), Level::Medium);
        assert!(!record.exercise);
        assert_eq!(record.flags(), Flags::default());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = StructuredRecord::from_value(&json!(["headache"])).unwrap_err();
        assert_eq!(err, RecordError::NotAMapping("array"));

        let err = StructuredRecord::from_value(&Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Structured record must be a JSON object, got null");
    }

    #[test]
    fn test_symptoms_are_normalized() {
        let record = StructuredRecord::from_value(&json!({
            "symptoms": ["Headache", " headache ", "FATIGUE", 3, ""]
        }))
        .unwrap();
        assert_eq!(record.symptoms, vec!["headache", "fatigue"]);
        assert!(record.flags().headache);
        assert!(record.flags().fatigue);
    }

    #[test]
    fn test_sleep_flags() {
        let short = StructuredRecord::from_value(&json!({"sleep_hours": 5})).unwrap();
        assert!(short.flags().low_sleep);
        assert!(!short.flags().high_sleep);

        let long = StructuredRecord::from_value(&json!({"sleep_hours": 7})).unwrap();
        assert!(long.flags().high_sleep);
        assert!(!long.flags().low_sleep);

        let between = StructuredRecord::from_value(&json!({"sleep_hours": 6.5})).unwrap();
        assert!(!between.flags().low_sleep);
        assert!(!between.flags().high_sleep);

        let quality_only = StructuredRecord::from_value(&json!({"sleep": "LOW"})).unwrap();
        assert!(quality_only.flags().low_sleep);
    }

    #[test]
    fn test_quality_and_hours_can_both_hold() {
        // Quality and hours are independent signals
        let record =
            StructuredRecord::from_value(&json!({"sleep": "high", "sleep_hours": 4})).unwrap();
        let flags = record.flags();
        assert!(flags.low_sleep);
        assert!(flags.high_sleep);
    }

    #[test]
    fn test_out_of_range_hours_are_absent() {
        let record = StructuredRecord::from_value(&json!({"sleep_hours": -3})).unwrap();
        assert_eq!(record.sleep_hours, None);

        let record = StructuredRecord::from_value(&json!({"sleep_hours": "7.5"})).unwrap();
        assert_eq!(record.sleep_hours, Some(7.5));

        let record = StructuredRecord::from_value(&json!({"sleep_hours": "lots"})).unwrap();
        assert_eq!(record.sleep_hours, None);
    }

    #[test]
    fn test_exercise_truthiness() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("yes"), true),
            (json!("no"), false),
            (Value::Null, false),
        ] {
            let record = StructuredRecord::from_value(&json!({ "exercise": value.clone() })).unwrap();
            assert_eq!(record.exercise, expected, "exercise = {}", value);
        }
    }

    #[test]
    fn test_unknown_levels_resolve_to_defaults() {
        let record =
            StructuredRecord::from_value(&json!({"stress": "extreme", "mood": "meh"})).unwrap();
        assert_eq!(record.stress, None);
        assert_eq!(record.stress_level(), Level::Medium);
        assert_eq!(record.mood(), Mood::Neutral);
    }

    #[test]
    fn test_serialize_uses_sleep_key() {
        let record = StructuredRecord {
            sleep_quality: Some(Level::Low),
            sleep_hours: Some(5.0),
            mood: Some(Mood::Bad),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"sleep\":\"low\""));
        assert!(json.contains("\"mood\":\"bad\""));
        assert!(!json.contains("condition"));
    }

    #[test]
    fn test_deserialize_through_serde() {
        let record: StructuredRecord =
            serde_json::from_str(r#"{"sleep_quality": "high", "exercise": true}"#).unwrap();
        assert_eq!(record.sleep_quality, Some(Level::High));
        assert!(record.exercise);

        assert!(serde_json::from_str::<StructuredRecord>("42").is_err());
    }
}
