//! Heuristic Extractor
//!
//! Local, dependency-free extraction using keyword lexicons and a few
//! regexes. Less accurate than a language model but deterministic and
//! usable offline.

use super::{ExtractError, Extractor};
use crate::journal::{Level, Mood, StructuredRecord, HIGH_SLEEP_HOURS, LOW_SLEEP_HOURS};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

const NUMBER: &str = r"(\d+(?:\.\d+)?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

/// "slept 5 hours", "got about six hrs of sleep"
static RE_SLEPT_HOURS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:slept|sleep|sleeping|got)\b[^.!?\d]{{0,20}}?\b{}\s*(?:h|hrs?|hours?)\b",
        NUMBER
    ))
    .ok()
});

/// "5h of sleep", "7 hours sleep"
static RE_HOURS_SLEEP: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{}\s*(?:h|hrs?|hours?)\b(?:\s+of)?\s+(?:sleep|rest)\b",
        NUMBER
    ))
    .ok()
});

static RE_NO_EXERCISE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:no|didn'?t|did not|skipped|without|couldn'?t)\s+(?:\w+\s+)?(?:exercise|workout|work out|gym|run|walk|training|yoga)\b",
    )
    .ok()
});

/// Keyword → canonical symptom
const SYMPTOMS: &[(&str, &str)] = &[
    ("headache", "headache"),
    ("headaches", "headache"),
    ("migraine", "headache"),
    ("head hurt", "headache"),
    ("fatigue", "fatigue"),
    ("fatigued", "fatigue"),
    ("tired", "fatigue"),
    ("exhausted", "fatigue"),
    ("drained", "fatigue"),
    ("nausea", "nausea"),
    ("nauseous", "nausea"),
    ("dizzy", "dizziness"),
    ("dizziness", "dizziness"),
    ("cramps", "cramps"),
    ("back pain", "back pain"),
    ("stomach ache", "stomach ache"),
    ("stomachache", "stomach ache"),
    ("bloated", "bloating"),
    ("bloating", "bloating"),
    ("sore throat", "sore throat"),
    ("cough", "cough"),
    ("congested", "congestion"),
    ("joint pain", "joint pain"),
];

/// Keyword → canonical food
const FOODS: &[(&str, &str)] = &[
    ("coffee", "coffee"),
    ("coffees", "coffee"),
    ("espresso", "coffee"),
    ("tea", "tea"),
    ("pizza", "pizza"),
    ("burger", "burger"),
    ("fast food", "fast food"),
    ("fries", "fries"),
    ("pasta", "pasta"),
    ("salad", "salad"),
    ("vegetables", "vegetables"),
    ("fruit", "fruit"),
    ("chocolate", "chocolate"),
    ("sugar", "sugar"),
    ("sweets", "sweets"),
    ("candy", "sweets"),
    ("soda", "soda"),
    ("energy drink", "energy drink"),
    ("alcohol", "alcohol"),
    ("wine", "wine"),
    ("beer", "beer"),
    ("water", "water"),
];

const LOW_STRESS: &[&str] = &[
    "no stress",
    "stress-free",
    "stress free",
    "not stressed",
    "relaxed",
    "calm",
    "chill",
    "peaceful",
];

const MEDIUM_STRESS: &[&str] = &[
    "a bit stressed",
    "bit stressed",
    "slightly stressed",
    "somewhat stressed",
    "a little stressed",
];

const HIGH_STRESS: &[&str] = &[
    "stressed",
    "stressful",
    "stress",
    "anxious",
    "anxiety",
    "overwhelmed",
    "panic",
    "deadline",
    "pressure",
];

const EXERCISE: &[&str] = &[
    "exercise",
    "exercised",
    "workout",
    "worked out",
    "gym",
    "ran",
    "run",
    "running",
    "jog",
    "jogged",
    "walk",
    "walked",
    "hike",
    "hiked",
    "yoga",
    "pilates",
    "swim",
    "swam",
    "cycling",
    "cycled",
    "bike ride",
    "lifted",
    "training",
];

const GOOD_MOOD: &[&str] = &[
    "happy",
    "great",
    "good",
    "amazing",
    "fantastic",
    "energized",
    "productive",
    "cheerful",
    "content",
    "motivated",
    "excited",
];

const BAD_MOOD: &[&str] = &[
    "sad",
    "awful",
    "terrible",
    "bad",
    "irritable",
    "down",
    "depressed",
    "miserable",
    "grumpy",
    "frustrated",
    "upset",
    "angry",
    "horrible",
];

const POOR_SLEEP: &[&str] = &[
    "slept badly",
    "slept poorly",
    "poor sleep",
    "bad sleep",
    "terrible sleep",
    "couldn't sleep",
    "could not sleep",
    "insomnia",
    "barely slept",
    "restless night",
];

const GOOD_SLEEP: &[&str] = &[
    "slept well",
    "slept great",
    "great sleep",
    "good sleep",
    "well rested",
    "well-rested",
    "slept like a baby",
];

/// Keyword-based extractor
#[derive(Debug, Clone, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a record synchronously
    pub fn extract_record(&self, text: &str) -> StructuredRecord {
        let text = text.to_lowercase();

        let sleep_hours = sleep_hours(&text);
        let sleep_quality = match sleep_hours {
            Some(h) if h < LOW_SLEEP_HOURS => Some(Level::Low),
            Some(h) if h < HIGH_SLEEP_HOURS => Some(Level::Medium),
            Some(_) => Some(Level::High),
            None if contains_any(&text, POOR_SLEEP) => Some(Level::Low),
            None if contains_any(&text, GOOD_SLEEP) => Some(Level::High),
            None => None,
        };

        let stress = if contains_any(&text, LOW_STRESS) {
            Some(Level::Low)
        } else if contains_any(&text, MEDIUM_STRESS) {
            Some(Level::Medium)
        } else if contains_any(&text, HIGH_STRESS) {
            Some(Level::High)
        } else {
            None
        };

        let negated = RE_NO_EXERCISE
            .as_ref()
            .map_or(false, |re| re.is_match(&text));
        let exercise = !negated && contains_any(&text, EXERCISE);

        StructuredRecord {
            symptoms: canonical_matches(&text, SYMPTOMS),
            sleep_quality,
            sleep_hours,
            food: canonical_matches(&text, FOODS),
            stress,
            exercise,
            mood: Some(mood(&text)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Extractor for HeuristicExtractor {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn extract(&self, text: &str) -> Result<StructuredRecord, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyText);
        }
        Ok(self.extract_record(text))
    }
}

fn sleep_hours(text: &str) -> Option<f64> {
    [&RE_SLEPT_HOURS, &RE_HOURS_SLEEP]
        .into_iter()
        .filter_map(|re| re.as_ref())
        .find_map(|re| re.captures(text))
        .and_then(|caps| parse_number(&caps[1]))
}

fn parse_number(s: &str) -> Option<f64> {
    let word = match s {
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" => 12.0,
        other => return other.parse().ok(),
    };
    Some(word)
}

fn mood(text: &str) -> Mood {
    let good = GOOD_MOOD.iter().filter(|w| contains_word(text, w)).count();
    let bad = BAD_MOOD.iter().filter(|w| contains_word(text, w)).count();

    match good.cmp(&bad) {
        std::cmp::Ordering::Greater => Mood::Good,
        std::cmp::Ordering::Less => Mood::Bad,
        std::cmp::Ordering::Equal => Mood::Neutral,
    }
}

/// Canonical names of every lexicon entry found, in lexicon order, deduplicated
fn canonical_matches(text: &str, lexicon: &[(&str, &str)]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (keyword, canonical) in lexicon {
        if contains_word(text, keyword) && !found.iter().any(|f| f == canonical) {
            found.push(canonical.to_string());
        }
    }
    found
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_word(text, p))
}

/// Whole-word (or whole-phrase) match
fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> StructuredRecord {
        HeuristicExtractor::new().extract_record(text)
    }

    #[test]
    fn test_regexes_compile() {
        assert!(RE_SLEPT_HOURS.is_some());
        assert!(RE_HOURS_SLEEP.is_some());
        assert!(RE_NO_EXERCISE.is_some());
    }

    #[test]
    fn test_typical_bad_day() {
        let record = extract(
            "Woke up with a headache, slept 5h, had two coffees and pizza. \
             Super stressed about a deadline. Felt awful.",
        );

        assert_eq!(record.symptoms, vec!["headache"]);
        assert_eq!(record.sleep_hours, Some(5.0));
        assert_eq!(record.sleep_quality, Some(Level::Low));
        assert_eq!(record.food, vec!["coffee", "pizza"]);
        assert_eq!(record.stress, Some(Level::High));
        assert!(!record.exercise);
        assert_eq!(record.mood, Some(Mood::Bad));
        assert!(record.flags().low_sleep);
        assert!(record.flags().headache);
    }

    #[test]
    fn test_typical_good_day() {
        let record = extract("Got 8 hours of sleep, went for a run, felt relaxed and happy.");

        assert_eq!(record.sleep_hours, Some(8.0));
        assert_eq!(record.sleep_quality, Some(Level::High));
        assert!(record.exercise);
        assert_eq!(record.stress, Some(Level::Low));
        assert_eq!(record.mood, Some(Mood::Good));
    }

    #[test]
    fn test_sleep_hours_forms() {
        assert_eq!(extract("slept about six hours").sleep_hours, Some(6.0));
        assert_eq!(extract("only 4.5 hrs of sleep").sleep_hours, Some(4.5));
        assert_eq!(extract("7h sleep, fine").sleep_hours, Some(7.0));
        assert_eq!(extract("worked 9 hours today").sleep_hours, None);
    }

    #[test]
    fn test_sleep_quality_thresholds() {
        assert_eq!(LOW_SLEEP_HOURS, 6.0);
        assert_eq!(HIGH_SLEEP_HOURS, 7.0);

        assert_eq!(extract("slept 5.5 hours").sleep_quality, Some(Level::Low));
        assert_eq!(extract("slept 6 hours").sleep_quality, Some(Level::Medium));
        assert_eq!(extract("slept 6.5 hours").sleep_quality, Some(Level::Medium));
        assert_eq!(extract("slept 7 hours").sleep_quality, Some(Level::High));
    }

    #[test]
    fn test_sleep_quality_without_hours() {
        assert_eq!(extract("I slept badly").sleep_quality, Some(Level::Low));
        assert_eq!(extract("slept well!").sleep_quality, Some(Level::High));
        assert_eq!(extract("nothing to report").sleep_quality, None);
    }

    #[test]
    fn test_exercise_negation() {
        assert!(extract("did yoga in the morning").exercise);
        assert!(!extract("skipped the gym again").exercise);
        assert!(!extract("no exercise today").exercise);
    }

    #[test]
    fn test_word_boundaries() {
        // "tea" inside "steak", "ran" inside "grand"
        let record = extract("had a steak at a grand dinner");
        assert!(record.food.is_empty());
        assert!(!record.exercise);
    }

    #[test]
    fn test_symptoms_are_canonical() {
        let record = extract("migraine and headaches, so tired and exhausted");
        assert_eq!(record.symptoms, vec!["headache", "fatigue"]);
    }

    #[test]
    fn test_stress_levels() {
        assert_eq!(extract("a bit stressed at work").stress, Some(Level::Medium));
        assert_eq!(extract("stress-free weekend").stress, Some(Level::Low));
        assert_eq!(extract("anxious all day").stress, Some(Level::High));
        assert_eq!(extract("quiet day").stress, None);
    }

    #[tokio::test]
    async fn test_extract_trait() {
        let extractor = HeuristicExtractor::new();
        assert!(matches!(extractor.extract("").await, Err(ExtractError::EmptyText)));

        let record = extractor.extract("headache").await.unwrap();
        assert_eq!(record.symptoms, vec!["headache"]);
        assert_eq!(record.mood, Some(Mood::Neutral));
    }
}
