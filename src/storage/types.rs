//! Core data types for the journal entry store
//!
//! - `Entry`: a stored check-in with its extracted record
//! - `NewEntry`: input for creating a draft
//! - `EntryStatus`: draft / confirmed lifecycle
//! - `MonthFilter`: a calendar month used to filter the timeline

use crate::storage::error::{StorageError, StorageResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Date format used for entry dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lifecycle state of an entry
///
/// Drafts hold the raw extraction; only confirmed entries are analyzed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Confirmed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EntryStatus::Draft),
            "confirmed" => Some(EntryStatus::Confirmed),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored journal entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub raw_text: String,
    /// Extracted record as JSON, edited by the user on confirm
    pub extracted_json: Value,
    pub status: EntryStatus,
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for a new draft entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: String,
    pub date: NaiveDate,
    pub raw_text: String,
    pub extracted_json: Value,
    pub condition: Option<String>,
}

impl NewEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        raw_text: impl Into<String>,
        extracted_json: Value,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            raw_text: raw_text.into(),
            extracted_json,
            condition: None,
        }
    }

    /// Builder method: set the condition tag
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| StorageError::InvalidDate(s.to_string()))
}

/// A calendar month, e.g. `2026-02`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    first_day: NaiveDate,
}

impl MonthFilter {
    /// Parse a `YYYY-MM` month
    pub fn parse(s: &str) -> StorageResult<Self> {
        let first_day = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), DATE_FORMAT)
            .map_err(|_| StorageError::InvalidDate(s.to_string()))?;
        Ok(Self { first_day })
    }

    /// First day of the month (inclusive)
    pub fn start(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following month (exclusive)
    pub fn end(&self) -> NaiveDate {
        let (year, month) = if self.first_day.month() == 12 {
            (self.first_day.year() + 1, 1)
        } else {
            (self.first_day.year(), self.first_day.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date < self.end()
    }
}

impl std::fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [EntryStatus::Draft, EntryStatus::Confirmed] {
            assert_eq!(EntryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EntryStatus::parse("deleted"), None);
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2026-02-14").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
        assert!(parse_date("14/02/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_month_filter_bounds() {
        let month = MonthFilter::parse("2026-02").unwrap();
        assert_eq!(month.start(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(month.end(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(month.contains(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert_eq!(month.to_string(), "2026-02");
    }

    #[test]
    fn test_month_filter_december() {
        let month = MonthFilter::parse("2025-12").unwrap();
        assert_eq!(month.end(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_month_filter_rejects_garbage() {
        assert!(MonthFilter::parse("2026-13").is_err());
        assert!(MonthFilter::parse("february").is_err());
    }
}
