//! Journal CSV Import
//!
//! Reads back-filled check-ins from a CSV file with `date` and `text`
//! columns. Column positions are taken from the header row when present.

use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Date formats accepted in the `date` column, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// One importable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub date: NaiveDate,
    pub text: String,
}

/// Result of reading a CSV file
#[derive(Debug, Default)]
pub struct CsvReadResult {
    pub rows: Vec<JournalRow>,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Errors that abort the whole import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

/// CSV reader for `date,text` journal files
pub struct JournalCsvReader {
    has_header: bool,
}

impl Default for JournalCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalCsvReader {
    pub fn new() -> Self {
        Self { has_header: true }
    }

    /// Set whether the CSV has a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Read rows from a file
    pub fn read_path(&self, path: &Path) -> Result<CsvReadResult, ImportError> {
        let reader = self.builder().from_path(path)?;
        self.read_records(reader)
    }

    /// Read rows from any reader
    pub fn read<R: Read>(&self, input: R) -> Result<CsvReadResult, ImportError> {
        let reader = self.builder().from_reader(input);
        self.read_records(reader)
    }

    fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(self.has_header).flexible(true).trim(csv::Trim::All);
        builder
    }

    fn read_records<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<CsvReadResult, ImportError> {
        let (date_col, text_col) = if self.has_header {
            column_positions(reader.headers()?)?
        } else {
            (0, 1)
        };

        let mut result = CsvReadResult::default();

        for (index, record) in reader.records().enumerate() {
            let line = if self.has_header { index + 2 } else { index + 1 };

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.fail(format!("Line {}: {}", line, e));
                    continue;
                }
            };

            let date_str = record.get(date_col).unwrap_or_default();
            let text = record.get(text_col).unwrap_or_default();

            if date_str.is_empty() && text.is_empty() {
                continue;
            }

            let Some(date) = parse_date(date_str) else {
                result.fail(format!("Line {}: could not parse date '{}'", line, date_str));
                continue;
            };

            if text.is_empty() {
                result.fail(format!("Line {}: empty text", line));
                continue;
            }

            result.rows.push(JournalRow {
                line,
                date,
                text: text.to_string(),
            });
        }

        tracing::debug!(
            rows = result.rows.len(),
            failed = result.rows_failed,
            "CSV journal read"
        );

        Ok(result)
    }
}

impl CsvReadResult {
    fn fail(&mut self, error: String) {
        self.rows_failed += 1;
        self.errors.push(error);
    }
}

fn column_positions(headers: &csv::StringRecord) -> Result<(usize, usize), ImportError> {
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.contains(&h.to_lowercase().as_str()))
    };

    let date = find(&["date", "day"]).ok_or(ImportError::MissingColumn("date"))?;
    let text = find(&["text", "entry", "note", "notes"]).ok_or(ImportError::MissingColumn("text"))?;
    Ok((date, text))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_with_header() {
        let csv = "date,text\n2026-02-01,Slept 5 hours. Headache.\n2026/02/02,\"Ran 5k, felt great\"\n";
        let result = JournalCsvReader::new().read(csv.as_bytes()).unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows_failed, 0);
        assert_eq!(result.rows[1].date, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert_eq!(result.rows[1].text, "Ran 5k, felt great");
        assert_eq!(result.rows[1].line, 3);
    }

    #[test]
    fn test_columns_by_header_name() {
        let csv = "Entry,Date\nquiet day,2026-02-03\n";
        let result = JournalCsvReader::new().read(csv.as_bytes()).unwrap();
        assert_eq!(result.rows[0].text, "quiet day");
    }

    #[test]
    fn test_missing_column() {
        let csv = "when,what\n2026-02-03,x\n";
        let result = JournalCsvReader::new().read(csv.as_bytes());
        assert!(matches!(result, Err(ImportError::MissingColumn("date"))));
    }

    #[test]
    fn test_row_errors_are_collected() {
        let csv = "date,text\nyesterday,hello\n2026-02-04,\n,\n2026-02-05,ok\n";
        let result = JournalCsvReader::new().read(csv.as_bytes()).unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows_failed, 2);
        assert!(result.errors[0].starts_with("Line 2:"));
        assert!(result.errors[1].contains("empty text"));
    }

    #[test]
    fn test_without_header() {
        let csv = "2026-02-01,first\n";
        let result = JournalCsvReader::new()
            .with_header(false)
            .read(csv.as_bytes())
            .unwrap();
        assert_eq!(result.rows[0].line, 1);
    }

    #[test]
    fn test_read_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,text").unwrap();
        writeln!(file, "2026-02-01,from disk").unwrap();

        let result = JournalCsvReader::new().read_path(file.path()).unwrap();
        assert_eq!(result.rows[0].text, "from disk");
    }
}
