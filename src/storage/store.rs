//! Entry Store - SQLite-backed journal entries
//!
//! Holds drafts and confirmed check-ins per user. Dates are stored as
//! `YYYY-MM-DD` text so lexical order matches calendar order.
//!
//! Access is serialized through a `std::sync::Mutex` because a SQLite
//! connection cannot be shared between threads. Every query is short, so the
//! lock is never held across an await point.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{Entry, EntryStatus, MonthFilter, NewEntry, DATE_FORMAT};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Entry store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the database file
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir`
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("koru_data"),
            database_file: "koru.db".to_string(),
        }
    }
}

impl StorageConfig {
    /// Create config with a custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

const ENTRY_COLUMNS: &str =
    "id, user_id, date, raw_text, extracted_json, status, condition, created_at";

/// SQLite-backed store of journal entries
pub struct EntryStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl EntryStore {
    /// Open (or create) the store described by `config`
    pub fn open(config: &StorageConfig) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Self::open_path(config.database_path())
    }

    /// Open (or create) a database file
    pub fn open_path(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::init(conn, Some(path))
    }

    /// Open a private in-memory store (tests, dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                extracted_json TEXT NOT NULL,
                status TEXT NOT NULL,
                condition TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entries_user_status_date
                ON entries(user_id, status, date);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Store a new draft entry
    pub async fn insert_draft(&self, entry: NewEntry) -> StorageResult<Entry> {
        let entry = Entry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: entry.user_id,
            date: entry.date,
            raw_text: entry.raw_text,
            extracted_json: entry.extracted_json,
            status: EntryStatus::Draft,
            condition: entry.condition,
            created_at: Utc::now(),
        };

        let extracted = serde_json::to_string(&entry.extracted_json)?;

        self.lock()?.execute(
            "INSERT INTO entries (id, user_id, date, raw_text, extracted_json, status, condition, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.user_id,
                entry.date.format(DATE_FORMAT).to_string(),
                entry.raw_text,
                extracted,
                entry.status.as_str(),
                entry.condition,
                entry.created_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(entry_id = %entry.id, user_id = %entry.user_id, "Draft stored");
        Ok(entry)
    }

    /// Replace an entry's extracted data and mark it confirmed
    pub async fn confirm(&self, id: &str, extracted_json: &serde_json::Value) -> StorageResult<()> {
        let extracted = serde_json::to_string(extracted_json)?;

        let changed = self.lock()?.execute(
            "UPDATE entries SET extracted_json = ?, status = ? WHERE id = ?",
            params![extracted, EntryStatus::Confirmed.as_str(), id],
        )?;

        if changed == 0 {
            return Err(StorageError::EntryNotFound(id.to_string()));
        }

        tracing::debug!(entry_id = %id, "Entry confirmed");
        Ok(())
    }

    /// Fetch one entry by id
    pub async fn get(&self, id: &str) -> StorageResult<Option<Entry>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS))?;

        let mut rows = stmt.query_map(params![id], RawEntry::from_row)?;
        let raw = match rows.next() {
            Some(raw) => raw?,
            None => return Ok(None),
        };

        Ok(Some(raw.into_entry()?))
    }

    /// Confirmed entries for a user, newest first, optionally within a month
    pub async fn list_confirmed(
        &self,
        user_id: &str,
        month: Option<MonthFilter>,
    ) -> StorageResult<Vec<Entry>> {
        // An unbounded range stands in for "no month"
        let (start, end) = match month {
            Some(m) => (m.start(), m.end()),
            None => (NaiveDate::MIN, NaiveDate::MAX),
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM entries
             WHERE user_id = ? AND status = ? AND date >= ? AND date < ?
             ORDER BY date DESC, created_at DESC",
            ENTRY_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                user_id,
                EntryStatus::Confirmed.as_str(),
                format_bound(start),
                format_bound(end),
            ],
            RawEntry::from_row,
        )?;

        collect_entries(rows)
    }

    /// The `limit` most recent confirmed entries for a user, newest first
    pub async fn recent_confirmed(&self, user_id: &str, limit: usize) -> StorageResult<Vec<Entry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM entries
             WHERE user_id = ? AND status = ?
             ORDER BY date DESC, created_at DESC
             LIMIT ?",
            ENTRY_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![user_id, EntryStatus::Confirmed.as_str(), limit as i64],
            RawEntry::from_row,
        )?;

        collect_entries(rows)
    }

    /// Number of confirmed entries for a user
    pub async fn count_confirmed(&self, user_id: &str) -> StorageResult<usize> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ? AND status = ?",
            params![user_id, EntryStatus::Confirmed.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Cheap connectivity check
    pub async fn ping(&self) -> StorageResult<()> {
        self.lock()?
            .query_row("SELECT id FROM entries LIMIT 1", [], |_| Ok(()))
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(()),
                other => Err(other),
            })?;
        Ok(())
    }
}

/// Dates beyond year 9999 would not sort lexically, so clamp the open bounds
fn format_bound(date: NaiveDate) -> String {
    if date == NaiveDate::MIN {
        "0000-00-00".to_string()
    } else if date == NaiveDate::MAX {
        "9999-99-99".to_string()
    } else {
        date.format(DATE_FORMAT).to_string()
    }
}

/// Row as stored, before JSON and date parsing
struct RawEntry {
    id: String,
    user_id: String,
    date: String,
    raw_text: String,
    extracted_json: String,
    status: String,
    condition: Option<String>,
    created_at: String,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            raw_text: row.get(3)?,
            extracted_json: row.get(4)?,
            status: row.get(5)?,
            condition: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_entry(self) -> StorageResult<Entry> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| StorageError::InvalidDate(self.date.clone()))?;

        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| StorageError::InvalidDate(self.created_at.clone()))?;

        let status = EntryStatus::parse(&self.status).ok_or_else(|| {
            StorageError::Serialization(format!("unknown entry status: {}", self.status))
        })?;

        Ok(Entry {
            id: self.id,
            user_id: self.user_id,
            date,
            raw_text: self.raw_text,
            extracted_json: serde_json::from_str(&self.extracted_json)?,
            status,
            condition: self.condition,
            created_at,
        })
    }
}

fn collect_entries(
    rows: impl Iterator<Item = rusqlite::Result<RawEntry>>,
) -> StorageResult<Vec<Entry>> {
    rows.map(|raw| raw.map_err(StorageError::from).and_then(RawEntry::into_entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::parse_date;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn draft(user: &str, date: &str, mood: &str) -> NewEntry {
        NewEntry::new(user, parse_date(date).unwrap(), "some text", json!({ "mood": mood }))
    }

    async fn confirmed(store: &EntryStore, user: &str, date: &str, mood: &str) -> Entry {
        let entry = store.insert_draft(draft(user, date, mood)).await.unwrap();
        store.confirm(&entry.id, &entry.extracted_json).await.unwrap();
        entry
    }

    #[tokio::test]
    async fn test_insert_and_get_draft() {
        let store = EntryStore::open_in_memory().unwrap();
        let entry = store
            .insert_draft(draft("alice", "2026-02-10", "good").condition("diabetes"))
            .await
            .unwrap();

        let loaded = store.get(&entry.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, EntryStatus::Draft);
        assert_eq!(loaded.extracted_json, json!({"mood": "good"}));
        assert_eq!(loaded.condition.as_deref(), Some("diabetes"));
        assert_eq!(loaded.date, parse_date("2026-02-10").unwrap());

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_replaces_data() {
        let store = EntryStore::open_in_memory().unwrap();
        let entry = store.insert_draft(draft("alice", "2026-02-10", "bad")).await.unwrap();

        store.confirm(&entry.id, &json!({"mood": "good"})).await.unwrap();

        let loaded = store.get(&entry.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, EntryStatus::Confirmed);
        assert_eq!(loaded.extracted_json["mood"], "good");
    }

    #[tokio::test]
    async fn test_confirm_missing_entry() {
        let store = EntryStore::open_in_memory().unwrap();
        let err = store.confirm("nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, StorageError::EntryNotFound(_)));
    }

    #[tokio::test]
    async fn test_drafts_are_not_listed() {
        let store = EntryStore::open_in_memory().unwrap();
        store.insert_draft(draft("alice", "2026-02-10", "good")).await.unwrap();
        confirmed(&store, "alice", "2026-02-11", "bad").await;

        let entries = store.list_confirmed("alice", None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.count_confirmed("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let store = EntryStore::open_in_memory().unwrap();
        confirmed(&store, "alice", "2026-01-05", "good").await;
        confirmed(&store, "alice", "2026-02-20", "bad").await;
        confirmed(&store, "alice", "2026-02-03", "neutral").await;
        confirmed(&store, "bob", "2026-02-15", "good").await;

        let entries = store.list_confirmed("alice", None).await.unwrap();
        let dates: Vec<String> = entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-02-20", "2026-02-03", "2026-01-05"]);

        let february = MonthFilter::parse("2026-02").unwrap();
        let entries = store.list_confirmed("alice", Some(february)).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| february.contains(e.date)));
    }

    #[tokio::test]
    async fn test_recent_confirmed_limit() {
        let store = EntryStore::open_in_memory().unwrap();
        for day in 1..=9 {
            confirmed(&store, "alice", &format!("2026-03-0{}", day), "good").await;
        }

        let recent = store.recent_confirmed("alice", 3).await.unwrap();
        let dates: Vec<String> = recent.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-03-09", "2026-03-08", "2026-03-07"]);
    }

    #[tokio::test]
    async fn test_persistence() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        let id = {
            let store = EntryStore::open(&config).unwrap();
            confirmed(&store, "alice", "2026-02-10", "good").await.id
        };

        let store = EntryStore::open(&config).unwrap();
        assert_eq!(store.path(), Some(config.database_path().as_path()));
        let loaded = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.status, EntryStatus::Confirmed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers() {
        let store = Arc::new(EntryStore::open_in_memory().unwrap());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let date = format!("2026-03-{:02}", i + 1);
                    confirmed(&store, "alice", &date, "neutral").await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count_confirmed("alice").await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_ping() {
        let store = EntryStore::open_in_memory().unwrap();
        store.ping().await.unwrap();
        confirmed(&store, "alice", "2026-02-10", "good").await;
        store.ping().await.unwrap();
    }
}
