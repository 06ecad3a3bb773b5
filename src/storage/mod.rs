//! Koru Entry Storage
//!
//! Persistence for journal check-ins:
//!
//! - **types**: Entry, NewEntry, EntryStatus, MonthFilter
//! - **store**: SQLite-backed entry store
//! - **error**: Error types
//!
//! # Lifecycle
//!
//! ```text
//! free text → extraction → draft → (user review) → confirmed → analysis
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use koru::storage::{EntryStore, NewEntry, StorageConfig, parse_date};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EntryStore::open(&StorageConfig::new("./data"))?;
//!
//!     let draft = store
//!         .insert_draft(NewEntry::new(
//!             "user-1",
//!             parse_date("2026-02-14")?,
//!             "Slept 5h, headache all morning",
//!             json!({"sleep_hours": 5, "symptoms": ["headache"]}),
//!         ))
//!         .await?;
//!
//!     store.confirm(&draft.id, &draft.extracted_json).await?;
//!     let recent = store.recent_confirmed("user-1", 60).await?;
//!     println!("{} confirmed entries", recent.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use store::{EntryStore, StorageConfig};
pub use types::{parse_date, Entry, EntryStatus, MonthFilter, NewEntry, DATE_FORMAT};
