//! # History Store
//!
//! Completed sessions, persisted for later review.
//!
//! All records live under one key, `<prefix>-history`, as a JSON array in
//! insertion order:
//!
//! ```text
//! [
//!   { "endpoint": "N3C",
//!     "timestamp": "2017-05-10, 14:54:52",
//!     "history": [["0.0", "Issue with ..."], ..., ["N3C", ""]],
//!     "input": { "title": "...", "notes": "..." } },   // optional
//!   ...
//! ]
//! ```
//!
//! History is a convenience, so nothing here returns an error. Whether the
//! backing store is usable is decided once, by a write/remove probe when the
//! store is opened. If the probe fails, records are kept in memory for the
//! rest of the process instead.

use std::io;

use chrono::{DateTime, Local, TimeZone};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::engine::{NavigationPath, NavigationStep};
use crate::core::storage::KeyValueStore;

/// `2017-05-10, 14:54:52`: zero-padded, 24-hour clock.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Free-form details the user attaches when logging a session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct UserInput {
    pub title: String,
    pub notes: String,
}

impl UserInput {
    /// `None` when both fields are blank.
    pub fn from_fields(title: &str, notes: &str) -> Option<Self> {
        let (title, notes) = (title.trim(), notes.trim());
        if title.is_empty() && notes.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            notes: notes.to_string(),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    #[serde(rename = "endpoint")]
    pub title: String,
    pub timestamp: String,
    #[serde(rename = "history")]
    pub path: NavigationPath,
    #[serde(rename = "input", default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<UserInput>,
}

impl SessionRecord {
    /// Stamps the record with the local wall clock.
    pub fn new(title: impl Into<String>, path: NavigationPath, user_input: Option<UserInput>) -> Self {
        Self::at(&Local::now(), title, path, user_input)
    }

    pub fn at<Tz: TimeZone>(
        at: &DateTime<Tz>,
        title: impl Into<String>,
        path: NavigationPath,
        user_input: Option<UserInput>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            title: title.into(),
            timestamp: format_timestamp(at),
            path,
            user_input,
        }
    }

    /// Number of decisions taken, not counting the terminal sentinel.
    pub fn decision_count(&self) -> usize {
        self.path.iter().filter(|s| !s.is_end()).count()
    }
}

enum Backend {
    Durable(Box<dyn KeyValueStore>),
    Volatile(Vec<SessionRecord>),
}

pub struct HistoryStore {
    backend: Backend,
    key: String,
    review: Option<SessionRecord>,
}

fn probe(store: &mut dyn KeyValueStore, key: &str) -> io::Result<()> {
    store.set(key, "probe")?;
    store.remove(key)
}

/// Decodes each stored entry on its own, so one bad record does not hide
/// the rest.
fn read_records(store: &dyn KeyValueStore, key: &str) -> Vec<SessionRecord> {
    let entries: Vec<Value> = match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Ignoring unreadable history under {}: {}", key, e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Failed to read history {}: {}", key, e);
            Vec::new()
        }
    };
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping history record #{} under {}: {}", i + 1, key, e);
                None
            }
        })
        .collect()
}

/// Appends `record` to the raw entries under `key` and returns the new count.
///
/// Entries that no longer decode as a `SessionRecord` are written back
/// untouched. A stored value that is not a JSON array at all is copied to
/// `<key>-unreadable-<stamp>` before a fresh array is started. A failed read
/// writes nothing.
fn append_record(store: &mut dyn KeyValueStore, key: &str, record: &SessionRecord) -> io::Result<usize> {
    let mut entries: Vec<Value> = match store.get(key)? {
        None => Vec::new(),
        Some(json) => match serde_json::from_str(&json) {
            Ok(entries) => entries,
            Err(e) => {
                let aside = format!("{}-unreadable-{}", key, Local::now().format("%Y%m%d%H%M%S"));
                store.set(&aside, &json)?;
                warn!("History under {} is unreadable ({}), moved to {}", key, e, aside);
                Vec::new()
            }
        },
    };
    entries.push(serde_json::to_value(record).map_err(io::Error::other)?);
    let json = serde_json::to_string(&entries).map_err(io::Error::other)?;
    store.set(key, &json)?;
    Ok(entries.len())
}

impl HistoryStore {
    /// Probes `store` once. A store that cannot be written is replaced by
    /// an in-memory list for the lifetime of this `HistoryStore`.
    pub fn open(mut store: Box<dyn KeyValueStore>, prefix: &str) -> Self {
        let key = format!("{}-history", prefix);
        let backend = match probe(&mut *store, &format!("{}-probe", prefix)) {
            Ok(()) => {
                info!("History storage available ({})", key);
                Backend::Durable(store)
            }
            Err(e) => {
                warn!("History storage unavailable, keeping history in memory: {}", e);
                Backend::Volatile(Vec::new())
            }
        };
        Self {
            backend,
            key,
            review: None,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self.backend, Backend::Durable(_))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Appends a record. Existing records, readable or not, are never
    /// rewritten or dropped.
    pub fn save(&mut self, record: SessionRecord) {
        match &mut self.backend {
            Backend::Durable(store) => match append_record(&mut **store, &self.key, &record) {
                Ok(count) => debug!("Saved history record #{}", count),
                Err(e) => warn!("Failed to save history, {} not recorded: {}", record.title, e),
            },
            Backend::Volatile(records) => records.push(record),
        }
    }

    /// All records in insertion order. Empty when nothing is stored or the
    /// stored data cannot be read.
    pub fn load_all(&self) -> Vec<SessionRecord> {
        match &self.backend {
            Backend::Durable(store) => read_records(&**store, &self.key),
            Backend::Volatile(records) => records.clone(),
        }
    }

    pub fn get(&self, index: usize) -> Option<SessionRecord> {
        self.load_all().into_iter().nth(index)
    }

    /// Removes every record under this store's key. Other keys are untouched.
    pub fn clear(&mut self) {
        match &mut self.backend {
            Backend::Durable(store) => {
                if let Err(e) = store.remove(&self.key) {
                    warn!("Failed to clear history: {}", e);
                } else {
                    info!("History cleared");
                }
            }
            Backend::Volatile(records) => records.clear(),
        }
    }

    // ── Review mode ─────────────────────────────────────────────────────────

    pub fn enter_review(&mut self, record: SessionRecord) {
        debug!("Reviewing {} from {}", record.title, record.timestamp);
        self.review = Some(record);
    }

    pub fn exit_review(&mut self) -> Option<SessionRecord> {
        self.review.take()
    }

    pub fn reviewing(&self) -> Option<&SessionRecord> {
        self.review.as_ref()
    }

    pub fn review_path(&self) -> Option<&[NavigationStep]> {
        self.review.as_ref().map(|r| r.path.as_slice())
    }
}
