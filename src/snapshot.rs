//! Read-only snapshots of mood history and candidate items
//!
//! The engine never talks to storage itself. [`MoodDataSource`] is the seam a
//! real persistence layer implements; [`SnapshotStore`] is an in-memory
//! implementation backed by a JSON document, used by the CLI and in tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{MoodRsError, Result, SnapshotError};
use crate::models::{CandidateItem, DateRange, ItemKind, MoodEntry};
use crate::validation::{MoodEntryValidator, ValidationReport};

/// Collaborator supplying the snapshots the engine works on
pub trait MoodDataSource {
    /// Up to `sample_size` entries for the user, most recent first
    fn fetch_recent_mood_entries(&self, user_id: &str, sample_size: usize) -> Result<Vec<MoodEntry>>;

    /// Entries within the inclusive range, oldest first
    fn fetch_mood_entries(&self, user_id: &str, date_range: Option<&DateRange>) -> Result<Vec<MoodEntry>>;

    /// Every candidate of the requested kind, unfiltered
    fn fetch_all_candidate_items(&self, kind: ItemKind) -> Result<Vec<CandidateItem>>;
}

/// On-disk layout of a snapshot file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Mood history keyed by user id
    #[serde(default)]
    pub users: BTreeMap<String, Vec<MoodEntry>>,

    /// Exercises and resources
    #[serde(default)]
    pub items: Vec<CandidateItem>,
}

/// In-memory snapshot store
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    document: SnapshotDocument,
    strict: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a document, cleaning every entry
    pub fn from_document(mut document: SnapshotDocument) -> (Self, ValidationReport) {
        let report = document
            .users
            .values_mut()
            .map(|entries| MoodEntryValidator::validate_entries(entries))
            .fold(ValidationReport::default(), |mut total, r| {
                total.merge(r);
                total
            });

        (
            SnapshotStore {
                document,
                strict: false,
            },
            report,
        )
    }

    /// Load and validate a JSON snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SnapshotError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = fs::read_to_string(path)?;
        let document: SnapshotDocument =
            serde_json::from_str(&content).map_err(|e| SnapshotError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let (store, report) = Self::from_document(document);

        info!(
            path = %path.display(),
            users = store.document.users.len(),
            items = store.document.items.len(),
            entries = report.entries_checked,
            "Loaded mood snapshot"
        );

        Ok(store)
    }

    /// Load the snapshot if it exists, otherwise start empty
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path) {
            Err(MoodRsError::Snapshot(SnapshotError::FileNotFound { path })) => {
                debug!(path = %path.display(), "No snapshot yet, starting empty");
                Ok(Self::new())
            }
            other => other,
        }
    }

    /// Write the snapshot as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.document)?;
        fs::write(path, json)?;

        debug!(path = %path.display(), "Saved mood snapshot");
        Ok(())
    }

    /// Refuse lookups for users the store has never seen
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Append entries to a user's history after cleaning them
    pub fn add_entries(&mut self, user_id: &str, mut entries: Vec<MoodEntry>) -> ValidationReport {
        let report = MoodEntryValidator::validate_entries(&mut entries);
        self.document
            .users
            .entry(user_id.to_string())
            .or_default()
            .extend(entries);
        report
    }

    pub fn add_item(&mut self, item: CandidateItem) {
        self.document.items.push(item);
    }

    pub fn document(&self) -> &SnapshotDocument {
        &self.document
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.document.users.keys().map(String::as_str)
    }

    fn user_entries(&self, user_id: &str) -> Result<&[MoodEntry]> {
        match self.document.users.get(user_id) {
            Some(entries) => Ok(entries.as_slice()),
            None if self.strict => Err(SnapshotError::UnknownUser {
                user_id: user_id.to_string(),
            }
            .into()),
            None => Ok(&[]),
        }
    }
}

impl MoodDataSource for SnapshotStore {
    fn fetch_recent_mood_entries(&self, user_id: &str, sample_size: usize) -> Result<Vec<MoodEntry>> {
        let mut entries = self.user_entries(user_id)?.to_vec();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries.truncate(sample_size);
        Ok(entries)
    }

    fn fetch_mood_entries(&self, user_id: &str, date_range: Option<&DateRange>) -> Result<Vec<MoodEntry>> {
        let mut entries: Vec<MoodEntry> = self
            .user_entries(user_id)?
            .iter()
            .filter(|entry| date_range.map_or(true, |range| range.contains(&entry.date)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries)
    }

    fn fetch_all_candidate_items(&self, kind: ItemKind) -> Result<Vec<CandidateItem>> {
        Ok(self
            .document
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect())
    }
}
