//! Local store of saved compositions.
//!
//! The whole collection lives under a single key as one JSON array, newest
//! first. Every mutation reads the array, changes it and writes it back in
//! full. Reads fail soft: an absent, unreadable, or malformed blob is treated
//! as an empty collection and logged. Individual records that do not fit
//! [`SavedComposition`] are hidden from reads but written back untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::model::{CompositionDraft, CompositionId, SavedComposition};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized collection.
pub const STORAGE_KEY: &str = "saved_compositions";

/// One element of the stored array.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Composition(SavedComposition),
    Unrecognized(Value),
}

impl StoredRecord {
    fn has_id(&self, id: &str) -> bool {
        match self {
            Self::Composition(composition) => composition.id.as_str() == id,
            Self::Unrecognized(value) => value.get("id").and_then(Value::as_str) == Some(id),
        }
    }

    fn into_composition(self) -> Option<SavedComposition> {
        match self {
            Self::Composition(composition) => Some(composition),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Saved compositions kept in a [`KeyValueStore`].
#[derive(Debug)]
pub struct CompositionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> CompositionStore<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Every saved composition, most recent first.
    pub fn get_all(&self) -> Vec<SavedComposition> {
        self.records()
            .into_iter()
            .filter_map(StoredRecord::into_composition)
            .collect()
    }

    /// Stamp `draft` with a fresh id and timestamps and put it at the front
    /// of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated collection cannot be written back.
    pub fn save(&mut self, draft: CompositionDraft) -> Result<SavedComposition> {
        let now = Utc::now();
        let composition = SavedComposition::from_draft(draft, CompositionId::generate_at(now), now);

        let mut records = self.records();
        records.insert(0, StoredRecord::Composition(composition.clone()));

        if let Err(e) = self.persist(&records) {
            log::error!("Failed to save composition '{}': {}", composition.title, e);
            return Err(e);
        }

        log::debug!("Saved composition {} ({})", composition.id, composition.title);
        Ok(composition)
    }

    /// Remove the composition with `id`, keeping the order of the rest.
    ///
    /// Returns `true` when the collection was written back, whether or not
    /// a record matched, and `false` only when storage failed.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let mut records = self.records();
        let total = records.len();
        records.retain(|record| !record.has_id(id));

        match self.persist(&records) {
            Ok(()) => {
                if records.len() == total {
                    log::debug!("No saved composition with id {}", id);
                }
                true
            }
            Err(e) => {
                log::error!("Failed to delete composition {}: {}", id, e);
                false
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<SavedComposition> {
        self.get_all().into_iter().find(|c| c.id.as_str() == id)
    }

    /// Compositions whose title, raga, tala, mood, instruments or
    /// description contain `query`, ignoring case.
    ///
    /// A blank query returns the full collection.
    pub fn search(&self, query: &str) -> Vec<SavedComposition> {
        let compositions = self.get_all();
        if query.trim().is_empty() {
            return compositions;
        }

        compositions
            .into_iter()
            .filter(|c| c.matches(query))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.get_all().len()
    }

    /// Drop the stored collection entirely.
    pub fn clear(&mut self) -> bool {
        match self.storage.remove_item(STORAGE_KEY) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to clear saved compositions: {}", e);
                false
            }
        }
    }

    /// Every stored record in order, or nothing if the blob is unusable.
    fn records(&self) -> Vec<StoredRecord> {
        match self.load() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Ignoring unreadable saved compositions: {}", e);
                Vec::new()
            }
        }
    }

    fn load(&self) -> Result<Vec<StoredRecord>> {
        let Some(raw) = self.storage.get_item(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        let records: Vec<StoredRecord> = serde_json::from_str(&raw)?;

        let skipped = records
            .iter()
            .filter(|record| matches!(record, StoredRecord::Unrecognized(_)))
            .count();
        if skipped > 0 {
            log::warn!("Skipping {} saved composition(s) with an unexpected shape", skipped);
        }

        Ok(records)
    }

    fn persist(&mut self, records: &[StoredRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set_item(STORAGE_KEY, &raw)
    }
}
