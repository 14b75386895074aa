//! JSON dataset loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entity::{DeviceUsageIndication, FeatureFlag, Flag, Gene, Transcript, User};
use crate::schema::Record;
use crate::storage::{Database, EntityStore, StorageError};

/// A full snapshot of every table.
///
/// ```json
/// { "genes": [{"id": 1, "entrezGeneId": 673, "hugoSymbol": "BRAF"}], "flags": [] }
/// ```
///
/// Missing tables are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub genes: Vec<Gene>,
    pub transcripts: Vec<Transcript>,
    pub flags: Vec<Flag>,
    pub feature_flags: Vec<FeatureFlag>,
    pub users: Vec<User>,
    pub device_usage_indications: Vec<DeviceUsageIndication>,
}

impl Dataset {
    /// Parses a dataset from JSON text.
    ///
    /// # Errors
    /// Returns [`StorageError::SerializationError`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        serde_json::from_str(json).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Reads and parses a dataset file.
    ///
    /// # Errors
    /// Returns [`StorageError::BackendError`] if the file cannot be read and
    /// [`StorageError::SerializationError`] if it is not a valid dataset.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            StorageError::BackendError(format!("read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Total number of records across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
            + self.transcripts.len()
            + self.flags.len()
            + self.feature_flags.len()
            + self.users.len()
            + self.device_usage_indications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a database holding this dataset.
    ///
    /// Every relationship id must name a record in the dataset.
    ///
    /// # Errors
    /// Returns [`StorageError::DuplicateKey`] for repeated ids or unique
    /// keys and [`StorageError::DanglingReference`] for broken
    /// relationships.
    pub fn into_database(self) -> Result<Database, StorageError> {
        let db = Database::new();
        let total = self.len();
        insert_all(&db.genes, self.genes)?;
        insert_all(&db.transcripts, self.transcripts)?;
        insert_all(&db.flags, self.flags)?;
        insert_all(&db.users, self.users)?;
        insert_all(&db.feature_flags, self.feature_flags)?;
        insert_all(&db.device_usage_indications, self.device_usage_indications)?;

        db.check_references::<Gene>()?;
        db.check_references::<Transcript>()?;
        db.check_references::<Flag>()?;
        db.check_references::<FeatureFlag>()?;
        info!(records = total, "dataset loaded");
        Ok(db)
    }
}

fn insert_all<E: Record>(store: &dyn EntityStore<E>, records: Vec<E>) -> Result<(), StorageError> {
    records.into_iter().try_for_each(|r| store.insert(r))
}
