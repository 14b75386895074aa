//! Abstract storage traits for the curation backend.
//!
//! These traits define the contract that storage backends must implement:
//! predicate-filtered selects with an associated count, fetch by id, and
//! fetch by an indexed secondary field. The in-memory backend implements
//! them for tests and embedded use; a relational backend would translate
//! [`Select`] into SQL.

use thiserror::Error;

use crate::entity::RelatedRecord;
use crate::page::Order;
use crate::predicate::Predicate;
use crate::schema::{EntityKind, Record};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A relationship points at a record that does not exist.
    #[error("{entity} {id} references missing {target} {target_id}")]
    DanglingReference {
        entity: EntityKind,
        id: i64,
        target: EntityKind,
        target_id: i64,
    },

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A select statement over one entity table.
///
/// Joined relationship fields use left-join semantics: a record with three
/// related ids contributes three rows, a record with none contributes one
/// row where the field is `NULL`. `distinct` collapses rows back to one per
/// record before ordering, offset and limit are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub predicate: Predicate,
    pub joins: Vec<&'static str>,
    pub distinct: bool,
    pub order: Vec<Order>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Select {
    #[must_use]
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            joins: Vec::new(),
            distinct: false,
            order: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Select every record, unjoined.
    #[must_use]
    pub fn all() -> Self {
        Self::new(Predicate::True)
    }

    /// Joins `field` unless already joined.
    #[must_use]
    pub fn join(mut self, field: &'static str) -> Self {
        if !self.joins.contains(&field) {
            self.joins.push(field);
        }
        self
    }

    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: impl IntoIterator<Item = Order>) -> Self {
        self.order.extend(order);
        self
    }

    /// Restricts output to `limit` rows starting at `offset`.
    #[must_use]
    pub fn window(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// Storage trait for one entity table.
///
/// # Consistency
/// Every call observes a consistent snapshot of the table. Separate calls
/// (for example a page select followed by its count) are not atomic with
/// respect to concurrent writes.
pub trait EntityStore<E: Record>: Send + Sync {
    /// Insert a new record. Returns error if the id or a unique key exists.
    fn insert(&self, record: E) -> Result<(), StorageError>;

    /// Replace an existing record. Returns error if not found.
    fn update(&self, record: E) -> Result<(), StorageError>;

    /// Delete a record by id. Returns error if not found.
    fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Get a record by id.
    fn get(&self, id: i64) -> Result<Option<E>, StorageError>;

    /// Get the records for `ids` in the given order, skipping missing ids.
    fn get_many(&self, ids: &[i64]) -> Result<Vec<E>, StorageError>;

    /// Execute `select`, returning one entry per output row.
    fn select(&self, select: &Select) -> Result<Vec<E>, StorageError>;

    /// Count the rows `select` would return, ignoring offset and limit.
    fn count(&self, select: &Select) -> Result<u64, StorageError>;

    /// Find records by an indexed secondary field.
    ///
    /// Keys are matched case-insensitively after trimming. Unique indexes
    /// return at most one record.
    fn find_by_index(&self, index: &str, key: &str) -> Result<Vec<E>, StorageError>;
}

/// Cross-table access used to materialize relationships.
pub trait RelationSource: Send + Sync {
    /// Load the `target` records with the given ids, in id order.
    fn load_related(
        &self,
        target: EntityKind,
        ids: &[i64],
    ) -> Result<Vec<RelatedRecord>, StorageError>;
}

/// Access to the typed store for `E`.
pub trait HasStore<E: Record> {
    fn store(&self) -> &dyn EntityStore<E>;
}
