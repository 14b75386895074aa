//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`EntityStore`]. It is intended for embedded usage, tests, and as a
//! reference for the row semantics a relational backend must reproduce.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use crate::page::{Direction, Order};
use crate::predicate::Row;
use crate::schema::Record;
use crate::storage::traits::{EntityStore, Select, StorageError};
use crate::value::Value;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

type Index = HashMap<String, BTreeSet<i64>>;

#[derive(Debug)]
struct TableState<E> {
    rows: BTreeMap<i64, E>,
    indexes: HashMap<&'static str, Index>,
}

impl<E> Default for TableState<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            indexes: HashMap::new(),
        }
    }
}

impl<E: Record> TableState<E> {
    fn check_unique(&self, record: &E) -> Result<(), StorageError> {
        for (index, key) in record.index_keys() {
            if !E::UNIQUE_INDEXES.contains(&index) {
                continue;
            }
            let taken = self
                .indexes
                .get(index)
                .and_then(|idx| idx.get(&normalize_key(&key)))
                .is_some_and(|ids| ids.iter().any(|id| *id != record.id()));
            if taken {
                return Err(StorageError::DuplicateKey(format!(
                    "{}.{index}={key}",
                    E::SCHEMA.entity
                )));
            }
        }
        Ok(())
    }

    fn index(&mut self, record: &E) {
        for (index, key) in record.index_keys() {
            self.indexes
                .entry(index)
                .or_default()
                .entry(normalize_key(&key))
                .or_default()
                .insert(record.id());
        }
    }

    fn unindex(&mut self, record: &E) {
        for (index, key) in record.index_keys() {
            let Some(idx) = self.indexes.get_mut(index) else {
                continue;
            };
            let key = normalize_key(&key);
            if let Some(ids) = idx.get_mut(&key) {
                ids.remove(&record.id());
                if ids.is_empty() {
                    idx.remove(&key);
                }
            }
        }
    }

    /// Runs filter, distinct and ordering; the window is left to the caller.
    fn rows_for(&self, select: &Select) -> Vec<&E> {
        let joins = effective_joins::<E>(select);
        let mut out: Vec<&E> = Vec::new();
        let mut seen = BTreeSet::new();

        for record in self.rows.values() {
            for joined in expand_joins(record, &joins) {
                let row = JoinedRow {
                    record,
                    joined: &joined,
                };
                if !select.predicate.matches(&row) {
                    continue;
                }
                if select.distinct && !seen.insert(record.id()) {
                    continue;
                }
                out.push(record);
            }
        }

        if !select.order.is_empty() {
            out.sort_by(|a, b| compare_records(*a, *b, &select.order));
        }
        out
    }
}

/// Joins requested by the select plus any relationship the predicate reads.
fn effective_joins<E: Record>(select: &Select) -> Vec<&'static str> {
    let mut joins = select.joins.clone();
    for field in select.predicate.fields() {
        if let Some(def) = E::SCHEMA.field(field).filter(|f| f.is_relation()) {
            if !joins.contains(&def.name) {
                joins.push(def.name);
            }
        }
    }
    joins
}

/// Left-join fan-out: the cartesian product of the joined id lists, where
/// an empty list contributes a single `NULL`.
fn expand_joins<E: Record>(
    record: &E,
    joins: &[&'static str],
) -> Vec<Vec<(&'static str, Option<i64>)>> {
    let mut rows = vec![Vec::with_capacity(joins.len())];
    for field in joins {
        let ids = record.related_ids(field);
        let choices: Vec<Option<i64>> = if ids.is_empty() {
            vec![None]
        } else {
            ids.into_iter().map(Some).collect()
        };
        rows = rows
            .into_iter()
            .flat_map(|row| {
                choices.iter().map(move |id| {
                    let mut next = row.clone();
                    next.push((*field, *id));
                    next
                })
            })
            .collect();
    }
    rows
}

struct JoinedRow<'a, E> {
    record: &'a E,
    joined: &'a [(&'static str, Option<i64>)],
}

impl<E: Record> Row for JoinedRow<'_, E> {
    fn value(&self, field: &str) -> Option<Value> {
        match self.joined.iter().find(|(name, _)| *name == field) {
            Some((_, id)) => id.map(Value::Int),
            None => self.record.column(field),
        }
    }
}

/// `NULL` sorts first ascending and last descending.
fn compare_records<E: Record>(a: &E, b: &E, order: &[Order]) -> Ordering {
    for key in order {
        let ord = match (a.column(key.field), b.column(key.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
        };
        let ord = match key.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Thread-safe in-memory table for one entity type.
#[derive(Debug)]
pub struct InMemoryTable<E> {
    state: RwLock<TableState<E>>,
}

impl<E> Default for InMemoryTable<E> {
    fn default() -> Self {
        Self {
            state: RwLock::new(TableState::default()),
        }
    }
}

impl<E: Record> InMemoryTable<E> {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns [`StorageError::BackendError`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.len"))?;
        Ok(state.rows.len())
    }

    /// # Errors
    /// Returns [`StorageError::BackendError`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// All ids currently stored, ascending.
    ///
    /// # Errors
    /// Returns [`StorageError::BackendError`] if the lock is poisoned.
    pub fn ids(&self) -> Result<BTreeSet<i64>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.ids"))?;
        Ok(state.rows.keys().copied().collect())
    }

    /// All records, ascending by id.
    ///
    /// # Errors
    /// Returns [`StorageError::BackendError`] if the lock is poisoned.
    pub fn all(&self) -> Result<Vec<E>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.all"))?;
        Ok(state.rows.values().cloned().collect())
    }

    /// Poisons the table lock by panicking while holding the write guard.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.state.write();
            panic!("poisoning table lock");
        }));
    }
}

impl<E: Record> EntityStore<E> for InMemoryTable<E> {
    fn insert(&self, record: E) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("table.insert"))?;
        if state.rows.contains_key(&record.id()) {
            return Err(StorageError::DuplicateKey(format!(
                "{}.id={}",
                E::SCHEMA.entity,
                record.id()
            )));
        }
        state.check_unique(&record)?;
        state.index(&record);
        state.rows.insert(record.id(), record);
        Ok(())
    }

    fn update(&self, record: E) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("table.update"))?;
        let prev = state
            .rows
            .get(&record.id())
            .cloned()
            .ok_or(StorageError::NotFound {
                entity: E::SCHEMA.entity,
                id: record.id(),
            })?;
        state.check_unique(&record)?;
        state.unindex(&prev);
        state.index(&record);
        state.rows.insert(record.id(), record);
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("table.delete"))?;
        let prev = state.rows.remove(&id).ok_or(StorageError::NotFound {
            entity: E::SCHEMA.entity,
            id,
        })?;
        state.unindex(&prev);
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<E>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.get"))?;
        Ok(state.rows.get(&id).cloned())
    }

    fn get_many(&self, ids: &[i64]) -> Result<Vec<E>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.get_many"))?;
        Ok(ids.iter().filter_map(|id| state.rows.get(id).cloned()).collect())
    }

    fn select(&self, select: &Select) -> Result<Vec<E>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.select"))?;
        let rows = state.rows_for(select);
        let limit = select.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(select.offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, select: &Select) -> Result<u64, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.count"))?;
        Ok(state.rows_for(select).len() as u64)
    }

    fn find_by_index(&self, index: &str, key: &str) -> Result<Vec<E>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("table.find_by_index"))?;
        let Some(ids) = state
            .indexes
            .get(index)
            .and_then(|idx| idx.get(&normalize_key(key)))
        else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| state.rows.get(id).cloned()).collect())
    }
}
