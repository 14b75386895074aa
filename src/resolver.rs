//! Keyed entity resolution.
//!
//! A free-form token is tried against an ordered chain of lookup keys. A
//! token made only of decimal digits is first tried as a numeric id; every
//! token is then tried as a primary name and finally as an alias. The first
//! key that yields a record wins.

use std::collections::BTreeMap;

use tracing::debug;

use crate::schema::Record;
use crate::storage::{EntityStore, StorageError};

/// One step of the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKey {
    NumericId,
    PrimaryName,
    Alias,
}

/// An entity that can be looked up by a free-form token.
pub trait Resolvable: Record {
    /// Secondary index backing `key`, or `None` if the entity has no such
    /// lookup.
    fn resolution_index(key: ResolutionKey) -> Option<&'static str>;
}

/// Resolves tokens against one entity store.
pub struct Resolver<'a, E: Resolvable> {
    store: &'a dyn EntityStore<E>,
}

impl<'a, E: Resolvable> Resolver<'a, E> {
    #[must_use]
    pub fn new(store: &'a dyn EntityStore<E>) -> Self {
        Self { store }
    }

    /// The lookup keys tried for `token`, in order.
    ///
    /// Digit strings that do not fit an `i64` are treated as names.
    #[must_use]
    pub fn precedence(token: &str) -> &'static [ResolutionKey] {
        const NUMERIC: &[ResolutionKey] = &[
            ResolutionKey::NumericId,
            ResolutionKey::PrimaryName,
            ResolutionKey::Alias,
        ];
        const NAMED: &[ResolutionKey] = &[ResolutionKey::PrimaryName, ResolutionKey::Alias];

        let token = token.trim();
        let numeric = !token.is_empty()
            && token.bytes().all(|b| b.is_ascii_digit())
            && token.parse::<i64>().is_ok();
        if numeric {
            NUMERIC
        } else {
            NAMED
        }
    }

    /// Resolves a single token. Absence is `Ok(None)`.
    ///
    /// # Errors
    /// Propagates [`StorageError`] from the store.
    pub fn resolve(&self, token: &str) -> Result<Option<E>, StorageError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        // Numeric lookups use the canonical number, so "0673" finds 673.
        let canonical = trimmed.parse::<i64>().ok().map(|n| n.to_string());
        for key in Self::precedence(trimmed) {
            let Some(index) = E::resolution_index(*key) else {
                continue;
            };
            let lookup = match (key, &canonical) {
                (ResolutionKey::NumericId, Some(number)) => number.as_str(),
                _ => trimmed,
            };
            if let Some(found) = self.store.find_by_index(index, lookup)?.into_iter().next() {
                debug!(token = trimmed, key = ?key, id = found.id(), "resolved");
                return Ok(Some(found));
            }
        }
        debug!(token = trimmed, "no match");
        Ok(None)
    }

    /// Resolves every token independently, drops misses and returns the
    /// distinct hits ordered by id.
    ///
    /// # Errors
    /// Propagates [`StorageError`] from the store; misses are never errors.
    pub fn resolve_all<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<E>, StorageError> {
        let mut hits = BTreeMap::new();
        for token in tokens {
            if let Some(found) = self.resolve(token.as_ref())? {
                hits.entry(found.id()).or_insert(found);
            }
        }
        Ok(hits.into_values().collect())
    }
}
