//! Eager relationship loading.
//!
//! Eager reads fetch parents joined with their to-many relationships and
//! then materialize the related records. The join fans a parent out into
//! one row per related entity, so every eager read is distinct by parent
//! id, and paged eager reads count distinct parents.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::entity::RelatedRecord;
use crate::error::CurationResult;
use crate::page::{Order, Page, PageRequest};
use crate::query::log_store_error;
use crate::schema::{FieldKind, Record};
use crate::storage::{EntityStore, RelationSource, Select};

/// A parent record with its materialized relationships.
///
/// Serializes as the record's own fields plus one array per loaded
/// relationship (for example `"genes": [...]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithRelations<E> {
    #[serde(flatten)]
    pub record: E,
    #[serde(flatten)]
    pub related: BTreeMap<&'static str, Vec<RelatedRecord>>,
}

impl<E> WithRelations<E> {
    /// A record with no relationships loaded.
    #[must_use]
    pub fn bare(record: E) -> Self {
        Self {
            record,
            related: BTreeMap::new(),
        }
    }

    /// Related records under `relation`, empty if not loaded.
    #[must_use]
    pub fn related(&self, relation: &str) -> &[RelatedRecord] {
        self.related.get(relation).map_or(&[], Vec::as_slice)
    }
}

/// Loads `E` with or without its eager relationships.
pub struct EagerLoader<'a, E: Record> {
    store: &'a dyn EntityStore<E>,
    relations: &'a dyn RelationSource,
}

impl<'a, E: Record> EagerLoader<'a, E> {
    #[must_use]
    pub fn new(store: &'a dyn EntityStore<E>, relations: &'a dyn RelationSource) -> Self {
        Self { store, relations }
    }

    /// Parents joined with every eager relationship, one row per parent.
    fn eager_select() -> Select {
        E::EAGER
            .iter()
            .filter_map(|relation| E::SCHEMA.relation(relation))
            .fold(Select::all(), |select, def| select.join(def.name))
            .distinct(true)
            .order_by([Order::asc("id")])
    }

    fn materialize(&self, record: E) -> CurationResult<WithRelations<E>> {
        let mut related = BTreeMap::new();
        for relation in E::EAGER {
            let Some(def) = E::SCHEMA.relation(relation) else {
                continue;
            };
            let FieldKind::Relation { name, target } = def.kind else {
                continue;
            };
            let ids = record.related_ids(def.name);
            let loaded = self
                .relations
                .load_related(target, &ids)
                .map_err(log_store_error)?;
            related.insert(name, loaded);
        }
        Ok(WithRelations { record, related })
    }

    /// Materializes the eager relationships of already fetched records.
    ///
    /// # Errors
    /// Returns [`crate::CurationError::StoreUnavailable`] on store failures.
    pub fn attach(&self, records: Vec<E>) -> CurationResult<Vec<WithRelations<E>>> {
        records.into_iter().map(|r| self.materialize(r)).collect()
    }

    fn wrap(&self, records: Vec<E>, eager: bool) -> CurationResult<Vec<WithRelations<E>>> {
        if eager {
            self.attach(records)
        } else {
            Ok(records.into_iter().map(WithRelations::bare).collect())
        }
    }

    /// Every parent, each exactly once, ordered by id.
    ///
    /// # Errors
    /// Returns [`crate::CurationError::StoreUnavailable`] on store failures.
    pub fn find_all(&self, eager: bool) -> CurationResult<Vec<WithRelations<E>>> {
        debug!(entity = %E::SCHEMA.entity, eager, "find all");
        let records = self
            .store
            .select(&Self::eager_select())
            .map_err(log_store_error)?;
        self.wrap(records, eager)
    }

    /// One page of parents. The window and the total both range over
    /// distinct parent ids, so pages never repeat a parent.
    ///
    /// # Errors
    /// Returns [`crate::CurationError::StoreUnavailable`] on store failures.
    pub fn find_all_paged(
        &self,
        eager: bool,
        page: &PageRequest,
    ) -> CurationResult<Page<WithRelations<E>>> {
        debug!(entity = %E::SCHEMA.entity, eager, page = page.page(), size = page.size(), "find all paged");
        let select = Self::eager_select();
        let total = self.store.count(&select).map_err(log_store_error)?;
        let records = self
            .store
            .select(&select.window(page.offset(), page.size()))
            .map_err(log_store_error)?;
        Ok(Page::new(self.wrap(records, eager)?, page, total))
    }

    /// One parent with its relationships; absence is `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`crate::CurationError::StoreUnavailable`] on store failures.
    pub fn find_one_eager(&self, id: i64) -> CurationResult<Option<WithRelations<E>>> {
        debug!(entity = %E::SCHEMA.entity, id, "find one eager");
        match self.store.get(id).map_err(log_store_error)? {
            Some(record) => self.materialize(record).map(Some),
            None => Ok(None),
        }
    }
}
