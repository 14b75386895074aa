//! Criteria queries over one entity store.
//!
//! [`QueryService::create_select`] is the single place a [`CriteriaSet`]
//! turns into a [`Select`]; paged, unbounded and count queries all go
//! through it.

use tracing::{debug, warn};

use crate::criteria::CriteriaSet;
use crate::error::{CurationError, CurationResult};
use crate::page::{Order, Page, PageRequest};
use crate::predicate::Predicate;
use crate::schema::Record;
use crate::storage::{EntityStore, Select, StorageError};

/// Read-only criteria queries for `E`.
pub struct QueryService<'a, E: Record> {
    store: &'a dyn EntityStore<E>,
}

impl<'a, E: Record> QueryService<'a, E> {
    #[must_use]
    pub fn new(store: &'a dyn EntityStore<E>) -> Self {
        Self { store }
    }

    /// Builds the select for `criteria`.
    ///
    /// Relationship fields named by a filter are joined; `distinct`
    /// collapses the resulting fan-out.
    ///
    /// # Errors
    /// Returns [`CurationError::InvalidFilter`] if the criteria do not fit
    /// `E`'s schema.
    pub fn create_select(criteria: &CriteriaSet) -> CurationResult<Select> {
        let predicate = Predicate::from_criteria(E::SCHEMA, criteria).inspect_err(|err| {
            warn!(entity = %E::SCHEMA.entity, error = %err, "rejected criteria");
        })?;

        let joins: Vec<&'static str> = predicate
            .fields()
            .into_iter()
            .filter_map(|name| E::SCHEMA.field(name))
            .filter(|def| def.is_relation())
            .map(|def| def.name)
            .collect();

        let mut select = Select::new(predicate).distinct(criteria.distinct());
        for join in joins {
            select = select.join(join);
        }
        Ok(select)
    }

    /// One page of matching entities plus the total count.
    ///
    /// Without an explicit sort the page is ordered by id.
    ///
    /// # Errors
    /// Returns [`CurationError`] for invalid criteria or store failures.
    pub fn find_by_criteria(
        &self,
        criteria: &CriteriaSet,
        page: &PageRequest,
    ) -> CurationResult<Page<E>> {
        debug!(entity = %E::SCHEMA.entity, %criteria, page = page.page(), size = page.size(), "find by criteria");
        let select = Self::create_select(criteria)?.order_by(Self::ordering(page.sort()));
        let total = self.store.count(&select).map_err(log_store_error)?;
        let content = self
            .store
            .select(&select.window(page.offset(), page.size()))
            .map_err(log_store_error)?;
        Ok(Page::new(content, page, total))
    }

    /// Every matching entity, ordered by id.
    ///
    /// # Errors
    /// Returns [`CurationError`] for invalid criteria or store failures.
    pub fn find_all_by_criteria(&self, criteria: &CriteriaSet) -> CurationResult<Vec<E>> {
        debug!(entity = %E::SCHEMA.entity, %criteria, "find all by criteria");
        let select = Self::create_select(criteria)?.order_by(Self::ordering(&[]));
        self.store.select(&select).map_err(log_store_error)
    }

    /// Number of matching rows; distinct entities when `distinct` is set.
    ///
    /// # Errors
    /// Returns [`CurationError`] for invalid criteria or store failures.
    pub fn count_by_criteria(&self, criteria: &CriteriaSet) -> CurationResult<u64> {
        debug!(entity = %E::SCHEMA.entity, %criteria, "count by criteria");
        let select = Self::create_select(criteria)?;
        self.store.count(&select).map_err(log_store_error)
    }

    /// One entity by id; absence is `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`CurationError::StoreUnavailable`] on store failures.
    pub fn find_one(&self, id: i64) -> CurationResult<Option<E>> {
        self.store.get(id).map_err(log_store_error)
    }

    /// The requested ordering with `id` appended as a tiebreaker.
    fn ordering(sort: &[Order]) -> Vec<Order> {
        let mut order = sort.to_vec();
        if !order.iter().any(|o| o.field == "id") {
            order.push(Order::asc("id"));
        }
        order
    }
}

pub(crate) fn log_store_error(err: StorageError) -> CurationError {
    warn!(error = %err, "store failure");
    CurationError::from(err)
}
