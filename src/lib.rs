//! # curation-api - criteria queries for a curation knowledge base
//!
//! A read-side query layer over curated cancer-genomics records: genes,
//! transcripts, flags, feature flags, users and device usage indications.
//!
//! ## Core Concepts
//!
//! - **FilterSpec**: the conditions on one field, typed by the field's schema
//! - **CriteriaSet**: a conjunction of filters plus a `distinct` flag
//! - **Predicate**: the compiled form every store executes, with SQL
//!   three-valued logic
//! - **EagerLoader**: parents with their to-many relationships, paged over
//!   distinct parents
//! - **Resolver**: numeric id, then primary name, then alias
//!
//! ## Usage
//!
//! ```rust
//! use curation_api::entity::Gene;
//! use curation_api::{CriteriaSet, Database, EntityStore, PageRequest, QueryService, Record};
//!
//! let db = Database::new();
//! db.genes.insert(Gene::new(1, 673, "BRAF"))?;
//! db.genes.insert(Gene::new(2, 3845, "KRAS"))?;
//!
//! let criteria = CriteriaSet::from_query_pairs(Gene::SCHEMA, [("hugoSymbol.contains", "ras")])?;
//! let page = QueryService::<Gene>::new(&db.genes).find_by_criteria(&criteria, &PageRequest::new(0, 20)?)?;
//! assert_eq!(page.total_elements, 1);
//! assert_eq!(page.content[0].hugo_symbol, "KRAS");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod criteria;
pub mod entity;
pub mod error;
pub mod filter;
pub mod page;
pub mod predicate;
pub mod schema;
pub mod value;

// Storage and reads
pub mod loader;
pub mod query;
pub mod resolver;
pub mod seed;
pub mod storage;

#[cfg(feature = "server")]
pub mod web;

// Re-export primary types at crate root for convenience
pub use config::QueryLimits;
pub use criteria::{CriteriaBuilder, CriteriaSet};
pub use entity::RelatedRecord;
pub use error::{CurationError, CurationResult, FilterError};
pub use filter::{Condition, FilterSpec};
pub use page::{Direction, Order, Page, PageRequest};
pub use predicate::{Comparison, Predicate, Row};
pub use schema::{EntityKind, FieldDef, FieldKind, Record, Schema};
pub use value::{FieldType, Value};

pub use loader::{EagerLoader, WithRelations};
pub use query::QueryService;
pub use resolver::{Resolvable, ResolutionKey, Resolver};
pub use seed::Dataset;
pub use storage::{
    Database, EntityStore, HasStore, InMemoryTable, RelationSource, Select, StorageError,
};

#[cfg(feature = "server")]
pub use config::ServerConfig;
#[cfg(feature = "server")]
pub use web::{build_router, ApiError, AppState};
