//! Storage layer for the curation backend.
//!
//! [`EntityStore`] is the per-table contract; [`InMemoryTable`] implements
//! it, and [`Database`] groups one table per entity.

mod database;
mod memory;
mod traits;

pub use database::Database;
pub use memory::InMemoryTable;
pub use traits::{EntityStore, HasStore, RelationSource, Select, StorageError};
