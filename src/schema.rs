//! Static entity schemas.
//!
//! Each entity declares its filterable fields once, with their types and
//! whether they are plain columns or relationships to other entities.
//! Criteria parsing, predicate construction and the store all consult the
//! same declaration, so a field's filter type is fixed at definition time.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::value::{FieldType, Value};

/// The entity tables known to the curation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Gene,
    Transcript,
    Flag,
    FeatureFlag,
    User,
    DeviceUsageIndication,
}

impl EntityKind {
    /// Name used in error messages and log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gene => "Gene",
            Self::Transcript => "Transcript",
            Self::Flag => "Flag",
            Self::FeatureFlag => "FeatureFlag",
            Self::User => "User",
            Self::DeviceUsageIndication => "DeviceUsageIndication",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A column on the entity's own row (possibly null).
    Column,
    /// A to-many relationship. Filtering on it joins the related table,
    /// fanning a parent out into one row per related id.
    Relation {
        /// Name of the relationship when materialized (e.g. `genes`).
        name: &'static str,
        target: EntityKind,
    },
}

/// A filterable field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub kind: FieldKind,
}

impl FieldDef {
    #[must_use]
    pub const fn column(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            kind: FieldKind::Column,
        }
    }

    /// A to-many relationship filtered by the related entity's id.
    #[must_use]
    pub const fn relation(name: &'static str, relation: &'static str, target: EntityKind) -> Self {
        Self {
            name,
            field_type: FieldType::Long,
            kind: FieldKind::Relation {
                name: relation,
                target,
            },
        }
    }

    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }
}

/// The full field list of one entity.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: EntityKind,
    pub fields: &'static [FieldDef],
}

impl Schema {
    /// Looks up a field by its filter name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a relationship field by its materialized name (`genes`).
    #[must_use]
    pub fn relation(&self, relation: &str) -> Option<&'static FieldDef> {
        self.fields
            .iter()
            .find(|f| matches!(f.kind, FieldKind::Relation { name, .. } if name == relation))
    }

    pub fn relations(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.is_relation())
    }
}

/// A stored entity.
///
/// Implementors expose their columns and relationship ids by field name so
/// the store can evaluate predicates generically.
pub trait Record:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const SCHEMA: Schema;

    /// Secondary indexes whose keys must be unique across the table.
    const UNIQUE_INDEXES: &'static [&'static str] = &[];

    /// Relationship fields materialized by eager reads.
    const EAGER: &'static [&'static str] = &[];

    /// Unique identifier.
    fn id(&self) -> i64;

    /// Value of a column field; `None` is SQL `NULL`.
    fn column(&self, field: &str) -> Option<Value>;

    /// Ids on the far side of a relationship field.
    fn related_ids(&self, _field: &str) -> Vec<i64> {
        Vec::new()
    }

    /// Secondary index entries as `(index, key)` pairs.
    fn index_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldDef] = &[
        FieldDef::column("id", FieldType::Long),
        FieldDef::column("name", FieldType::String),
        FieldDef::relation("geneId", "genes", EntityKind::Gene),
    ];

    const SCHEMA: Schema = Schema {
        entity: EntityKind::Flag,
        fields: FIELDS,
    };

    #[test]
    fn test_field_lookup() {
        assert_eq!(SCHEMA.field("name").unwrap().field_type, FieldType::String);
        assert!(SCHEMA.field("color").is_none());
    }

    #[test]
    fn test_relation_lookup() {
        let rel = SCHEMA.relation("genes").unwrap();
        assert_eq!(rel.name, "geneId");
        assert_eq!(rel.field_type, FieldType::Long);
        assert!(rel.is_relation());
        assert_eq!(SCHEMA.relations().count(), 1);
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::DeviceUsageIndication.to_string(), "DeviceUsageIndication");
        assert_eq!(
            serde_json::to_string(&EntityKind::FeatureFlag).unwrap(),
            "\"featureFlag\""
        );
    }
}
