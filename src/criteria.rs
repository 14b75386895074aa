//! Criteria sets: the full collection of field filters for one query.
//!
//! A [`CriteriaSet`] maps field names to [`FilterSpec`]s. Fields that are
//! absent impose no constraint. Sets are immutable once built; the
//! `with_*`/`without_*` methods return modified deep copies.
//!
//! Sets are built either through [`CriteriaBuilder`], which validates each
//! filter against an entity [`Schema`], or parsed from HTTP query pairs such
//! as `id.greaterThan=5&name.contains=braf&geneId.specified=false`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::filter::{Condition, FilterSpec};
use crate::schema::Schema;
use crate::value::FieldType;

/// Query parameter that toggles de-duplication.
pub const DISTINCT_PARAM: &str = "distinct";

fn param_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\.([A-Za-z]+)$").expect("parameter key pattern")
    })
}

/// Field filters for one query plus the `distinct` flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaSet {
    filters: BTreeMap<String, FilterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distinct: Option<bool>,
}

impl CriteriaSet {
    /// An empty set: matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a validating builder for entities described by `schema`.
    #[must_use]
    pub fn builder(schema: Schema) -> CriteriaBuilder {
        CriteriaBuilder::new(schema)
    }

    /// Parses `<field>.<operator>=<value>` pairs plus an optional
    /// `distinct=<bool>` pair.
    ///
    /// # Errors
    /// Returns a [`FilterError`] for malformed keys, fields unknown to
    /// `schema`, unsupported operators and values that do not coerce.
    pub fn from_query_pairs<K, V>(
        schema: Schema,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, FilterError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = Self::builder(schema);
        for (key, raw) in pairs {
            let (key, raw) = (key.as_ref(), raw.as_ref());
            if key == DISTINCT_PARAM {
                let flag = FieldType::Boolean.coerce(DISTINCT_PARAM, raw)?;
                builder = builder.distinct(flag.as_bool().unwrap_or(false));
                continue;
            }

            let captures = param_key_pattern().captures(key).ok_or_else(|| {
                FilterError::MalformedParameter {
                    parameter: key.to_string(),
                    reason: "expected <field>.<operator>".to_string(),
                }
            })?;
            let (field_name, operator) = (&captures[1], &captures[2]);
            let field = schema.field(field_name).ok_or_else(|| FilterError::UnknownField {
                entity: schema.entity.name(),
                field: field_name.to_string(),
            })?;
            builder = builder.condition(field_name, Condition::parse(field, operator, raw)?);
        }
        builder.build()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FilterSpec> {
        self.filters.get(field)
    }

    /// Present filters in field-name order.
    pub fn filters(&self) -> impl Iterator<Item = &FilterSpec> {
        self.filters.values()
    }

    /// Returns true if no field is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.values().all(FilterSpec::is_empty)
    }

    /// Whether results are de-duplicated by identifier.
    #[must_use]
    pub fn distinct(&self) -> bool {
        self.distinct.unwrap_or(false)
    }

    /// Copy with `spec` replacing any filter on the same field.
    #[must_use]
    pub fn with_filter(&self, spec: FilterSpec) -> Self {
        let mut copy = self.clone();
        copy.filters.insert(spec.field().to_string(), spec);
        copy
    }

    /// Copy without any filter on `field`.
    #[must_use]
    pub fn without_filter(&self, field: &str) -> Self {
        let mut copy = self.clone();
        copy.filters.remove(field);
        copy
    }

    #[must_use]
    pub fn with_distinct(&self, distinct: bool) -> Self {
        let mut copy = self.clone();
        copy.distinct = Some(distinct);
        copy
    }
}

impl fmt::Display for CriteriaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Criteria{")?;
        for spec in self.filters.values().filter(|s| !s.is_empty()) {
            write!(f, "{spec}, ")?;
        }
        if let Some(distinct) = self.distinct {
            write!(f, "distinct={distinct}, ")?;
        }
        f.write_str("}")
    }
}

/// Validating builder for [`CriteriaSet`].
///
/// # Example
/// ```
/// use curation_api::entity::Flag;
/// use curation_api::{Condition, CriteriaSet, Record, Value};
///
/// let criteria = CriteriaSet::builder(Flag::SCHEMA)
///     .condition("id", Condition::GreaterThan(Value::Int(5)))
///     .condition("name", Condition::Contains("fusion".into()))
///     .distinct(true)
///     .build()
///     .unwrap();
/// assert!(criteria.distinct());
/// ```
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    schema: Schema,
    conditions: Vec<(String, Condition)>,
    distinct: Option<bool>,
}

impl CriteriaBuilder {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            conditions: Vec::new(),
            distinct: None,
        }
    }

    /// Adds a condition on `field`; several conditions on one field are ANDed.
    #[must_use]
    pub fn condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((field.into(), condition));
        self
    }

    /// Adds every condition of `spec`.
    #[must_use]
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        for condition in spec.conditions() {
            self.conditions.push((spec.field().to_string(), condition.clone()));
        }
        self
    }

    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    /// Build the set.
    ///
    /// Returns `FilterError` if:
    /// - a field is not declared by the schema
    /// - an operator does not apply to the field's type
    /// - a value does not match the field's type
    pub fn build(self) -> Result<CriteriaSet, FilterError> {
        let mut filters: BTreeMap<String, FilterSpec> = BTreeMap::new();
        for (name, condition) in self.conditions {
            let field = self.schema.field(&name).ok_or_else(|| FilterError::UnknownField {
                entity: self.schema.entity.name(),
                field: name.clone(),
            })?;
            condition.check(field.name, field.field_type)?;
            let spec = filters
                .remove(&name)
                .unwrap_or_else(|| FilterSpec::new(field.name, field.field_type));
            filters.insert(name, spec.with(condition));
        }
        Ok(CriteriaSet {
            filters,
            distinct: self.distinct,
        })
    }
}
