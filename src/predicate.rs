//! Predicate trees executed by entity stores.
//!
//! A [`CriteriaSet`] is compiled into a [`Predicate`] once; paged, unbounded
//! and count queries all execute the same tree, so their filtering
//! semantics cannot diverge.
//!
//! Evaluation uses SQL three-valued logic: comparing against `NULL` yields
//! unknown, `NOT unknown` stays unknown, and a row only matches when the
//! whole predicate is true.

use std::collections::BTreeSet;
use std::fmt;

use crate::criteria::CriteriaSet;
use crate::error::FilterError;
use crate::filter::Condition;
use crate::schema::Schema;
use crate::value::Value;

/// Read access to one (possibly joined) row.
pub trait Row {
    /// Value of `field` in this row; `None` is SQL `NULL`.
    fn value(&self, field: &str) -> Option<Value>;
}

/// A leaf comparison on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(Value),
    In(Vec<Value>),
    Gt(Value),
    Ge(Value),
    Lt(Value),
    Le(Value),
    /// Case-insensitive substring match.
    Like(String),
    IsNull,
}

impl Comparison {
    fn evaluate(&self, value: Option<&Value>) -> Option<bool> {
        use std::cmp::Ordering::{Equal, Greater, Less};

        if matches!(self, Self::IsNull) {
            return Some(value.is_none());
        }
        let value = value?;
        match self {
            Self::Eq(v) => value.compare(v).map(|o| o == Equal),
            Self::In(vs) => Some(vs.iter().any(|v| value.compare(v) == Some(Equal))),
            Self::Gt(v) => value.compare(v).map(|o| o == Greater),
            Self::Ge(v) => value.compare(v).map(|o| o != Less),
            Self::Lt(v) => value.compare(v).map(|o| o == Less),
            Self::Le(v) => value.compare(v).map(|o| o != Greater),
            Self::Like(needle) => Some(value.contains_ignore_case(needle)),
            Self::IsNull => Some(false),
        }
    }
}

/// A composable predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    True,
    Compare {
        field: String,
        comparison: Comparison,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, comparison: Comparison) -> Self {
        Self::Compare {
            field: field.into(),
            comparison,
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Conjunction of `parts`, flattening nested ANDs and dropping `True`.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::True => {}
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::True,
            1 => flat.remove(0),
            _ => Self::And(flat),
        }
    }

    /// Compiles `criteria` against `schema`.
    ///
    /// Every present condition becomes one fragment; fragments are ANDed.
    ///
    /// # Errors
    /// Returns [`FilterError`] if a filtered field is unknown to the schema
    /// or a condition does not fit the field's declared type.
    pub fn from_criteria(schema: Schema, criteria: &CriteriaSet) -> Result<Self, FilterError> {
        let mut parts = Vec::new();
        for spec in criteria.filters() {
            let field = schema.field(spec.field()).ok_or_else(|| FilterError::UnknownField {
                entity: schema.entity.name(),
                field: spec.field().to_string(),
            })?;
            for condition in spec.conditions() {
                condition.check(field.name, field.field_type)?;
                parts.push(Self::from_condition(field.name, condition));
            }
        }
        Ok(Self::and(parts))
    }

    fn from_condition(field: &str, condition: &Condition) -> Self {
        match condition {
            Condition::Equals(v) => Self::compare(field, Comparison::Eq(v.clone())),
            Condition::NotEquals(v) => Self::compare(field, Comparison::Eq(v.clone())).negate(),
            Condition::In(vs) => Self::compare(field, Comparison::In(vs.clone())),
            Condition::NotIn(vs) => Self::compare(field, Comparison::In(vs.clone())).negate(),
            Condition::GreaterThan(v) => Self::compare(field, Comparison::Gt(v.clone())),
            Condition::GreaterThanOrEqual(v) => Self::compare(field, Comparison::Ge(v.clone())),
            Condition::LessThan(v) => Self::compare(field, Comparison::Lt(v.clone())),
            Condition::LessThanOrEqual(v) => Self::compare(field, Comparison::Le(v.clone())),
            Condition::Contains(s) => Self::compare(field, Comparison::Like(s.clone())),
            Condition::DoesNotContain(s) => {
                Self::compare(field, Comparison::Like(s.clone())).negate()
            }
            Condition::Specified(true) => Self::compare(field, Comparison::IsNull).negate(),
            Condition::Specified(false) => Self::compare(field, Comparison::IsNull),
        }
    }

    /// Field names referenced anywhere in the tree.
    #[must_use]
    pub fn fields(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::True => {}
            Self::Compare { field, .. } => {
                out.insert(field.as_str());
            }
            Self::Not(inner) => inner.collect_fields(out),
            Self::And(parts) => parts.iter().for_each(|p| p.collect_fields(out)),
        }
    }

    /// Three-valued evaluation; `None` is unknown.
    pub fn evaluate(&self, row: &dyn Row) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::Compare { field, comparison } => comparison.evaluate(row.value(field).as_ref()),
            Self::Not(inner) => inner.evaluate(row).map(|b| !b),
            Self::And(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.evaluate(row) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(true)
                }
            }
        }
    }

    /// Returns true only if the predicate is definitely true for `row`.
    pub fn matches(&self, row: &dyn Row) -> bool {
        self.evaluate(row) == Some(true)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("TRUE"),
            Self::Compare { field, comparison } => match comparison {
                Comparison::Eq(v) => write!(f, "{field} = {v}"),
                Comparison::In(vs) => {
                    let items: Vec<String> = vs.iter().map(ToString::to_string).collect();
                    write!(f, "{field} IN ({})", items.join(", "))
                }
                Comparison::Gt(v) => write!(f, "{field} > {v}"),
                Comparison::Ge(v) => write!(f, "{field} >= {v}"),
                Comparison::Lt(v) => write!(f, "{field} < {v}"),
                Comparison::Le(v) => write!(f, "{field} <= {v}"),
                Comparison::Like(s) => write!(f, "upper({field}) LIKE '%{}%'", s.to_uppercase()),
                Comparison::IsNull => write!(f, "{field} IS NULL"),
            },
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}
