//! Per-field filter specifications.
//!
//! A [`FilterSpec`] is an optional, typed constraint on one entity field.
//! It holds one or more [`Condition`]s which all have to hold (AND). The
//! operator names match the `<field>.<operator>=<value>` request parameter
//! convention.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::schema::FieldDef;
use crate::value::{FieldType, Value};

/// A single condition on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "value", rename_all = "camelCase")]
pub enum Condition {
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    /// Case-insensitive substring match.
    Contains(String),
    DoesNotContain(String),
    /// `true` requires a non-null value, `false` requires null.
    Specified(bool),
}

/// Every operator name accepted in request parameters.
pub const OPERATORS: &[&str] = &[
    "equals",
    "notEquals",
    "in",
    "notIn",
    "greaterThan",
    "greaterThanOrEqual",
    "lessThan",
    "lessThanOrEqual",
    "contains",
    "doesNotContain",
    "specified",
];

impl Condition {
    /// Request parameter name of this operator.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::NotEquals(_) => "notEquals",
            Self::In(_) => "in",
            Self::NotIn(_) => "notIn",
            Self::GreaterThan(_) => "greaterThan",
            Self::GreaterThanOrEqual(_) => "greaterThanOrEqual",
            Self::LessThan(_) => "lessThan",
            Self::LessThanOrEqual(_) => "lessThanOrEqual",
            Self::Contains(_) => "contains",
            Self::DoesNotContain(_) => "doesNotContain",
            Self::Specified(_) => "specified",
        }
    }

    const fn is_range(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan(_)
                | Self::GreaterThanOrEqual(_)
                | Self::LessThan(_)
                | Self::LessThanOrEqual(_)
        )
    }

    const fn is_substring(&self) -> bool {
        matches!(self, Self::Contains(_) | Self::DoesNotContain(_))
    }

    fn values(&self) -> &[Value] {
        match self {
            Self::Equals(v)
            | Self::NotEquals(v)
            | Self::GreaterThan(v)
            | Self::GreaterThanOrEqual(v)
            | Self::LessThan(v)
            | Self::LessThanOrEqual(v) => std::slice::from_ref(v),
            Self::In(vs) | Self::NotIn(vs) => vs,
            Self::Contains(_) | Self::DoesNotContain(_) | Self::Specified(_) => &[],
        }
    }

    /// Parse `<operator>=<raw>` for `field`, coercing `raw` to the field type.
    ///
    /// `in` and `notIn` take a comma-separated list.
    ///
    /// # Errors
    /// Returns a [`FilterError`] for unknown or unsupported operators and
    /// for values that do not coerce to the field type.
    pub fn parse(field: &FieldDef, operator: &str, raw: &str) -> Result<Self, FilterError> {
        let ty = field.field_type;
        let name = field.name;
        let condition = match operator {
            "equals" => Self::Equals(ty.coerce(name, raw)?),
            "notEquals" => Self::NotEquals(ty.coerce(name, raw)?),
            "in" => Self::In(coerce_list(ty, name, raw)?),
            "notIn" => Self::NotIn(coerce_list(ty, name, raw)?),
            "greaterThan" => Self::GreaterThan(ty.coerce(name, raw)?),
            "greaterThanOrEqual" => Self::GreaterThanOrEqual(ty.coerce(name, raw)?),
            "lessThan" => Self::LessThan(ty.coerce(name, raw)?),
            "lessThanOrEqual" => Self::LessThanOrEqual(ty.coerce(name, raw)?),
            "contains" => Self::Contains(raw.to_string()),
            "doesNotContain" => Self::DoesNotContain(raw.to_string()),
            "specified" => {
                let flag = FieldType::Boolean.coerce(name, raw)?.as_bool().ok_or_else(|| {
                    FilterError::TypeMismatch {
                        field: name.to_string(),
                        expected: FieldType::Boolean,
                        value: raw.to_string(),
                    }
                })?;
                Self::Specified(flag)
            }
            other => {
                return Err(FilterError::UnknownOperator {
                    field: name.to_string(),
                    operator: other.to_string(),
                })
            }
        };
        condition.check(name, ty)?;
        Ok(condition)
    }

    /// Verify the operator applies to `field_type` and every value fits it.
    ///
    /// # Errors
    /// Returns [`FilterError::UnsupportedOperator`] or
    /// [`FilterError::TypeMismatch`].
    pub fn check(&self, field: &str, field_type: FieldType) -> Result<(), FilterError> {
        let supported = (!self.is_range() || field_type.is_ordered())
            && (!self.is_substring() || field_type.is_textual());
        if !supported {
            return Err(FilterError::UnsupportedOperator {
                field: field.to_string(),
                operator: self.operator().to_string(),
                field_type,
            });
        }
        if let Some(bad) = self.values().iter().find(|v| !field_type.accepts(v)) {
            return Err(FilterError::TypeMismatch {
                field: field.to_string(),
                expected: field_type,
                value: bad.to_string(),
            });
        }
        Ok(())
    }
}

fn coerce_list(ty: FieldType, field: &str, raw: &str) -> Result<Vec<Value>, FilterError> {
    raw.split(',').map(|item| ty.coerce(field, item)).collect()
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.operator())?;
        match self {
            Self::In(vs) | Self::NotIn(vs) => {
                let items: Vec<String> = vs.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Contains(s) | Self::DoesNotContain(s) => write!(f, "{s:?}"),
            Self::Specified(b) => write!(f, "{b}"),
            Self::Equals(v)
            | Self::NotEquals(v)
            | Self::GreaterThan(v)
            | Self::GreaterThanOrEqual(v)
            | Self::LessThan(v)
            | Self::LessThanOrEqual(v) => write!(f, "{v}"),
        }
    }
}

/// An optional typed constraint on one field.
///
/// # Examples
///
/// ```
/// use curation_api::{FieldType, FilterSpec};
///
/// let spec = FilterSpec::new("id", FieldType::Long)
///     .greater_than(5_i64)
///     .less_than_or_equal(10_i64);
/// assert_eq!(spec.conditions().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    field: String,
    field_type: FieldType,
    conditions: Vec<Condition>,
}

impl FilterSpec {
    /// Creates an empty filter on `field`. An empty filter imposes no constraint.
    #[must_use]
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type,
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Adds a condition.
    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn equals(self, value: impl Into<Value>) -> Self {
        self.with(Condition::Equals(value.into()))
    }

    #[must_use]
    pub fn not_equals(self, value: impl Into<Value>) -> Self {
        self.with(Condition::NotEquals(value.into()))
    }

    #[must_use]
    pub fn in_list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.with(Condition::In(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn not_in_list<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.with(Condition::NotIn(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn greater_than(self, value: impl Into<Value>) -> Self {
        self.with(Condition::GreaterThan(value.into()))
    }

    #[must_use]
    pub fn greater_than_or_equal(self, value: impl Into<Value>) -> Self {
        self.with(Condition::GreaterThanOrEqual(value.into()))
    }

    #[must_use]
    pub fn less_than(self, value: impl Into<Value>) -> Self {
        self.with(Condition::LessThan(value.into()))
    }

    #[must_use]
    pub fn less_than_or_equal(self, value: impl Into<Value>) -> Self {
        self.with(Condition::LessThanOrEqual(value.into()))
    }

    /// Inclusive range; either bound may be omitted.
    #[must_use]
    pub fn range<V: Into<Value>>(self, min: Option<V>, max: Option<V>) -> Self {
        let spec = match min {
            Some(v) => self.greater_than_or_equal(v),
            None => self,
        };
        match max {
            Some(v) => spec.less_than_or_equal(v),
            None => spec,
        }
    }

    #[must_use]
    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.with(Condition::Contains(needle.into()))
    }

    #[must_use]
    pub fn does_not_contain(self, needle: impl Into<String>) -> Self {
        self.with(Condition::DoesNotContain(needle.into()))
    }

    #[must_use]
    pub fn specified(self, specified: bool) -> Self {
        self.with(Condition::Specified(specified))
    }

    /// Checks every condition against the declared field type.
    ///
    /// # Errors
    /// Returns the first failing condition's [`FilterError`].
    pub fn validate(&self) -> Result<(), FilterError> {
        self.conditions
            .iter()
            .try_for_each(|c| c.check(&self.field, self.field_type))
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}.{condition}", self.field)?;
        }
        Ok(())
    }
}
