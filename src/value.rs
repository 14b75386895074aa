//! Field values and the field types they are checked against.
//!
//! Every filterable entity field declares a [`FieldType`] at schema
//! definition time. Raw HTTP parameter strings are coerced into a typed
//! [`Value`] through that declaration, so a filter can never carry a value
//! that does not match its column.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Declared type of a filterable field.
///
/// One variant per filter family: long, integer, double, string, boolean
/// and instant columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Long,
    Integer,
    Double,
    String,
    Boolean,
    Instant,
}

impl FieldType {
    /// Returns true if range operators (`greaterThan`, ...) apply to this type.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, Self::Long | Self::Integer | Self::Double | Self::Instant)
    }

    /// Returns true if substring operators (`contains`, ...) apply to this type.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String)
    }

    /// Returns true if `value` can be stored in a field of this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Long, Value::Int(_)) | (Self::Double, Value::Float(_) | Value::Int(_)) => true,
            (Self::Integer, Value::Int(v)) => i32::try_from(*v).is_ok(),
            (Self::String, Value::String(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Instant, Value::Instant(_)) => true,
            _ => false,
        }
    }

    /// Coerce a raw parameter string into a value of this type.
    ///
    /// # Errors
    /// Returns [`FilterError::TypeMismatch`] when `raw` is not a valid
    /// literal for this type.
    pub fn coerce(self, field: &str, raw: &str) -> Result<Value, FilterError> {
        let mismatch = || FilterError::TypeMismatch {
            field: field.to_string(),
            expected: self,
            value: raw.to_string(),
        };
        let trimmed = raw.trim();

        match self {
            Self::Long => trimmed.parse::<i64>().map(Value::Int).map_err(|_| mismatch()),
            Self::Integer => trimmed
                .parse::<i32>()
                .map(|v| Value::Int(i64::from(v)))
                .map_err(|_| mismatch()),
            Self::Double => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                _ => Err(mismatch()),
            },
            Self::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(mismatch())
                }
            }
            Self::Instant => DateTime::parse_from_rfc3339(trimmed)
                .map(|t| Value::Instant(t.with_timezone(&Utc)))
                .map_err(|_| mismatch()),
            // Strings are taken verbatim, surrounding whitespace included.
            Self::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Long => "long",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Instant => "instant",
        };
        f.write_str(name)
    }
}

/// A typed field value.
///
/// SQL `NULL` is not a variant: absent values are `Option<Value>::None`
/// wherever a column may be null.
///
/// # Examples
///
/// ```
/// use curation_api::Value;
///
/// let id = Value::Int(42);
/// let symbol = Value::from("BRAF");
///
/// assert_eq!(id.as_int(), Some(42));
/// assert_eq!(symbol.as_string(), Some("BRAF"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Instant(DateTime<Utc>),
}

impl Value {
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Instant(_) => "instant",
        }
    }

    /// Total order between comparable values.
    ///
    /// Integers and floats compare numerically with each other. Values of
    /// unrelated types are incomparable and yield `None`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_float()?.partial_cmp(&other.as_float()?)
            }
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Instant(a), Self::Instant(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Case-insensitive substring test. Non-string values never match.
    #[must_use]
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.as_string()
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Instant(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_long() {
        assert_eq!(FieldType::Long.coerce("id", "42").unwrap(), Value::Int(42));
        assert_eq!(FieldType::Long.coerce("id", " -7 ").unwrap(), Value::Int(-7));
        assert!(matches!(
            FieldType::Long.coerce("id", "abc"),
            Err(FilterError::TypeMismatch { expected: FieldType::Long, .. })
        ));
    }

    #[test]
    fn test_coerce_integer_rejects_overflow() {
        assert_eq!(
            FieldType::Integer.coerce("entrezGeneId", "673").unwrap(),
            Value::Int(673)
        );
        assert!(FieldType::Integer.coerce("entrezGeneId", "3000000000").is_err());
    }

    #[test]
    fn test_coerce_double_rejects_non_finite() {
        assert_eq!(FieldType::Double.coerce("score", "1.5").unwrap(), Value::Float(1.5));
        assert!(FieldType::Double.coerce("score", "NaN").is_err());
        assert!(FieldType::Double.coerce("score", "inf").is_err());
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(FieldType::Boolean.coerce("enabled", "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(FieldType::Boolean.coerce("enabled", "false").unwrap(), Value::Bool(false));
        assert!(FieldType::Boolean.coerce("enabled", "yes").is_err());
    }

    #[test]
    fn test_coerce_instant() {
        let v = FieldType::Instant
            .coerce("createdDate", "2024-05-01T12:00:00Z")
            .unwrap();
        assert!(v.as_instant().is_some());
        assert!(FieldType::Instant.coerce("createdDate", "yesterday").is_err());
    }

    #[test]
    fn test_coerce_string_is_verbatim() {
        assert_eq!(
            FieldType::String.coerce("name", " BRAF ").unwrap(),
            Value::String(" BRAF ".to_string())
        );
    }

    #[test]
    fn test_accepts() {
        assert!(FieldType::Long.accepts(&Value::Int(1)));
        assert!(!FieldType::Long.accepts(&Value::String("1".into())));
        assert!(FieldType::Double.accepts(&Value::Int(1)));
        assert!(!FieldType::Integer.accepts(&Value::Int(i64::MAX)));
        assert!(FieldType::Instant.accepts(&Value::Instant(Utc::now())));
    }

    #[test]
    fn test_compare_mixed_numeric() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Float(3.0).compare(&Value::Int(3)), Some(Ordering::Equal));
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
    }

    #[test]
    fn test_contains_ignore_case() {
        let v = Value::from("Oncogenic Fusion");
        assert!(v.contains_ignore_case("fusion"));
        assert!(v.contains_ignore_case("ONCO"));
        assert!(!v.contains_ignore_case("tumor"));
        assert!(!Value::Int(10).contains_ignore_case("1"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::String("hi".into())), "\"hi\"");
    }

    #[test]
    fn test_value_type_mismatch() {
        let val = Value::Bool(true);
        assert!(val.as_int().is_none());
        assert!(val.as_float().is_none());
        assert!(val.as_string().is_none());
        assert_eq!(val.type_name(), "bool");
    }
}
