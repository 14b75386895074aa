//! Error types for the curation API.
//!
//! All errors are strongly typed using thiserror. The taxonomy follows how
//! a request can fail: a malformed filter is the caller's fault, a lookup
//! miss is an absent result, and a store failure is fatal for the request.

use thiserror::Error;

use crate::storage::StorageError;
use crate::value::FieldType;

/// Errors raised while turning request parameters into criteria.
///
/// Every variant is a client error: the request is rejected and no partial
/// result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Unknown field '{field}' for entity {entity}")]
    UnknownField {
        entity: &'static str,
        field: String,
    },

    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator {
        field: String,
        operator: String,
    },

    #[error("Operator '{operator}' is not supported on {field_type} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: String,
        field_type: FieldType,
    },

    #[error("Value '{value}' for field '{field}' is not a valid {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        value: String,
    },

    #[error("Malformed parameter '{parameter}': {reason}")]
    MalformedParameter {
        parameter: String,
        reason: String,
    },

    #[error("Invalid page request: {reason}")]
    InvalidPage {
        reason: String,
    },
}

/// Top-level error type for the curation API.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("{entity} not found: {key}")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
}

impl CurationError {
    /// Creates a not-found error for a single-entity lookup.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Returns true if the caller caused this error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFilter(_) | Self::NotFound { .. })
    }

    /// HTTP status code this error surfaces as.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidFilter(_) => 400,
            Self::NotFound { .. } => 404,
            Self::StoreUnavailable(_) => 500,
        }
    }

    /// Short title for problem documents.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidFilter(_) => "Bad Request",
            Self::NotFound { .. } => "Not Found",
            Self::StoreUnavailable(_) => "Internal Server Error",
        }
    }
}

/// Result type alias for curation operations.
pub type CurationResult<T> = Result<T, CurationError>;
