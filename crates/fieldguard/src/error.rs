//! Validation error types and JSON error format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Result type alias for fieldguard operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A single failed constraint on a single field.
///
/// One cause is recorded per failed rule per assignment; a field with two
/// stacked failing rules yields two causes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCause {
    /// The constraint identifier (e.g., "IsEmail", "Required")
    pub constraint: String,
    /// Human-readable message, or a `{token}` placeholder until resolved
    pub message: String,
    /// The field that failed validation
    pub property: String,
    /// The value that was assigned when the rule failed
    #[serde(default)]
    pub value: Value,
}

impl ValidationCause {
    /// Create a new cause.
    pub fn new(
        constraint: impl Into<String>,
        message: impl Into<String>,
        property: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            constraint: constraint.into(),
            message: message.into(),
            property: property.into(),
            value,
        }
    }
}

impl fmt::Display for ValidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.constraint, self.property, self.message)
    }
}

/// Internal error structure for JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
    causes: Vec<ValidationCause>,
}

/// Wrapper for the error response format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

/// Aggregate failure raised when a throwing-mode entity has causes.
///
/// The top-level message is the first cause's resolved message, so callers
/// that only care about one problem can print the error directly.
///
/// Serializes to:
///
/// ```json
/// {
///   "error": {
///     "type": "validation_error",
///     "message": "age is too young",
///     "causes": [...]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateValidationError {
    /// Every recorded cause, in assignment order
    pub causes: Vec<ValidationCause>,
    /// First cause's message, or "ValidationError" when there are none
    pub message: String,
}

impl AggregateValidationError {
    /// Create an aggregate error from a cause list.
    pub fn new(causes: Vec<ValidationCause>) -> Self {
        let message = causes
            .first()
            .map(|c| c.message.clone())
            .unwrap_or_else(|| "ValidationError".to_string());
        Self { causes, message }
    }

    /// Check if there are any causes.
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Get the number of causes.
    pub fn len(&self) -> usize {
        self.causes.len()
    }

    /// Get the causes recorded for one property.
    pub fn causes_for<'a>(
        &'a self,
        property: &'a str,
    ) -> impl Iterator<Item = &'a ValidationCause> + 'a {
        self.causes.iter().filter(move |c| c.property == property)
    }

    /// Get the constraint ids of all causes, in order.
    pub fn constraints(&self) -> Vec<&str> {
        self.causes.iter().map(|c| c.constraint.as_str()).collect()
    }

    /// Consume the error and return its causes.
    pub fn into_causes(self) -> Vec<ValidationCause> {
        self.causes
    }
}

impl fmt::Display for AggregateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AggregateValidationError {}

impl Serialize for AggregateValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wrapper = ErrorWrapper {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: self.message.clone(),
                causes: self.causes.clone(),
            },
        };
        wrapper.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AggregateValidationError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wrapper = ErrorWrapper::deserialize(deserializer)?;
        Ok(Self {
            causes: wrapper.error.causes,
            message: wrapper.error.message,
        })
    }
}

/// Errors surfaced by construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more constraints failed on a throwing-mode entity
    #[error(transparent)]
    Invalid(#[from] AggregateValidationError),

    /// A value could not be represented for the rules to inspect
    #[error("value assigned to `{field}` cannot be represented as JSON: {source}")]
    Unrepresentable {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Get the aggregate validation error, if this is one.
    pub fn as_invalid(&self) -> Option<&AggregateValidationError> {
        match self {
            Error::Invalid(e) => Some(e),
            Error::Unrepresentable { .. } => None,
        }
    }

    /// Consume the error, returning the aggregate validation error if this is one.
    pub fn into_invalid(self) -> Option<AggregateValidationError> {
        match self {
            Error::Invalid(e) => Some(e),
            Error::Unrepresentable { .. } => None,
        }
    }
}

/// Malformed schema configuration, reported once when a schema is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema `{schema}` registers a rule on an empty field name")]
    EmptyFieldName { schema: String },

    #[error("`{field}`: IsMemberOf needs at least one candidate")]
    EmptyMemberSet { field: String },

    #[error("`{field}`: {constraint} bound min ({min}) is greater than max ({max})")]
    InvertedBounds {
        field: String,
        constraint: String,
        min: f64,
        max: f64,
    },

    #[error("`{field}`: {constraint} bound must be a finite number")]
    NonFiniteBound { field: String, constraint: String },

    #[error("`{field}`: IsPhone digit range {minlen}..={maxlen} is invalid")]
    InvalidPhoneLength {
        field: String,
        minlen: usize,
        maxlen: usize,
    },

    #[error("`{field}`: custom constraint needs a non-empty id")]
    EmptyConstraintId { field: String },
}
