//! Built-in constraint kinds.

use crate::error::SchemaError;
use crate::predicate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional inclusive numeric bounds.
///
/// Presence means bounded: `Some(0.0)` is a real bound of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum value (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum value (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    /// No bounds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Only a minimum.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Only a maximum.
    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Both bounds.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn verify(&self, field: &str, constraint: &str) -> Result<(), SchemaError> {
        let non_finite = |b: Option<f64>| b.map_or(false, |b| !b.is_finite());
        if non_finite(self.min) || non_finite(self.max) {
            return Err(SchemaError::NonFiniteBound {
                field: field.to_string(),
                constraint: constraint.to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(SchemaError::InvertedBounds {
                    field: field.to_string(),
                    constraint: constraint.to_string(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    fn attribute_args(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!("min = {}", min));
        }
        if let Some(max) = self.max {
            parts.push(format!("max = {}", max));
        }
        parts
    }
}

fn default_phone_min() -> usize {
    predicate::PHONE_MIN_DIGITS
}

fn default_phone_max() -> usize {
    predicate::PHONE_MAX_DIGITS
}

/// A built-in constraint and its parameters.
///
/// Serializable so rule sets can live in configuration and be printed back
/// as `#[validate(...)]` attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Not null and not an empty array
    NotEmpty,
    /// JSON boolean
    IsBoolean,
    /// JSON number within optional bounds
    IsNumber(Bounds),
    /// Number greater than zero within optional bounds
    IsPositiveNumber(Bounds),
    /// Number greater than or equal to zero within optional bounds
    IsPositiveOrZeroNumber(Bounds),
    /// JSON string
    IsString,
    /// String with non-whitespace content
    NotEmptyString,
    /// JSON array
    IsArray,
    /// Email address
    IsEmail,
    /// Phone number with a digit count in `minlen..=maxlen`
    IsPhone {
        #[serde(default = "default_phone_min")]
        minlen: usize,
        #[serde(default = "default_phone_max")]
        maxlen: usize,
    },
    /// One of a fixed set of values
    IsMemberOf { candidates: Vec<Value> },
    /// Present and not null
    Required,
}

impl Constraint {
    /// Constraint id reported when the input entity itself is absent.
    pub const IS_PRESENTED: &'static str = "IsPresented";

    /// Phone constraint with the default 10 to 14 digit range.
    pub fn phone() -> Self {
        Constraint::IsPhone {
            minlen: predicate::PHONE_MIN_DIGITS,
            maxlen: predicate::PHONE_MAX_DIGITS,
        }
    }

    /// The constraint id recorded on causes.
    pub fn id(&self) -> &'static str {
        match self {
            Constraint::NotEmpty => "NotEmpty",
            Constraint::IsBoolean => "IsBoolean",
            Constraint::IsNumber(_) => "IsNumber",
            Constraint::IsPositiveNumber(_) => "IsPositiveNumber",
            Constraint::IsPositiveOrZeroNumber(_) => "IsPositiveOrZeroNumber",
            Constraint::IsString => "IsString",
            Constraint::NotEmptyString => "NotEmptyString",
            Constraint::IsArray => "IsArray",
            Constraint::IsEmail => "IsEmail",
            Constraint::IsPhone { .. } => "IsPhone",
            Constraint::IsMemberOf { .. } => "IsMemberOf",
            Constraint::Required => "Required",
        }
    }

    /// Run the predicate for this constraint.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Constraint::NotEmpty => predicate::is_not_empty(value),
            Constraint::IsBoolean => predicate::is_boolean(value),
            Constraint::IsNumber(b) => predicate::is_number(value, b.min, b.max),
            Constraint::IsPositiveNumber(b) => predicate::is_positive_number(value, b.min, b.max),
            Constraint::IsPositiveOrZeroNumber(b) => {
                predicate::is_positive_or_zero_number(value, b.min, b.max)
            }
            Constraint::IsString => predicate::is_string(value),
            Constraint::NotEmptyString => predicate::is_non_blank_string(value),
            Constraint::IsArray => predicate::is_array(value),
            Constraint::IsEmail => predicate::is_email(value),
            Constraint::IsPhone { minlen, maxlen } => predicate::is_phone(value, *minlen, *maxlen),
            Constraint::IsMemberOf { candidates } => predicate::is_member_of(value, candidates),
            Constraint::Required => !value.is_null(),
        }
    }

    /// Run the predicate for a NaN or infinite float.
    ///
    /// Such values have no JSON form. They count as present numbers: NaN
    /// fails `NotEmpty` and every bound, infinities compare normally.
    pub fn check_float(&self, n: f64) -> bool {
        match self {
            Constraint::NotEmpty => !n.is_nan(),
            Constraint::IsNumber(b) => predicate::within(n, b.min, b.max),
            Constraint::IsPositiveNumber(b) => n > 0.0 && predicate::within(n, b.min, b.max),
            Constraint::IsPositiveOrZeroNumber(b) => {
                n >= 0.0 && predicate::within(n, b.min, b.max)
            }
            Constraint::Required => true,
            _ => false,
        }
    }

    /// Reject parameter combinations that can never validate meaningfully.
    pub fn verify(&self, field: &str) -> Result<(), SchemaError> {
        match self {
            Constraint::IsNumber(b)
            | Constraint::IsPositiveNumber(b)
            | Constraint::IsPositiveOrZeroNumber(b) => b.verify(field, self.id()),
            Constraint::IsPhone { minlen, maxlen } if *minlen == 0 || minlen > maxlen => {
                Err(SchemaError::InvalidPhoneLength {
                    field: field.to_string(),
                    minlen: *minlen,
                    maxlen: *maxlen,
                })
            }
            Constraint::IsMemberOf { candidates } if candidates.is_empty() => {
                Err(SchemaError::EmptyMemberSet {
                    field: field.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The `#[validate(...)]` argument naming this constraint.
    pub fn attribute(&self) -> String {
        let with_args = |name: &str, parts: Vec<String>| {
            if parts.is_empty() {
                name.to_string()
            } else {
                format!("{}({})", name, parts.join(", "))
            }
        };

        match self {
            Constraint::NotEmpty => "not_empty".to_string(),
            Constraint::IsBoolean => "is_boolean".to_string(),
            Constraint::IsNumber(b) => with_args("is_number", b.attribute_args()),
            Constraint::IsPositiveNumber(b) => with_args("is_positive_number", b.attribute_args()),
            Constraint::IsPositiveOrZeroNumber(b) => {
                with_args("is_positive_or_zero_number", b.attribute_args())
            }
            Constraint::IsString => "is_string".to_string(),
            Constraint::NotEmptyString => "not_empty_string".to_string(),
            Constraint::IsArray => "is_array".to_string(),
            Constraint::IsEmail => "is_email".to_string(),
            Constraint::IsPhone { minlen, maxlen } => {
                if *minlen == predicate::PHONE_MIN_DIGITS && *maxlen == predicate::PHONE_MAX_DIGITS
                {
                    "is_phone".to_string()
                } else {
                    format!("is_phone(minlen = {}, maxlen = {})", minlen, maxlen)
                }
            }
            Constraint::IsMemberOf { candidates } => with_args(
                "is_member_of",
                candidates.iter().map(|c| c.to_string()).collect(),
            ),
            Constraint::Required => "required".to_string(),
        }
    }
}
