//! # fieldguard
//!
//! Construction-time validation for entity types. Rules are attached to
//! fields, every field assignment during construction runs the rules of the
//! active group, and the construction either fails with an aggregate error
//! or yields an instance that reports its causes.
//!
//! ## Example
//!
//! ```rust
//! use fieldguard::prelude::*;
//!
//! #[derive(Debug, Validated)]
//! struct Person {
//!     #[validate(is_positive_number(min = 18))]
//!     age: u32,
//!
//!     #[validate(required, message = "{requiredProperty}")]
//!     #[validate(is_email)]
//!     email: Option<String>,
//! }
//!
//! let person = Person::activate(|ctx| {
//!     Ok(Person {
//!         age: ctx.set("age", 21)?,
//!         email: ctx.set("email", Some("ann@example.com".to_string()))?,
//!     })
//! })
//! .unwrap();
//! assert_eq!(person.age, 21);
//!
//! let error = Person::activate(|ctx| {
//!     Ok(Person {
//!         age: ctx.set("age", 15)?,
//!         email: ctx.set("email", None::<String>)?,
//!     })
//! })
//! .unwrap_err()
//! .into_invalid()
//! .unwrap();
//! assert_eq!(error.constraints(), vec!["IsPositiveNumber", "Required"]);
//! ```
//!
//! ## Constraints
//!
//! - `not_empty` - Not null and not an empty array
//! - `is_boolean` - JSON boolean
//! - `is_number(min = X, max = Y)` - Number within optional bounds
//! - `is_positive_number(min = X, max = Y)` - Number above zero
//! - `is_positive_or_zero_number(min = X, max = Y)` - Number at or above zero
//! - `is_string` - String
//! - `not_empty_string` - String with non-whitespace content
//! - `is_array` - Array
//! - `is_email` - Email address
//! - `is_phone(minlen = X, maxlen = Y)` - Phone number, 10 to 14 digits by default
//! - `is_member_of(a, b, ...)` - One of the listed values
//! - `required` - Present and not null
//! - `custom(id = "..", check = path)` - Caller-supplied predicate
//!
//! ## Error Format
//!
//! Aggregate errors serialize to:
//!
//! ```json
//! {
//!   "error": {
//!     "type": "validation_error",
//!     "message": "{IsPositiveNumber}",
//!     "causes": [
//!       {"constraint": "IsPositiveNumber", "message": "{IsPositiveNumber}", "property": "age", "value": 15}
//!     ]
//!   }
//! }
//! ```

extern crate self as fieldguard;

pub mod activation;
pub mod construction;
pub mod error;
pub mod group;
pub mod message;
pub mod predicate;
pub mod registry;
pub mod rules;
mod snapshot;
mod validate;


pub use activation::{Activation, Activator, Mode, Phase, Sealed};
pub use construction::{Construction, ErrorAccumulator};
pub use error::{AggregateValidationError, Error, Result, SchemaError, ValidationCause};
pub use group::ValidationGroup;
pub use message::{MessageResolver, MessageTable};
pub use registry::{FieldRegistration, Schema, SchemaBuilder};
pub use rules::{Bounds, Check, Constraint, Predicate, Rule, RuleSpec};
pub use validate::Validated;

/// Derive [`Validated`] from `#[validate(...)]` field attributes.
pub use fieldguard_macros::Validated;

/// Dynamic value seen by predicates.
pub use serde_json::Value;

/// Prelude module for validation
pub mod prelude {
    pub use crate::activation::{Activation, Activator, Mode, Sealed};
    pub use crate::construction::Construction;
    pub use crate::error::{AggregateValidationError, Error, ValidationCause};
    pub use crate::group::ValidationGroup;
    pub use crate::message::MessageTable;
    pub use crate::registry::Schema;
    pub use crate::rules::{Bounds, Rule};
    pub use crate::validate::Validated;
    pub use fieldguard_macros::Validated;
}
