//! Constraint rules.
//!
//! [`Constraint`] lists the built-in checks; [`Rule`] is what gets
//! registered on a field: a constraint (or custom predicate) plus its
//! message and groups.

mod constraint;
mod rule;

pub use constraint::{Bounds, Constraint};
pub use rule::{Check, Predicate, Rule, RuleSpec};
