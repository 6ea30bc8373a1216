//! Assignment interception for one construction attempt.

use crate::error::{Error, ValidationCause};
use crate::group::ValidationGroup;
use crate::registry::Schema;
use crate::snapshot;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Ordered, append-only list of causes for one construction.
///
/// The backing list is only allocated on the first failure.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator {
    causes: Option<Vec<ValidationCause>>,
}

impl ErrorAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cause.
    pub fn push(&mut self, cause: ValidationCause) {
        self.causes.get_or_insert_with(Vec::new).push(cause);
    }

    /// Check if no cause was recorded.
    pub fn is_empty(&self) -> bool {
        self.causes.as_ref().map_or(true, Vec::is_empty)
    }

    /// Get the number of recorded causes.
    pub fn len(&self) -> usize {
        self.causes.as_ref().map_or(0, Vec::len)
    }

    /// View the recorded causes.
    pub fn causes(&self) -> &[ValidationCause] {
        self.causes.as_deref().unwrap_or(&[])
    }

    /// Consume the accumulator, returning the causes in recording order.
    pub fn into_causes(self) -> Vec<ValidationCause> {
        self.causes.unwrap_or_default()
    }
}

/// Validation context handed to an entity's build closure.
///
/// Every field write goes through [`Construction::set`], which runs the
/// field's rules for the active group and records failures. The value is
/// always handed back so the caller stores it: validation is advisory per
/// field and only enforced when the construction is finalized.
///
/// ## Example
///
/// ```rust
/// use fieldguard::prelude::*;
///
/// let schema = Schema::builder("Person")
///     .register("age", Rule::is_positive_number(Bounds::at_least(18.0)))
///     .build()
///     .unwrap();
///
/// let mut ctx = Construction::standalone(&schema);
/// let age = ctx.set("age", 15).unwrap();
///
/// assert_eq!(age, 15);
/// assert_eq!(ctx.causes()[0].constraint, "IsPositiveNumber");
/// ```
#[derive(Debug)]
pub struct Construction<'s> {
    schema: &'s Schema,
    group: ValidationGroup,
    errors: ErrorAccumulator,
    assigned: HashSet<String>,
}

impl<'s> Construction<'s> {
    /// Start a construction that validates `schema` under `group`.
    pub fn new(schema: &'s Schema, group: ValidationGroup) -> Self {
        Self {
            schema,
            group,
            errors: ErrorAccumulator::new(),
            assigned: HashSet::new(),
        }
    }

    /// Start a construction outside of any activation, using the default group.
    pub fn standalone(schema: &'s Schema) -> Self {
        Self::new(schema, ValidationGroup::Default)
    }

    /// The schema being validated.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The active group.
    pub fn group(&self) -> &ValidationGroup {
        &self.group
    }

    /// Assign a field: run its rules on `value` and hand `value` back.
    ///
    /// Every applicable rule runs, in declaration order; failures accumulate
    /// instead of short-circuiting. `None` and other values that serialize to
    /// `null` only trip a `Required` rule. A NaN or infinite float is not
    /// `null`: it is present, and NaN fails `NotEmpty`.
    pub fn set<V: Serialize>(&mut self, field: &str, value: V) -> Result<V, Error> {
        if let Some(n) = snapshot::non_finite(&value) {
            self.observe_float(field, n);
            return Ok(value);
        }
        let snapshot = serde_json::to_value(&value).map_err(|source| Error::Unrepresentable {
            field: field.to_string(),
            source,
        })?;
        self.observe(field, &snapshot);
        Ok(value)
    }

    /// Assign a field whose value is already JSON.
    pub fn set_value(&mut self, field: &str, value: Value) -> Value {
        self.observe(field, &value);
        value
    }

    /// Assign a field from a JSON object, treating a missing key as `null`.
    pub fn take(&mut self, entity: &Value, field: &str) -> Value {
        let value = entity.get(field).cloned().unwrap_or(Value::Null);
        self.set_value(field, value)
    }

    fn observe(&mut self, field: &str, value: &Value) {
        self.assigned.insert(field.to_string());

        for rule in self.schema.rules_for(field, &self.group) {
            if let Some(cause) = rule.evaluate(field, value) {
                tracing::trace!(
                    schema = %self.schema.name(),
                    field,
                    constraint = %cause.constraint,
                    "constraint failed"
                );
                self.errors.push(cause);
            }
        }
    }

    fn observe_float(&mut self, field: &str, n: f64) {
        self.assigned.insert(field.to_string());

        for rule in self.schema.rules_for(field, &self.group) {
            if let Some(cause) = rule.evaluate_float(field, n) {
                tracing::trace!(
                    schema = %self.schema.name(),
                    field,
                    constraint = %cause.constraint,
                    value = n,
                    "constraint failed"
                );
                self.errors.push(cause);
            }
        }
    }

    /// Whether `field` has been assigned at least once.
    pub fn is_assigned(&self, field: &str) -> bool {
        self.assigned.contains(field)
    }

    /// Causes recorded so far.
    pub fn causes(&self) -> &[ValidationCause] {
        self.errors.causes()
    }

    /// Record `Required` failures for required fields that were never assigned,
    /// then hand back every cause.
    pub(crate) fn into_checked_causes(mut self) -> Vec<ValidationCause> {
        let missing: Vec<ValidationCause> = self
            .schema
            .required_fields(&self.group)
            .filter(|(field, _)| !self.assigned.contains(*field))
            .map(|(field, rule)| {
                ValidationCause::new(rule.constraint(), rule.failure_message(), field, Value::Null)
            })
            .collect();

        for cause in missing {
            self.errors.push(cause);
        }
        self.errors.into_causes()
    }
}
