//! Per-entity rule registry.

use crate::error::{SchemaError, ValidationCause};
use crate::group::ValidationGroup;
use crate::rules::{Check, Rule};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Rules registered on one field, bucketed by group.
///
/// Within a group, rules keep their declaration order.
#[derive(Debug, Clone)]
pub struct FieldRegistration {
    field: String,
    rules_by_group: HashMap<ValidationGroup, Vec<Arc<Rule>>>,
}

impl FieldRegistration {
    fn new(field: String) -> Self {
        Self {
            field,
            rules_by_group: HashMap::new(),
        }
    }

    fn push(&mut self, rule: Rule) {
        let rule = Arc::new(rule);
        for group in rule.effective_groups() {
            self.rules_by_group
                .entry(group)
                .or_default()
                .push(Arc::clone(&rule));
        }
    }

    /// The field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Rules that run for an activation of `group`.
    pub fn rules_for(&self, group: &ValidationGroup) -> &[Arc<Rule>] {
        self.rules_by_group
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The `Required` rule for `group`, if one is registered.
    pub fn required_rule(&self, group: &ValidationGroup) -> Option<&Rule> {
        self.rules_for(group)
            .iter()
            .map(Arc::as_ref)
            .find(|rule| rule.is_required())
    }

    /// Groups this field has rules under.
    pub fn groups(&self) -> impl Iterator<Item = &ValidationGroup> {
        self.rules_by_group.keys()
    }
}

/// Builder for a [`Schema`].
///
/// Registration is plain bookkeeping and never fails; configuration
/// problems are reported once, by [`SchemaBuilder::build`].
///
/// ## Example
///
/// ```rust
/// use fieldguard::prelude::*;
///
/// let schema = Schema::builder("Account")
///     .register("age", Rule::is_positive_number(Bounds::at_least(18.0)))
///     .register("email", Rule::not_empty_string())
///     .register("email", Rule::is_email())
///     .build()
///     .unwrap();
///
/// let email_rules = schema.rules_for("email", &ValidationGroup::Default);
/// assert_eq!(email_rules[0].constraint(), "NotEmptyString");
/// assert_eq!(email_rules[1].constraint(), "IsEmail");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldRegistration>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    /// Create a builder for the entity named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a rule on a field.
    ///
    /// The rule is appended under each of its groups, or under the default
    /// group when it has none. Registering several rules on one field stacks
    /// them in call order.
    pub fn register(mut self, field: impl Into<String>, rule: impl Into<Rule>) -> Self {
        let field = field.into();
        let slot = match self.index.get(&field) {
            Some(&slot) => slot,
            None => {
                self.index.insert(field.clone(), self.fields.len());
                self.fields.push(FieldRegistration::new(field));
                self.fields.len() - 1
            }
        };
        self.fields[slot].push(rule.into());
        self
    }

    /// Register several rules on a field, in order.
    pub fn register_all<I, R>(self, field: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        let field = field.into();
        rules
            .into_iter()
            .fold(self, |builder, rule| builder.register(field.clone(), rule))
    }

    /// Verify the configuration and freeze the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        for registration in &self.fields {
            if registration.field.is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    schema: self.name.clone(),
                });
            }
            for rules in registration.rules_by_group.values() {
                for rule in rules {
                    match rule.kind() {
                        Check::Builtin(constraint) => constraint.verify(&registration.field)?,
                        Check::Custom { id, .. } if id.is_empty() => {
                            return Err(SchemaError::EmptyConstraintId {
                                field: registration.field.clone(),
                            })
                        }
                        Check::Custom { .. } => {}
                    }
                }
            }
        }

        tracing::debug!(
            schema = %self.name,
            fields = self.fields.len(),
            "validation schema built"
        );

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            index: self.index,
        })
    }
}

/// The frozen rule registry of one entity type.
///
/// Built once, typically behind a `OnceLock`, and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldRegistration>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// The entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All registered fields, in first-registration order.
    pub fn fields(&self) -> &[FieldRegistration] {
        &self.fields
    }

    /// The registration of one field.
    pub fn field(&self, field: &str) -> Option<&FieldRegistration> {
        self.index.get(field).map(|&slot| &self.fields[slot])
    }

    /// Rules that run when `field` is assigned under `group`.
    pub fn rules_for(&self, field: &str, group: &ValidationGroup) -> &[Arc<Rule>] {
        self.field(field)
            .map(|registration| registration.rules_for(group))
            .unwrap_or(&[])
    }

    /// Fields carrying a `Required` rule under `group`, with that rule.
    pub fn required_fields<'a>(
        &'a self,
        group: &'a ValidationGroup,
    ) -> impl Iterator<Item = (&'a str, &'a Rule)> + 'a {
        self.fields.iter().filter_map(move |registration| {
            registration
                .required_rule(group)
                .map(|rule| (registration.field(), rule))
        })
    }

    /// Run the rules of `field` under `group` against a value, outside of
    /// any construction.
    pub fn check(
        &self,
        field: &str,
        value: &Value,
        group: &ValidationGroup,
    ) -> Vec<ValidationCause> {
        self.rules_for(field, group)
            .iter()
            .filter_map(|rule| rule.evaluate(field, value))
            .collect()
    }
}
