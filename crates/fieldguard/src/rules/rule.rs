//! Registered rules: a constraint plus its message and groups.

use super::constraint::{Bounds, Constraint};
use crate::error::ValidationCause;
use crate::group::ValidationGroup;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Type alias for custom predicate functions.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What a rule checks.
#[derive(Clone)]
pub enum Check {
    /// One of the built-in constraints
    Builtin(Constraint),
    /// A caller-supplied predicate under its own constraint id
    Custom { id: String, predicate: Predicate },
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Builtin(constraint) => f.debug_tuple("Builtin").field(constraint).finish(),
            Check::Custom { id, .. } => f.debug_struct("Custom").field("id", id).finish(),
        }
    }
}

/// A constraint rule as registered on a field.
///
/// Rules are immutable once registered in a schema. Without an explicit
/// message a failure reports the `{ConstraintId}` placeholder, which the
/// message resolver can later map to text.
///
/// ## Example
///
/// ```rust
/// use fieldguard::prelude::*;
///
/// let rule = Rule::is_positive_number(Bounds::at_least(18.0))
///     .message("{tooYoung}")
///     .group("create");
///
/// assert_eq!(rule.constraint(), "IsPositiveNumber");
/// assert!(!rule.check(&serde_json::json!(15)));
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    check: Check,
    message: Option<String>,
    groups: Vec<ValidationGroup>,
}

impl Rule {
    /// Create a rule from a built-in constraint.
    pub fn new(constraint: Constraint) -> Self {
        Self {
            check: Check::Builtin(constraint),
            message: None,
            groups: Vec::new(),
        }
    }

    /// Create a rule from a custom predicate.
    ///
    /// The predicate must not panic on any input; a panic is treated as a
    /// defect and aborts the construction in progress.
    pub fn custom<F>(id: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Check::Custom {
                id: id.into(),
                predicate: Arc::new(predicate),
            },
            message: None,
            groups: Vec::new(),
        }
    }

    /// Not null and not an empty array.
    pub fn not_empty() -> Self {
        Self::new(Constraint::NotEmpty)
    }

    /// JSON boolean.
    pub fn is_boolean() -> Self {
        Self::new(Constraint::IsBoolean)
    }

    /// JSON number within `bounds`.
    pub fn is_number(bounds: Bounds) -> Self {
        Self::new(Constraint::IsNumber(bounds))
    }

    /// Number greater than zero within `bounds`.
    pub fn is_positive_number(bounds: Bounds) -> Self {
        Self::new(Constraint::IsPositiveNumber(bounds))
    }

    /// Number greater than or equal to zero within `bounds`.
    pub fn is_positive_or_zero_number(bounds: Bounds) -> Self {
        Self::new(Constraint::IsPositiveOrZeroNumber(bounds))
    }

    /// JSON string.
    pub fn is_string() -> Self {
        Self::new(Constraint::IsString)
    }

    /// String with non-whitespace content.
    pub fn not_empty_string() -> Self {
        Self::new(Constraint::NotEmptyString)
    }

    /// JSON array.
    pub fn is_array() -> Self {
        Self::new(Constraint::IsArray)
    }

    /// Email address.
    pub fn is_email() -> Self {
        Self::new(Constraint::IsEmail)
    }

    /// Phone number with 10 to 14 digits.
    pub fn is_phone() -> Self {
        Self::new(Constraint::phone())
    }

    /// Phone number with `minlen..=maxlen` digits.
    pub fn is_phone_len(minlen: usize, maxlen: usize) -> Self {
        Self::new(Constraint::IsPhone { minlen, maxlen })
    }

    /// One of `candidates`.
    pub fn is_member_of<I, V>(candidates: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(Constraint::IsMemberOf {
            candidates: candidates.into_iter().map(Into::into).collect(),
        })
    }

    /// Present and not null. Also checked for fields never assigned.
    pub fn required() -> Self {
        Self::new(Constraint::Required)
    }

    /// Set a custom message. Empty messages are ignored.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
        self
    }

    /// Add a group this rule is registered under.
    pub fn group(mut self, group: impl Into<ValidationGroup>) -> Self {
        let group = group.into();
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self
    }

    /// Add several groups.
    pub fn groups<I, G>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<ValidationGroup>,
    {
        groups
            .into_iter()
            .fold(self, |rule, group| rule.group(group))
    }

    /// The constraint id recorded on causes.
    pub fn constraint(&self) -> &str {
        match &self.check {
            Check::Builtin(constraint) => constraint.id(),
            Check::Custom { id, .. } => id.as_str(),
        }
    }

    /// The check this rule performs.
    pub fn kind(&self) -> &Check {
        &self.check
    }

    /// Whether this is the `Required` rule.
    pub fn is_required(&self) -> bool {
        matches!(self.check, Check::Builtin(Constraint::Required))
    }

    /// Groups this rule was registered under; empty means the default group.
    pub fn registered_groups(&self) -> &[ValidationGroup] {
        &self.groups
    }

    /// Groups this rule applies to, with the default group filled in.
    pub fn effective_groups(&self) -> Vec<ValidationGroup> {
        if self.groups.is_empty() {
            vec![ValidationGroup::Default]
        } else {
            self.groups.clone()
        }
    }

    /// The message recorded on failure before resolution.
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("{{{}}}", self.constraint()))
    }

    /// Run the predicate on a value.
    pub fn check(&self, value: &Value) -> bool {
        match &self.check {
            Check::Builtin(constraint) => constraint.check(value),
            Check::Custom { predicate, .. } => predicate(value),
        }
    }

    /// Evaluate the rule for an assignment to `property`.
    ///
    /// Null values skip every rule except `Required`, so optional fields may
    /// be left empty without tripping type checks.
    pub fn evaluate(&self, property: &str, value: &Value) -> Option<ValidationCause> {
        if value.is_null() && !self.is_required() {
            return None;
        }
        if self.check(value) {
            return None;
        }
        Some(ValidationCause::new(
            self.constraint(),
            self.failure_message(),
            property,
            value.clone(),
        ))
    }

    /// Evaluate the rule for a NaN or infinite float assigned to `property`.
    ///
    /// Custom predicates see such a value as `null`; causes record it as
    /// `null` too.
    pub fn evaluate_float(&self, property: &str, n: f64) -> Option<ValidationCause> {
        let passed = match &self.check {
            Check::Builtin(constraint) => constraint.check_float(n),
            Check::Custom { predicate, .. } => predicate(&Value::Null),
        };
        if passed {
            return None;
        }
        Some(ValidationCause::new(
            self.constraint(),
            self.failure_message(),
            property,
            Value::Null,
        ))
    }

    /// Serializable form of this rule; `None` for custom predicates.
    pub fn spec(&self) -> Option<RuleSpec> {
        match &self.check {
            Check::Builtin(constraint) => Some(RuleSpec {
                constraint: constraint.clone(),
                message: self.message.clone(),
                groups: self.groups.clone(),
            }),
            Check::Custom { .. } => None,
        }
    }
}

impl From<Constraint> for Rule {
    fn from(constraint: Constraint) -> Self {
        Rule::new(constraint)
    }
}

/// Serializable rule definition for configuration files.
///
/// ```json
/// {"type": "is_number", "min": 18, "message": "{tooYoung}", "groups": ["create"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(flatten)]
    pub constraint: Constraint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ValidationGroup>,
}

impl RuleSpec {
    /// Pretty print the rule as a derive attribute.
    pub fn pretty_print(&self) -> String {
        let mut parts = vec![self.constraint.attribute()];
        if let Some(msg) = &self.message {
            parts.push(format!("message = \"{}\"", msg));
        }
        for group in &self.groups {
            parts.push(format!("group = \"{}\"", group));
        }
        format!("#[validate({})]", parts.join(", "))
    }
}

impl From<RuleSpec> for Rule {
    fn from(spec: RuleSpec) -> Self {
        let rule = Rule::new(spec.constraint).groups(spec.groups);
        match spec.message {
            Some(message) => rule.message(message),
            None => rule,
        }
    }
}
