//! Validation groups for profile-scoped rule selection.

use serde::{Deserialize, Serialize};

/// Named validation profile.
///
/// A rule registered without a group lands in [`ValidationGroup::Default`],
/// and an entity activated without a group validates with the default group.
/// Groups only match themselves: a `Create` activation never runs `Update`
/// or `Default` rules, which is how partial profiles are expressed. Names
/// compare exactly, so `"Create"` is a custom group distinct from `create`.
///
/// ## Example
///
/// ```rust
/// use fieldguard::prelude::*;
///
/// let schema = Schema::builder("User")
///     .register("id", Rule::required().group(ValidationGroup::Update))
///     .register("email", Rule::is_email().group(ValidationGroup::Create))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.rules_for("id", &ValidationGroup::Update).len(), 1);
/// assert!(schema.rules_for("id", &ValidationGroup::Create).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationGroup {
    /// Rules for creating new records
    Create,
    /// Rules for updating existing records
    Update,
    /// Custom validation group with a name
    Custom(String),
    /// Reserved group for ungrouped rules and ungrouped activations
    #[default]
    Default,
}

impl ValidationGroup {
    /// Create a custom validation group.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// Check if this is the reserved default group.
    pub fn is_default(&self) -> bool {
        matches!(self, ValidationGroup::Default)
    }

    /// Get the group name as a string.
    pub fn name(&self) -> &str {
        match self {
            ValidationGroup::Create => "create",
            ValidationGroup::Update => "update",
            ValidationGroup::Custom(name) => name,
            ValidationGroup::Default => "default",
        }
    }
}

impl From<&str> for ValidationGroup {
    fn from(s: &str) -> Self {
        match s {
            "create" => ValidationGroup::Create,
            "update" => ValidationGroup::Update,
            "default" | "" => ValidationGroup::Default,
            _ => ValidationGroup::Custom(s.to_string()),
        }
    }
}

impl From<String> for ValidationGroup {
    fn from(s: String) -> Self {
        ValidationGroup::from(s.as_str())
    }
}

impl From<ValidationGroup> for String {
    fn from(group: ValidationGroup) -> Self {
        group.name().to_string()
    }
}

impl std::fmt::Display for ValidationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
