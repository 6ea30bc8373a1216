//! Construction-time activation: run the build, check, then seal or raise.

use crate::construction::Construction;
use crate::error::{AggregateValidationError, Error, ValidationCause};
use crate::group::ValidationGroup;
use crate::message::{MessageResolver, MessageTable};
use crate::registry::Schema;
use crate::rules::Constraint;
use crate::validate::Validated;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// What happens when a finished construction has causes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fail the construction with an [`AggregateValidationError`]
    #[default]
    Throwing,
    /// Return the instance and expose the causes through [`Sealed`]
    Reporting,
}

/// Activation options of an entity type.
///
/// Deserializes from `{"group": "update", "throwable": false}` as well as
/// `{"group": "update", "mode": "reporting"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ActivationConfig")]
pub struct Activation {
    /// Group whose rules run during construction
    pub group: ValidationGroup,
    /// Throwing or reporting
    pub mode: Mode,
}

#[derive(Deserialize)]
struct ActivationConfig {
    #[serde(default)]
    group: ValidationGroup,
    #[serde(default)]
    mode: Option<Mode>,
    #[serde(default)]
    throwable: Option<bool>,
}

impl From<ActivationConfig> for Activation {
    fn from(config: ActivationConfig) -> Self {
        let mode = match (config.mode, config.throwable) {
            (Some(mode), _) => mode,
            (None, Some(false)) => Mode::Reporting,
            (None, _) => Mode::Throwing,
        };
        Self {
            group: config.group,
            mode,
        }
    }
}

impl Activation {
    /// Default group, throwing mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate with `group`.
    pub fn group(mut self, group: impl Into<ValidationGroup>) -> Self {
        self.group = group.into();
        self
    }

    /// Fail construction on any cause.
    pub fn throwing(mut self) -> Self {
        self.mode = Mode::Throwing;
        self
    }

    /// Keep the instance and report causes.
    pub fn reporting(mut self) -> Self {
        self.mode = Mode::Reporting;
        self
    }

    /// `true` for throwing mode, `false` for reporting mode.
    pub fn throwable(self, throwable: bool) -> Self {
        if throwable {
            self.throwing()
        } else {
            self.reporting()
        }
    }
}

/// Lifecycle of one construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The build closure is assigning fields
    Constructing,
    /// Required fields are re-checked and messages resolved
    Checking,
    /// Construction succeeded
    Sealed,
    /// Construction failed with an aggregate error
    Raised,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Constructing => "constructing",
            Phase::Checking => "checking",
            Phase::Sealed => "sealed",
            Phase::Raised => "raised",
        };
        f.write_str(name)
    }
}

/// A successfully constructed instance.
///
/// In reporting mode it carries the causes recorded during construction;
/// otherwise [`Sealed::query_validation_errors`] returns `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sealed<T> {
    value: T,
    causes: Option<Vec<ValidationCause>>,
}

impl<T> Sealed<T> {
    fn new(value: T, causes: Option<Vec<ValidationCause>>) -> Self {
        Self { value, causes }
    }

    /// Causes recorded for a reporting-mode entity; `None` when valid.
    pub fn query_validation_errors(&self) -> Option<&[ValidationCause]> {
        self.causes.as_deref()
    }

    /// Whether no cause was recorded.
    pub fn is_valid(&self) -> bool {
        self.causes.is_none()
    }

    /// Unwrap the instance, dropping any reported causes.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Split into the instance and its reported causes.
    pub fn into_parts(self) -> (T, Option<Vec<ValidationCause>>) {
        (self.value, self.causes)
    }
}

impl<T> Deref for Sealed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

fn no_installed_table() -> Option<Arc<MessageTable>> {
    None
}

/// Drives one construction through its phases.
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
/// let result = Activator::new(&schema, Activation::new()).run(|ctx| ctx.set("age", 15));
/// let error = result.unwrap_err().into_invalid().unwrap();
/// assert_eq!(error.causes[0].constraint, "IsPositiveNumber");
///
/// let sealed = Activator::new(&schema, Activation::new().reporting())
///     .run(|ctx| ctx.set("age", 15))
///     .unwrap();
/// assert_eq!(*sealed, 15);
/// assert_eq!(sealed.query_validation_errors().unwrap().len(), 1);
/// ```
pub struct Activator<'a> {
    schema: &'a Schema,
    activation: Activation,
    messages: Option<&'a MessageTable>,
    installed: fn() -> Option<Arc<MessageTable>>,
}

impl Activator<'static> {
    /// Create an activator for an entity type, using its schema, activation
    /// options and installed message table.
    pub fn for_type<T: Validated>() -> Self {
        Self {
            schema: T::schema(),
            activation: T::activation(),
            messages: None,
            installed: T::messages,
        }
    }
}

impl<'a> Activator<'a> {
    /// Create an activator for a schema with no installed message table.
    pub fn new(schema: &'a Schema, activation: Activation) -> Self {
        Self {
            schema,
            activation,
            messages: None,
            installed: no_installed_table,
        }
    }

    /// Resolve messages against `table` before the installed table.
    pub fn messages(mut self, table: &'a MessageTable) -> Self {
        self.messages = Some(table);
        self
    }

    /// The activation options in effect.
    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Start the `Constructing` phase.
    pub fn begin(&self) -> Construction<'a> {
        tracing::trace!(schema = %self.schema.name(), phase = %Phase::Constructing);
        Construction::new(self.schema, self.activation.group.clone())
    }

    /// Run `build` and finalize its result.
    ///
    /// An `Err` from `build` is a defect and is returned without checking.
    pub fn run<T, F>(self, build: F) -> Result<Sealed<T>, Error>
    where
        F: FnOnce(&mut Construction<'a>) -> Result<T, Error>,
    {
        let mut ctx = self.begin();
        let value = build(&mut ctx)?;
        self.finalize(ctx, value)
    }

    /// Like [`Activator::run`], but fails with an `IsPresented` cause when
    /// there is no input entity at all.
    pub fn run_present<I, T, F>(self, entity: Option<I>, build: F) -> Result<Sealed<T>, Error>
    where
        F: FnOnce(I, &mut Construction<'a>) -> Result<T, Error>,
    {
        let Some(entity) = entity else {
            let mut causes = vec![ValidationCause::new(
                Constraint::IS_PRESENTED,
                format!("{{{}}}", Constraint::IS_PRESENTED),
                self.schema.name(),
                Value::Null,
            )];
            self.resolver().resolve_all(&mut causes);
            tracing::debug!(schema = %self.schema.name(), phase = %Phase::Raised, "input entity absent");
            return Err(AggregateValidationError::new(causes).into());
        };
        self.run(|ctx| build(entity, ctx))
    }

    fn resolver(&self) -> MessageResolver<'a> {
        MessageResolver::new(self.messages, (self.installed)())
    }

    /// Run the `Checking` phase on a finished construction and seal or raise.
    pub fn finalize<T>(&self, ctx: Construction<'_>, value: T) -> Result<Sealed<T>, Error> {
        tracing::trace!(schema = %self.schema.name(), phase = %Phase::Checking);
        let mut causes = ctx.into_checked_causes();

        if causes.is_empty() {
            tracing::debug!(
                schema = %self.schema.name(),
                group = %self.activation.group,
                phase = %Phase::Sealed,
                "construction valid"
            );
            return Ok(Sealed::new(value, None));
        }

        self.resolver().resolve_all(&mut causes);

        let phase = match self.activation.mode {
            Mode::Throwing => Phase::Raised,
            Mode::Reporting => Phase::Sealed,
        };
        tracing::debug!(
            schema = %self.schema.name(),
            group = %self.activation.group,
            mode = ?self.activation.mode,
            causes = causes.len(),
            phase = %phase,
            "construction has validation causes"
        );

        match self.activation.mode {
            Mode::Throwing => Err(AggregateValidationError::new(causes).into()),
            Mode::Reporting => Ok(Sealed::new(value, Some(causes))),
        }
    }
}

impl fmt::Debug for Activator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("schema", &self.schema.name())
            .field("activation", &self.activation)
            .field("has_messages", &self.messages.is_some())
            .finish()
    }
}
