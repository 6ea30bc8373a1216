//! The `Validated` trait: construction-time validation for entity types.

use crate::activation::{Activation, Activator, Sealed};
use crate::construction::Construction;
use crate::error::Error;
use crate::message::{self, MessageTable};
use crate::registry::Schema;
use std::sync::Arc;

/// An entity type whose construction is validated against a [`Schema`].
///
/// Usually implemented by `#[derive(Validated)]`. A hand-written impl only
/// needs [`Validated::schema`]; override [`Validated::activation`] to pick a
/// group or reporting mode.
///
/// ## Example
///
/// ```rust
/// use fieldguard::prelude::*;
/// use std::sync::OnceLock;
///
/// struct Person {
///     age: u32,
/// }
///
/// impl Validated for Person {
///     fn schema() -> &'static Schema {
///         static SCHEMA: OnceLock<Schema> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::builder("Person")
///                 .register("age", Rule::is_positive_number(Bounds::at_least(18.0)))
///                 .build()
///                 .expect("valid schema")
///         })
///     }
/// }
///
/// let adult = Person::activate(|ctx| Ok(Person { age: ctx.set("age", 21)? })).unwrap();
/// assert_eq!(adult.age, 21);
///
/// let child = Person::activate(|ctx| Ok(Person { age: ctx.set("age", 15)? }));
/// assert!(child.is_err());
/// ```
pub trait Validated: Sized + 'static {
    /// The rule registry of this type.
    fn schema() -> &'static Schema;

    /// Activation options: group and mode.
    fn activation() -> Activation {
        Activation::default()
    }

    /// An activator for this type.
    fn activator() -> Activator<'static> {
        Activator::for_type::<Self>()
    }

    /// Construct through `build`, validating every field assignment.
    fn activate<F>(build: F) -> Result<Sealed<Self>, Error>
    where
        F: FnOnce(&mut Construction<'_>) -> Result<Self, Error>,
    {
        Self::activator().run(build)
    }

    /// Like [`Validated::activate`], resolving messages against `messages`
    /// before the installed table.
    fn activate_with_messages<F>(messages: &MessageTable, build: F) -> Result<Sealed<Self>, Error>
    where
        F: FnOnce(&mut Construction<'_>) -> Result<Self, Error>,
    {
        Self::activator().messages(messages).run(build)
    }

    /// Construct from an optional input entity; `None` fails with
    /// `IsPresented` regardless of mode.
    fn activate_present<I, F>(entity: Option<I>, build: F) -> Result<Sealed<Self>, Error>
    where
        F: FnOnce(I, &mut Construction<'_>) -> Result<Self, Error>,
    {
        Self::activator().run_present(entity, build)
    }

    /// Install the message table used to resolve this type's placeholders.
    ///
    /// Replaces any previous table as a whole.
    fn set_messages(messages: MessageTable) {
        message::install::<Self>(messages);
    }

    /// Remove the installed message table.
    fn clear_messages() {
        message::uninstall::<Self>();
    }

    /// The message table installed for this type, if any.
    ///
    /// Types that reuse another schema fall back to that type's table.
    fn messages() -> Option<Arc<MessageTable>> {
        message::installed::<Self>()
    }
}
