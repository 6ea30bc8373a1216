//! Message tables and placeholder resolution.
//!
//! A cause message of the form `{token}` is a placeholder. At check time it
//! is looked up in the table passed to the construction, then in the table
//! installed for the entity type. Unknown tokens stay verbatim; messages
//! without braces pass through untouched.

use crate::error::ValidationCause;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Token to message mapping. Entries replace the whole placeholder verbatim.
///
/// ```json
/// {"Required": "value is required", "tooYoung": "must be an adult"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTable {
    entries: HashMap<String, String>,
}

impl MessageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with(mut self, token: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(token, message);
        self
    }

    /// Insert an entry, replacing any previous one.
    pub fn insert(&mut self, token: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(token.into(), message.into());
    }

    /// Look up a token.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parse a table from a JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<K, V> FromIterator<(K, V)> for MessageTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

type TableStore = RwLock<HashMap<TypeId, Arc<MessageTable>>>;

static TABLES: OnceLock<TableStore> = OnceLock::new();

fn tables() -> &'static TableStore {
    TABLES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Install the message table of entity type `T`, replacing the previous one.
///
/// Tables are swapped whole; a resolution already in flight keeps the table
/// it started with.
pub fn install<T: 'static>(table: MessageTable) {
    tables()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<T>(), Arc::new(table));
}

/// Remove the message table of entity type `T`.
pub fn uninstall<T: 'static>() {
    tables()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&TypeId::of::<T>());
}

/// The message table currently installed for `T`.
pub fn installed<T: 'static>() -> Option<Arc<MessageTable>> {
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<T>())
        .cloned()
}

/// Extract `token` from a `{token}` placeholder.
pub fn placeholder_token(message: &str) -> Option<&str> {
    message
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Resolves placeholder messages against an explicit table and a type table.
#[derive(Debug, Clone, Default)]
pub struct MessageResolver<'a> {
    explicit: Option<&'a MessageTable>,
    installed: Option<Arc<MessageTable>>,
}

impl<'a> MessageResolver<'a> {
    /// Create a resolver with the given tables, highest priority first.
    pub fn new(explicit: Option<&'a MessageTable>, installed: Option<Arc<MessageTable>>) -> Self {
        Self {
            explicit,
            installed,
        }
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        self.explicit
            .and_then(|table| table.get(token))
            .or_else(|| self.installed.as_deref().and_then(|table| table.get(token)))
    }

    /// Resolve one cause's message.
    pub fn resolve_message(&self, cause: &ValidationCause) -> String {
        let Some(token) = placeholder_token(&cause.message) else {
            return cause.message.clone();
        };
        self.lookup(token)
            .map_or_else(|| cause.message.clone(), str::to_string)
    }

    /// Resolve every cause's message in place.
    pub fn resolve_all(&self, causes: &mut [ValidationCause]) {
        for cause in causes {
            cause.message = self.resolve_message(cause);
        }
    }
}
