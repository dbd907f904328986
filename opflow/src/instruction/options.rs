//! Frozen per-instruction options.

use crate::errors::OperationError;
use crate::state::is_truthy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Options attached to an instruction at declaration time.
///
/// The executor reads `fail` and `fail_fast`; every other key is passed
/// through untouched to handlers that take options. Options are frozen
/// once the declaring scope closes and are shared by clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(Arc<Map<String, Value>>);

impl Options {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    /// Builds options from a JSON value. `null` gives empty options.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Argument`] for anything but an object or
    /// `null`.
    pub fn from_value(value: &Value) -> Result<Self, OperationError> {
        match value {
            Value::Object(map) => Ok(Self(Arc::new(map.clone()))),
            Value::Null => Ok(Self::default()),
            other => Err(OperationError::argument(format!(
                "options must be an object, got {other}"
            ))),
        }
    }

    /// Gets an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if the entry exists and is not `null`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// Reads an entry as a flag: missing → `default`, else its truthiness.
    #[must_use]
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, is_truthy)
    }

    /// Whether a falsy result marks the state failed. Defaults to true.
    #[must_use]
    pub fn fail(&self) -> bool {
        self.flag("fail", true)
    }

    /// Whether the failure cascade stops after this handler. Defaults to false.
    #[must_use]
    pub fn fail_fast(&self) -> bool {
        self.flag("fail_fast", false)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the options as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.as_ref().clone())
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(Arc::new(map))
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.as_ref().clone()))
    }
}

impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}
