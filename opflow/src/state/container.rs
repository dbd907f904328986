//! The mutable state threaded through one invocation.

use super::key::{IntoKey, Key};
use crate::errors::OperationError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Returns true unless the value is `null` or `false`.
///
/// This is the verdict the executor applies to step results.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Shared state for one pipeline invocation.
///
/// Handlers read and write entries by symbolic [`Key`]. The `failed` flag
/// only ever moves from `false` to `true`.
#[derive(Debug, Clone, Default)]
pub struct State {
    data: HashMap<Key, Value>,
    failed: bool,
}

impl State {
    /// Creates an empty, successful state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `params` under [`Key::PARAMS`].
    #[must_use]
    pub fn with_params(params: Value) -> Self {
        let mut data = HashMap::new();
        data.insert(Key::PARAMS, params);
        Self {
            data,
            failed: false,
        }
    }

    /// Gets an entry. Non-symbolic keys are never present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns true if the entry exists and is not `null`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// Sets an entry, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidKey`] before touching the data if
    /// `key` is not symbolic.
    pub fn set(
        &mut self,
        key: impl IntoKey,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, OperationError> {
        let key = key.into_key()?;
        Ok(self.data.insert(key, value.into()))
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// The invocation params, if any.
    #[must_use]
    pub fn params(&self) -> Option<&Value> {
        self.get(Key::PARAMS.as_str())
    }

    /// Looks up one field of an object-shaped params entry.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params().and_then(|p| p.get(name))
    }

    /// Marks the state failed. Calling it again has no further effect.
    pub fn fail(&mut self) {
        self.failed = true;
    }

    /// True once any step has failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// True while no step has failed.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        !self.failed
    }

    /// Alias for [`State::is_successful`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.is_successful()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the state holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&Key> {
        let mut keys: Vec<&Key> = self.data.keys().collect();
        keys.sort();
        keys
    }

    /// Snapshot of the entries as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .data
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
