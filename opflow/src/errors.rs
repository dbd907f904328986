//! Error types for opflow.
//!
//! Soft pipeline failures never show up here: they are recorded on the
//! [`State`](crate::state::State) flag. Everything in this module is a
//! structural or configuration defect and propagates to the caller.

use crate::instruction::DependencyCategory;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Result type returned by every handler invocation.
pub type HandlerResult = Result<Value, OperationError>;

/// The main error type for opflow operations.
#[derive(Debug, Clone, Error)]
pub enum OperationError {
    /// A state or option key is not a valid symbolic key.
    #[error("Invalid key '{key}': state keys must be symbolic identifiers")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// A declaration received an unusable argument.
    #[error("Argument error: {0}")]
    Argument(String),

    /// A dependency gate found a required key missing.
    #[error("Cannot find required {category} key :{key} on {state}")]
    MissingKey {
        /// Which gate raised.
        category: DependencyCategory,
        /// The missing key.
        key: String,
        /// Rendering of the state at the time of the check.
        state: String,
    },

    /// A step was declared without an option required by a standing gate.
    #[error("Cannot find required option :{key} on {options}")]
    MissingOption {
        /// The missing option key.
        key: String,
        /// Rendering of the step's options.
        options: String,
    },

    /// A registry lookup name was used without an attached container.
    #[error("Can't execute container's entry '{entry}'. You have to attach container to operation")]
    NoContainer {
        /// The lookup name.
        entry: String,
    },

    /// A registry lookup name did not resolve.
    #[error("Can't execute container's entry '{entry}'. Not found")]
    UnknownEntry {
        /// The lookup name.
        entry: String,
    },

    /// A handler was declared in a position it cannot serve.
    #[error("Misconfigured handler: {0}")]
    Misconfigured(String),

    /// A handler raised a hard error of its own.
    #[error("Handler error: {0}")]
    Handler(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OperationError {
    /// Creates an invalid key error.
    #[must_use]
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Creates an argument error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Creates a missing key error.
    #[must_use]
    pub fn missing_key(
        category: DependencyCategory,
        key: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self::MissingKey {
            category,
            key: key.into(),
            state: state.into(),
        }
    }

    /// Creates a missing option error.
    #[must_use]
    pub fn missing_option(key: impl Into<String>, options: impl Into<String>) -> Self {
        Self::MissingOption {
            key: key.into(),
            options: options.into(),
        }
    }

    /// Creates a missing container error.
    #[must_use]
    pub fn no_container(entry: impl Into<String>) -> Self {
        Self::NoContainer {
            entry: entry.into(),
        }
    }

    /// Creates an unknown registry entry error.
    #[must_use]
    pub fn unknown_entry(entry: impl Into<String>) -> Self {
        Self::UnknownEntry {
            entry: entry.into(),
        }
    }

    /// Creates a misconfiguration error.
    #[must_use]
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured(message.into())
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Short stable name of the error variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => "InvalidKey",
            Self::Argument(_) => "ArgumentError",
            Self::MissingKey { .. } => "MissingKey",
            Self::MissingOption { .. } => "MissingOption",
            Self::NoContainer { .. } => "NoContainer",
            Self::UnknownEntry { .. } => "UnknownEntry",
            Self::Misconfigured(_) => "Misconfigured",
            Self::Handler(_) => "HandlerError",
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));

        match self {
            Self::InvalidKey { key } | Self::MissingOption { key, .. } => {
                map.insert("key".to_string(), serde_json::json!(key));
            }
            Self::MissingKey { category, key, .. } => {
                map.insert("category".to_string(), serde_json::json!(category.to_string()));
                map.insert("key".to_string(), serde_json::json!(key));
            }
            Self::NoContainer { entry } | Self::UnknownEntry { entry } => {
                map.insert("entry".to_string(), serde_json::json!(entry));
            }
            Self::Argument(_) | Self::Misconfigured(_) | Self::Handler(_) | Self::Serialization(_) => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

impl From<serde_json::Error> for OperationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
