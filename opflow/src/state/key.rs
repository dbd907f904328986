//! Symbolic state keys.

use crate::errors::OperationError;
use regex::Regex;
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::LazyLock;

static SYMBOL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*[?!]?$").ok());

/// Returns true if `raw` is spelled like a symbol.
#[must_use]
pub fn is_symbolic(raw: &str) -> bool {
    SYMBOL.as_ref().is_some_and(|re| re.is_match(raw))
}

/// A symbolic key naming one entry of a [`State`](super::State).
///
/// Keys are identifier-like (`model`, `current_user`, `valid?`). Anything
/// else is rejected when the key is built, so a typo such as `"model "`
/// fails loudly instead of silently creating a second entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// The reserved key holding the invocation params.
    pub const PARAMS: Self = Self(Cow::Borrowed("params"));

    /// Parses a key.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidKey`] if `raw` is not symbolic.
    pub fn new(raw: impl Into<Cow<'static, str>>) -> Result<Self, OperationError> {
        let raw = raw.into();
        if is_symbolic(&raw) {
            Ok(Self(raw))
        } else {
            Err(OperationError::invalid_key(raw))
        }
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Conversion into a validated [`Key`].
pub trait IntoKey {
    /// Performs the conversion.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidKey`] for non-symbolic spellings.
    fn into_key(self) -> Result<Key, OperationError>;
}

impl IntoKey for Key {
    fn into_key(self) -> Result<Key, OperationError> {
        Ok(self)
    }
}

impl IntoKey for &Key {
    fn into_key(self) -> Result<Key, OperationError> {
        Ok(self.clone())
    }
}

impl IntoKey for &str {
    fn into_key(self) -> Result<Key, OperationError> {
        Key::new(self.to_owned())
    }
}

impl IntoKey for String {
    fn into_key(self) -> Result<Key, OperationError> {
        Key::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_keys() {
        for raw in ["model", "current_user", "_private", "valid?", "save!", "Model2"] {
            assert!(Key::new(raw).is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn test_non_symbolic_keys() {
        for raw in ["", "model ", "2fast", "a-b", "user.name", "why??"] {
            let err = Key::new(raw).unwrap_err();
            assert_eq!(err.kind(), "InvalidKey", "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_params_key() {
        assert_eq!(Key::PARAMS.as_str(), "params");
        assert_eq!(Key::new("params").unwrap(), Key::PARAMS);
    }

    #[test]
    fn test_into_key() {
        assert!("model".into_key().is_ok());
        assert!(String::from("bad key").into_key().is_err());
        assert_eq!(Key::PARAMS.into_key().unwrap().to_string(), "params");
    }
}
