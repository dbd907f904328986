//! In-memory handler registry.

use super::{Container, ContainerEntry};
use crate::pipeline::{Operation, OperationRef};
use crate::state::State;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Thread-safe name → operation registry.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: RwLock<HashMap<String, ContainerEntry>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation type under `name`, replacing any previous entry.
    pub fn register<Q: Operation>(&self, name: impl Into<String>) {
        self.register_entry(name, ContainerEntry::Operation(OperationRef::of::<Q>()));
    }

    /// Registers a factory choosing the operation from the state.
    pub fn register_factory<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&State) -> OperationRef + Send + Sync + 'static,
    {
        self.register_entry(name, ContainerEntry::Factory(Arc::new(factory)));
    }

    /// Registers a prepared entry.
    pub fn register_entry(&self, name: impl Into<String>, entry: ContainerEntry) {
        self.entries.write().insert(name.into(), entry);
    }

    /// Checks if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Container for HandlerRegistry {
    fn resolve(&self, name: &str) -> Option<ContainerEntry> {
        self.entries.read().get(name).cloned()
    }
}
