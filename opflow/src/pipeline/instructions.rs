//! Compiled instruction trees and the per-type compile cache.

use super::{Declaration, Operation, Settings};
use crate::errors::OperationError;
use crate::instruction::Instruction;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// The compiled, immutable instruction tree of one pipeline type.
pub struct Instructions<P> {
    roots: Vec<Instruction<P>>,
    settings: Settings,
}

impl<P> Instructions<P> {
    pub(crate) fn new(roots: Vec<Instruction<P>>, settings: Settings) -> Self {
        Self { roots, settings }
    }

    /// Top-level instructions, in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[Instruction<P>] {
        &self.roots
    }

    /// Iterates over the top-level instructions.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction<P>> {
        self.roots.iter()
    }

    /// Number of top-level instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Deepest nesting of the tree; 0 when empty.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.roots.iter().map(Instruction::depth).max().unwrap_or(0)
    }

    /// The settings declared with the tree.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl<'a, P> IntoIterator for &'a Instructions<P> {
    type Item = &'a Instruction<P>;
    type IntoIter = std::slice::Iter<'a, Instruction<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P> fmt::Debug for Instructions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instructions")
            .field("roots", &self.roots)
            .field("settings", &self.settings)
            .finish()
    }
}

type CompiledTree = Arc<dyn Any + Send + Sync>;

/// Compiled trees keyed by pipeline type.
static COMPILED: LazyLock<DashMap<TypeId, CompiledTree>> = LazyLock::new(DashMap::new);

/// Returns the compiled tree of `P`, declaring it on first use.
///
/// If two threads race on the first use, both declare but only the first
/// inserted tree is kept and returned to both.
pub(crate) fn compiled<P: Operation>() -> Result<Arc<Instructions<P>>, OperationError> {
    let id = TypeId::of::<P>();

    let cached = COMPILED.get(&id).map(|entry| Arc::clone(entry.value()));
    if let Some(tree) = cached {
        return downcast(tree);
    }

    let mut declaration = Declaration::new();
    P::declare(&mut declaration);
    let tree: CompiledTree = Arc::new(declaration.finish()?);

    tracing::debug!(operation = P::name(), "Compiled instruction tree");

    let stored = Arc::clone(COMPILED.entry(id).or_insert(tree).value());
    downcast(stored)
}

fn downcast<P: Operation>(tree: CompiledTree) -> Result<Arc<Instructions<P>>, OperationError> {
    tree.downcast::<Instructions<P>>().map_err(|_| {
        OperationError::misconfigured(format!("compiled tree for {} has the wrong type", P::name()))
    })
}
