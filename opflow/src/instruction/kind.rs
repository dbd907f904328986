//! Instruction kinds and dependency gates.

use crate::state::Key;
use std::fmt;

/// The category a dependency gate checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyCategory {
    /// Keys that must be present on the state.
    State,
    /// Keys that must be present in the `params` entry of the state.
    Params,
    /// Option keys every following step must be declared with.
    Options,
}

impl fmt::Display for DependencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::Params => write!(f, "params"),
            Self::Options => write!(f, "options"),
        }
    }
}

/// A declared precondition, consumed by the executor when reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// What the keys are checked against.
    pub category: DependencyCategory,
    /// The required keys. Never empty.
    pub keys: Vec<Key>,
}

impl Dependency {
    /// Creates a dependency gate.
    #[must_use]
    pub fn new(category: DependencyCategory, keys: Vec<Key>) -> Self {
        Self { category, keys }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.keys.iter().map(Key::as_str).collect();
        write!(f, "{}=[{}]", self.category, keys.join(", "))
    }
}

/// What an instruction does when the executor reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// A leaf unit of work.
    Step,
    /// A scope bracketing its children.
    Wrap,
    /// A handler that only runs once the state has failed.
    Failure,
    /// A gate checked at traversal time.
    Dependency(Dependency),
}

impl InstructionKind {
    /// Returns true for steps.
    #[must_use]
    pub fn is_step(&self) -> bool {
        matches!(self, Self::Step)
    }

    /// Returns true for wraps.
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        matches!(self, Self::Wrap)
    }

    /// Returns true for failure handlers.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Returns true for dependency gates.
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Wrap => write!(f, "wrap"),
            Self::Failure => write!(f, "failure"),
            Self::Dependency(_) => write!(f, "depend"),
        }
    }
}
