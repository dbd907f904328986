//! Container lookup for handlers declared by name.
//!
//! A pipeline type that declares `step("operations.tracker", ..)` needs a
//! [`Container`] attached at declaration time; the name is resolved when
//! the step runs.

mod registry;

pub use registry::HandlerRegistry;

use crate::pipeline::OperationRef;
use crate::state::State;
use std::fmt;
use std::sync::Arc;

/// Factory computing the operation to dispatch from the current state.
pub type OperationFactory = Arc<dyn Fn(&State) -> OperationRef + Send + Sync>;

/// What a container name resolves to.
#[derive(Clone)]
pub enum ContainerEntry {
    /// An operation type, dispatched directly.
    Operation(OperationRef),
    /// A factory invoked with the state to pick the operation type.
    Factory(OperationFactory),
}

impl ContainerEntry {
    /// Resolves the entry to an operation for `state`.
    #[must_use]
    pub fn materialize(&self, state: &State) -> OperationRef {
        match self {
            Self::Operation(operation) => operation.clone(),
            Self::Factory(factory) => factory(state),
        }
    }
}

impl fmt::Debug for ContainerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(operation) => write!(f, "Operation({})", operation.name()),
            Self::Factory(_) => write!(f, "Factory"),
        }
    }
}

/// External registry consulted for handlers declared by name.
pub trait Container: Send + Sync {
    /// Looks up `name`.
    fn resolve(&self, name: &str) -> Option<ContainerEntry>;
}
