//! State container shared by every handler of one invocation.

mod container;
mod key;

pub use container::{is_truthy, State};
pub use key::{is_symbolic, IntoKey, Key};
