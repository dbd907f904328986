//! # Opflow
//!
//! A declarative pipeline executor.
//!
//! Pipeline types declare a tree of instructions once and run it against a
//! shared, mutable [`State`](state::State) on every call:
//!
//! - **Steps**: units of work whose falsy result marks the state failed
//! - **Wraps**: scoping handlers that decide if and when their children run
//! - **Failure handlers**: run at the level where a failure was noticed
//! - **Dependency gates**: structural checks on state, params, and options
//! - **Nested pipelines**: other pipeline types run against the same state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opflow::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct CreateUser;
//!
//! impl CreateUser {
//!     fn build(&self, state: &mut State) -> HandlerResult {
//!         let name = state.param("name").cloned().unwrap_or_default();
//!         state.set("user", json!({ "name": name }))?;
//!         Ok(json!(true))
//!     }
//! }
//!
//! impl Operation for CreateUser {
//!     fn declare(ops: &mut Declaration<Self>) {
//!         ops.depends_on(DependencyCategory::Params, ["name"])
//!             .step(Handler::method("build", Self::build), Options::new());
//!     }
//! }
//!
//! let state = CreateUser::call(json!({ "name": "alice" }))?;
//! assert!(state.is_successful());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod container;
pub mod errors;
pub mod instruction;
pub mod observability;
pub mod pipeline;
pub mod state;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::container::{Container, ContainerEntry, HandlerRegistry};
    pub use crate::errors::{HandlerResult, OperationError};
    pub use crate::instruction::{
        AroundEntry, DependencyCategory, Entry, Handler, Instruction, InstructionKind, Next,
        Options,
    };
    pub use crate::observability::{
        CollectingTreeLogger, NoOpTreeLogger, TracingTreeLogger, TreeLogger, TreeRecord,
    };
    pub use crate::pipeline::{Declaration, Operation, OperationRef, Settings};
    pub use crate::state::{Key, State};
}
