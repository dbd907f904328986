//! Pipeline declaration and execution.
//!
//! This module provides:
//! - The [`Operation`] trait implemented by pipeline types
//! - The declaration builder producing instruction trees
//! - The compile-once tree cache
//! - The executor and its failure cascade

mod declaration;
mod executor;
mod instructions;
mod invoke;
mod operation;
mod settings;


pub use declaration::Declaration;
pub use executor::Executor;
pub use instructions::Instructions;
pub use operation::{Operation, OperationRef};
pub use settings::Settings;
