//! Testing utilities for opflow pipelines.
//!
//! This module provides:
//! - A call log kept inside the state, so recordings never leak between
//!   concurrently running tests
//! - Recording step and wrap handlers
//! - Assertions over finished states

mod assertions;
mod recorder;

pub use assertions::{
    assert_calls, assert_state_failed, assert_state_missing, assert_state_succeeded,
    assert_state_value,
};
pub use recorder::{recording_step, recording_wrap, CallLog};
