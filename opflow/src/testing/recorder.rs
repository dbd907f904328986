//! Recording handlers for pipeline tests.

use crate::errors::OperationError;
use crate::instruction::Handler;
use crate::state::State;
use serde_json::Value;

/// Ordered log of handler invocations, stored in the state under
/// [`CallLog::KEY`].
///
/// Nested pipelines share the caller's state, so their calls land in the
/// same log.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallLog;

impl CallLog {
    /// State key holding the log.
    pub const KEY: &'static str = "calls";

    /// Appends `name` to the log.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Misconfigured`] if the state already holds
    /// something other than a list under [`CallLog::KEY`].
    pub fn record(state: &mut State, name: &str) -> Result<(), OperationError> {
        let mut calls = match state.get(Self::KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(calls)) => calls.clone(),
            Some(other) => {
                return Err(OperationError::misconfigured(format!(
                    "'{}' holds {other}, not a call log",
                    Self::KEY
                )))
            }
        };
        calls.push(Value::String(name.to_string()));
        state.set(Self::KEY, calls)?;
        Ok(())
    }

    /// The recorded names, in call order.
    #[must_use]
    pub fn calls(state: &State) -> Vec<String> {
        state
            .get(Self::KEY)
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| call.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A step that records `name` and returns `result`.
pub fn recording_step<P>(name: &'static str, result: Value) -> Handler<P> {
    Handler::function(move |state| {
        CallLog::record(state, name)?;
        Ok(result.clone())
    })
}

/// A wrap that records `"{name}:enter"`, runs its children if
/// `run_children` is set, and records `"{name}:exit"`.
pub fn recording_wrap<P>(name: &'static str, run_children: bool) -> Handler<P> {
    Handler::around(move |state, next| {
        CallLog::record(state, &format!("{name}:enter"))?;
        if run_children {
            next.run(state)?;
        }
        CallLog::record(state, &format!("{name}:exit"))?;
        Ok(Value::Bool(true))
    })
}
