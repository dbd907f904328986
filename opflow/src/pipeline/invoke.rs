//! Uniform dispatch of instruction handlers.

use super::{Operation, OperationRef, Settings};
use crate::errors::{HandlerResult, OperationError};
use crate::instruction::{Handler, Instruction, Method, MethodCall, Next};
use crate::state::State;

/// Runs a step or failure handler.
///
/// Nested operations and container entries run one level deeper than
/// `level`.
pub(crate) fn step<P: Operation>(
    operation: &P,
    settings: &Settings,
    instruction: &Instruction<P>,
    state: &mut State,
    level: usize,
) -> HandlerResult {
    let options = instruction.options();
    match instruction.handler() {
        Handler::Function(call) => call(state),
        Handler::Method(Method {
            call: MethodCall::Step(entry),
            ..
        }) => entry.invoke(operation, state, options),
        Handler::Operation(nested) => nested.invoke(state, options, level + 1),
        Handler::Registry(name) => resolve(settings, name, state)?.invoke(state, options, level + 1),
        Handler::Noop | Handler::Around(_) | Handler::Method(_) => {
            Err(misplaced(instruction))
        }
    }
}

/// Runs a wrap handler with `next` as its continuation.
pub(crate) fn around<P: Operation>(
    operation: &P,
    instruction: &Instruction<P>,
    state: &mut State,
    next: &mut Next<'_>,
    level: usize,
) -> HandlerResult {
    let options = instruction.options();
    match instruction.handler() {
        Handler::Around(call) => call(state, next),
        Handler::Method(Method {
            call: MethodCall::Around(entry),
            ..
        }) => entry.invoke(operation, state, options, next),
        Handler::Operation(nested) => nested.invoke_around(state, options, next, level + 1),
        Handler::Noop | Handler::Function(_) | Handler::Registry(_) | Handler::Method(_) => {
            Err(misplaced(instruction))
        }
    }
}

/// Resolves a container name to the operation to dispatch.
pub(crate) fn resolve(
    settings: &Settings,
    name: &str,
    state: &State,
) -> Result<OperationRef, OperationError> {
    let container = settings
        .container()
        .ok_or_else(|| OperationError::no_container(name))?;
    let entry = container
        .resolve(name)
        .ok_or_else(|| OperationError::unknown_entry(name))?;
    Ok(entry.materialize(state))
}

fn misplaced<P>(instruction: &Instruction<P>) -> OperationError {
    OperationError::misconfigured(format!(
        "handler '{}' cannot run as a {}",
        instruction.handler_name(),
        instruction.kind()
    ))
}
