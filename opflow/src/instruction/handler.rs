//! Handler representations and the wrap continuation.

use super::Options;
use crate::errors::{HandlerResult, OperationError};
use crate::pipeline::{Operation, OperationRef};
use crate::state::State;
use std::fmt;
use std::sync::Arc;

/// An inline step handler.
pub type StepFn = Arc<dyn Fn(&mut State) -> HandlerResult + Send + Sync>;

/// An inline wrap handler.
pub type AroundFn = Arc<dyn Fn(&mut State, &mut Next<'_>) -> HandlerResult + Send + Sync>;

/// The continuation handed to wrap handlers: "run my children now".
///
/// A wrap handler may run it zero or more times. Every run shares the
/// caller's state, so mutations made by the children are visible to the
/// wrap handler afterwards.
pub struct Next<'a> {
    children: &'a mut dyn FnMut(&mut State) -> Result<(), OperationError>,
    calls: usize,
}

impl<'a> Next<'a> {
    /// Creates a continuation around `children`.
    pub fn new(children: &'a mut dyn FnMut(&mut State) -> Result<(), OperationError>) -> Self {
        Self { children, calls: 0 }
    }

    /// Runs the children and returns whether the state is still successful.
    ///
    /// # Errors
    ///
    /// Propagates structural errors raised by any child.
    pub fn run(&mut self, state: &mut State) -> Result<bool, OperationError> {
        self.calls += 1;
        (self.children)(state)?;
        Ok(state.is_successful())
    }

    /// How many times the children have been run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("calls", &self.calls).finish()
    }
}

/// A step-style callable on a pipeline type, tagged with its arity.
pub enum Entry<P> {
    /// Called with the state only.
    Bare(fn(&P, &mut State) -> HandlerResult),
    /// Called with the state and the instruction's options.
    WithOptions(fn(&P, &mut State, &Options) -> HandlerResult),
}

impl<P> Entry<P> {
    /// Invokes the callable, passing options only when it declares them.
    ///
    /// # Errors
    ///
    /// Propagates the handler's structural error.
    pub fn invoke(&self, target: &P, state: &mut State, options: &Options) -> HandlerResult {
        match self {
            Self::Bare(call) => call(target, state),
            Self::WithOptions(call) => call(target, state, options),
        }
    }
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Entry<P> {}

/// A wrap-style callable on a pipeline type, tagged with its arity.
pub enum AroundEntry<P> {
    /// Called with the state and the continuation.
    Bare(fn(&P, &mut State, &mut Next<'_>) -> HandlerResult),
    /// Called with the state, the instruction's options, and the continuation.
    WithOptions(fn(&P, &mut State, &Options, &mut Next<'_>) -> HandlerResult),
}

impl<P> AroundEntry<P> {
    /// Invokes the callable, passing options only when it declares them.
    ///
    /// # Errors
    ///
    /// Propagates the handler's structural error.
    pub fn invoke(
        &self,
        target: &P,
        state: &mut State,
        options: &Options,
        next: &mut Next<'_>,
    ) -> HandlerResult {
        match self {
            Self::Bare(call) => call(target, state, next),
            Self::WithOptions(call) => call(target, state, options, next),
        }
    }
}

impl<P> Clone for AroundEntry<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for AroundEntry<P> {}

/// The callable behind a named method.
pub enum MethodCall<P> {
    /// Usable as a step or failure handler.
    Step(Entry<P>),
    /// Usable as a wrap handler.
    Around(AroundEntry<P>),
}

impl<P> Clone for MethodCall<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for MethodCall<P> {}

/// A method of the owning pipeline type, named for diagnostics.
pub struct Method<P> {
    /// The method name.
    pub name: &'static str,
    /// The callable.
    pub call: MethodCall<P>,
}

impl<P> Clone for Method<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Method<P> {}

/// How an instruction's work is resolved at dispatch time.
pub enum Handler<P> {
    /// No handler (dependency gates).
    Noop,
    /// An inline step closure.
    Function(StepFn),
    /// An inline wrap closure.
    Around(AroundFn),
    /// A method on the owning pipeline instance.
    Method(Method<P>),
    /// A nested pipeline type sharing the caller's state.
    Operation(OperationRef),
    /// A name resolved through the type's container.
    Registry(String),
}

impl<P> Handler<P> {
    /// Wraps an inline step closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&mut State) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Wraps an inline wrap closure.
    pub fn around<F>(f: F) -> Self
    where
        F: Fn(&mut State, &mut Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Around(Arc::new(f))
    }

    /// A method taking no options.
    #[must_use]
    pub fn method(name: &'static str, call: fn(&P, &mut State) -> HandlerResult) -> Self {
        Self::Method(Method {
            name,
            call: MethodCall::Step(Entry::Bare(call)),
        })
    }

    /// A method receiving the instruction's options.
    #[must_use]
    pub fn method_with_options(
        name: &'static str,
        call: fn(&P, &mut State, &Options) -> HandlerResult,
    ) -> Self {
        Self::Method(Method {
            name,
            call: MethodCall::Step(Entry::WithOptions(call)),
        })
    }

    /// A wrap method taking no options.
    #[must_use]
    pub fn around_method(
        name: &'static str,
        call: fn(&P, &mut State, &mut Next<'_>) -> HandlerResult,
    ) -> Self {
        Self::Method(Method {
            name,
            call: MethodCall::Around(AroundEntry::Bare(call)),
        })
    }

    /// A wrap method receiving the instruction's options.
    #[must_use]
    pub fn around_method_with_options(
        name: &'static str,
        call: fn(&P, &mut State, &Options, &mut Next<'_>) -> HandlerResult,
    ) -> Self {
        Self::Method(Method {
            name,
            call: MethodCall::Around(AroundEntry::WithOptions(call)),
        })
    }

    /// A nested pipeline type.
    #[must_use]
    pub fn operation<Q: Operation>() -> Self {
        Self::Operation(OperationRef::of::<Q>())
    }

    /// A container lookup name.
    #[must_use]
    pub fn registry(name: impl Into<String>) -> Self {
        Self::Registry(name.into())
    }

    /// Identity used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Noop => "none",
            Self::Function(_) => "function",
            Self::Around(_) => "around",
            Self::Method(method) => method.name,
            Self::Operation(operation) => operation.name(),
            Self::Registry(name) => name,
        }
    }

    /// Whether this handler can sit in a step or failure position.
    #[must_use]
    pub fn can_step(&self) -> bool {
        match self {
            Self::Function(_) | Self::Operation(_) | Self::Registry(_) => true,
            Self::Method(method) => matches!(method.call, MethodCall::Step(_)),
            Self::Noop | Self::Around(_) => false,
        }
    }

    /// Whether this handler can sit in a wrap position.
    #[must_use]
    pub fn can_wrap(&self) -> bool {
        match self {
            Self::Around(_) => true,
            Self::Operation(operation) => operation.can_wrap(),
            Self::Method(method) => matches!(method.call, MethodCall::Around(_)),
            Self::Noop | Self::Function(_) | Self::Registry(_) => false,
        }
    }
}

impl<P> Clone for Handler<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Noop => Self::Noop,
            Self::Function(f) => Self::Function(Arc::clone(f)),
            Self::Around(f) => Self::Around(Arc::clone(f)),
            Self::Method(method) => Self::Method(*method),
            Self::Operation(operation) => Self::Operation(operation.clone()),
            Self::Registry(name) => Self::Registry(name.clone()),
        }
    }
}

impl<P> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Noop => "Noop",
            Self::Function(_) => "Function",
            Self::Around(_) => "Around",
            Self::Method(_) => "Method",
            Self::Operation(_) => "Operation",
            Self::Registry(_) => "Registry",
        };
        write!(f, "{variant}({})", self.name())
    }
}

impl<P> From<&str> for Handler<P> {
    fn from(name: &str) -> Self {
        Self::Registry(name.to_string())
    }
}

impl<P> From<String> for Handler<P> {
    fn from(name: String) -> Self {
        Self::Registry(name)
    }
}

impl<P> From<OperationRef> for Handler<P> {
    fn from(operation: OperationRef) -> Self {
        Self::Operation(operation)
    }
}
