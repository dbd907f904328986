//! The pipeline type trait and its type-erased handle.

use super::executor::Executor;
use super::instructions::{compiled, Instructions};
use super::Declaration;
use crate::errors::{HandlerResult, OperationError};
use crate::instruction::{AroundEntry, Entry, Next, Options};
use crate::state::State;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A pipeline type.
///
/// Implementors declare their instruction tree in [`Operation::declare`];
/// the tree is compiled on first use and shared by every invocation.
/// Types that are single-call handlers rather than trees expose
/// [`Operation::entry`] (and [`Operation::around`] to serve as a wrap).
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct CreateUser;
///
/// impl Operation for CreateUser {
///     fn declare(ops: &mut Declaration<Self>) {
///         ops.depends_on(DependencyCategory::Params, ["name"])
///             .wrap(Handler::around_method("in_transaction", Self::in_transaction), Options::new(), |ops| {
///                 ops.step(Handler::method("build", Self::build), Options::new())
///                     .step(Handler::method("persist", Self::persist), Options::new());
///             })
///             .failure(Handler::method("notify", Self::notify), Options::new());
///     }
/// }
///
/// let state = CreateUser::call(json!({"name": "alice"}))?;
/// assert!(state.is_successful());
/// ```
pub trait Operation: Default + Send + Sync + 'static {
    /// Declares the instruction tree. The default declares nothing.
    fn declare(ops: &mut Declaration<Self>) {
        let _ = ops;
    }

    /// Direct call entry point, if this type is a single-call handler.
    fn entry() -> Option<Entry<Self>> {
        None
    }

    /// Wrap entry point, if this type can bracket other instructions.
    fn around() -> Option<AroundEntry<Self>> {
        None
    }

    /// Name used in diagnostics.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The compiled instruction tree of this type.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while declaring.
    fn instructions() -> Result<Arc<Instructions<Self>>, OperationError> {
        compiled::<Self>()
    }

    /// Runs this type against fresh state holding `params`.
    ///
    /// Soft failures come back as a failed state; only structural errors
    /// are returned as `Err`.
    ///
    /// # Errors
    ///
    /// Propagates declaration, dependency, registry, and handler errors.
    fn call(params: Value) -> Result<State, OperationError> {
        Self::call_with_state(State::with_params(params))
    }

    /// Runs this type against an existing state.
    ///
    /// # Errors
    ///
    /// Same as [`Operation::call`].
    fn call_with_state(mut state: State) -> Result<State, OperationError> {
        let tree = Self::instructions()?;
        let operation = Self::default();
        Executor::new(&operation, &tree, 0).run(&mut state)?;
        Ok(state)
    }

    /// Runs this instance's declared tree under an existing state at `level`.
    ///
    /// This is how a nested type without an entry point is delegated to.
    ///
    /// # Errors
    ///
    /// Same as [`Operation::call`].
    fn run_pipeline(&self, state: &mut State, level: usize) -> Result<(), OperationError> {
        let tree = Self::instructions()?;
        Executor::new(self, &tree, level).run(state)
    }
}

trait ErasedOperation: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_wrap(&self) -> bool;

    fn invoke(&self, state: &mut State, options: &Options, level: usize) -> HandlerResult;

    fn invoke_around(
        &self,
        state: &mut State,
        options: &Options,
        next: &mut Next<'_>,
        level: usize,
    ) -> HandlerResult;
}

struct Erased<Q>(PhantomData<fn() -> Q>);

impl<Q: Operation> ErasedOperation for Erased<Q> {
    fn name(&self) -> &'static str {
        Q::name()
    }

    fn can_wrap(&self) -> bool {
        Q::around().is_some()
    }

    fn invoke(&self, state: &mut State, options: &Options, level: usize) -> HandlerResult {
        let instance = Q::default();
        match Q::entry() {
            Some(entry) => entry.invoke(&instance, state, options),
            None => {
                instance.run_pipeline(state, level)?;
                Ok(Value::Bool(state.is_successful()))
            }
        }
    }

    fn invoke_around(
        &self,
        state: &mut State,
        options: &Options,
        next: &mut Next<'_>,
        _level: usize,
    ) -> HandlerResult {
        let instance = Q::default();
        match Q::around() {
            Some(entry) => entry.invoke(&instance, state, options, next),
            None => Err(OperationError::misconfigured(format!(
                "{} has no around entry and cannot be used as a wrap",
                Q::name()
            ))),
        }
    }
}

/// A type-erased handle to an [`Operation`] type.
///
/// Used for nested pipeline handlers and container entries. Invoking it
/// instantiates the type and shares the caller's state with it.
#[derive(Clone)]
pub struct OperationRef(Arc<dyn ErasedOperation>);

impl OperationRef {
    /// Handle to `Q`.
    #[must_use]
    pub fn of<Q: Operation>() -> Self {
        Self(Arc::new(Erased::<Q>(PhantomData)))
    }

    /// Diagnostic name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Whether the type exposes a wrap entry point.
    #[must_use]
    pub fn can_wrap(&self) -> bool {
        self.0.can_wrap()
    }

    /// Dispatches the type as a step.
    ///
    /// Calls its entry point with `options` per its arity, or runs its
    /// declared tree at `level` when it has none.
    ///
    /// # Errors
    ///
    /// Propagates structural errors from the nested type.
    pub fn invoke(&self, state: &mut State, options: &Options, level: usize) -> HandlerResult {
        self.0.invoke(state, options, level)
    }

    /// Dispatches the type as a wrap.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Misconfigured`] if the type has no wrap
    /// entry point, or propagates its structural errors.
    pub fn invoke_around(
        &self,
        state: &mut State,
        options: &Options,
        next: &mut Next<'_>,
        level: usize,
    ) -> HandlerResult {
        self.0.invoke_around(state, options, next, level)
    }
}

impl fmt::Debug for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OperationRef").field(&self.name()).finish()
    }
}
