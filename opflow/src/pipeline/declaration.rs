//! Declaration-time builder for instruction trees.

use super::instructions::Instructions;
use super::Settings;
use crate::container::Container;
use crate::errors::OperationError;
use crate::instruction::{
    Dependency, DependencyCategory, Handler, Instruction, InstructionKind, Options,
};
use crate::observability::TreeLogger;
use crate::state::IntoKey;
use std::sync::Arc;

/// Collects the declarations of one pipeline type into a tree.
///
/// Handed to [`Operation::declare`](super::Operation::declare). Wraps
/// push themselves onto an open-scope stack while their body runs, so
/// anything declared inside the body becomes a child of the innermost
/// open wrap.
///
/// Declaration errors do not interrupt the chain: the first one is kept
/// and reported when the tree is compiled.
pub struct Declaration<P> {
    roots: Vec<Instruction<P>>,
    open: Vec<Instruction<P>>,
    settings: Settings,
    error: Option<OperationError>,
}

impl<P> Declaration<P> {
    pub(crate) fn new() -> Self {
        Self {
            roots: Vec::new(),
            open: Vec::new(),
            settings: Settings::default(),
            error: None,
        }
    }

    /// Attaches the container used to resolve name-based handlers.
    pub fn container(&mut self, container: Arc<dyn Container>) -> &mut Self {
        self.settings = self.settings.clone().with_container(container);
        self
    }

    /// Turns tree tracing on or off for this type.
    pub fn debug(&mut self, debug: bool) -> &mut Self {
        self.settings = self.settings.clone().with_debug(debug);
        self
    }

    /// Replaces the tree logger for this type.
    pub fn logger(&mut self, logger: Arc<dyn TreeLogger>) -> &mut Self {
        self.settings = self.settings.clone().with_logger(logger);
        self
    }

    /// Declares a dependency gate.
    ///
    /// An empty key list or a non-symbolic key is recorded as an error.
    pub fn depends_on<I>(&mut self, category: DependencyCategory, keys: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: IntoKey,
    {
        let keys = match keys
            .into_iter()
            .map(IntoKey::into_key)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(keys) => keys,
            Err(err) => {
                self.record(err);
                return self;
            }
        };

        if keys.is_empty() {
            self.record(OperationError::argument(format!(
                "{category} dependency keys cannot be empty"
            )));
            return self;
        }

        self.attach(Instruction::dependency(Dependency::new(category, keys)));
        self
    }

    /// Declares a step.
    pub fn step(&mut self, handler: Handler<P>, options: Options) -> &mut Self {
        self.leaf(InstructionKind::Step, handler, options)
    }

    /// Declares a failure handler.
    pub fn failure(&mut self, handler: Handler<P>, options: Options) -> &mut Self {
        self.leaf(InstructionKind::Failure, handler, options)
    }

    /// Declares a wrap whose children are declared by `body`.
    pub fn wrap<F>(&mut self, handler: Handler<P>, options: Options, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        if !handler.can_wrap() {
            self.record(OperationError::misconfigured(format!(
                "handler '{}' cannot be used as a wrap",
                handler.name()
            )));
        }

        self.open
            .push(Instruction::new(InstructionKind::Wrap, handler, options));
        body(self);

        if let Some(wrap) = self.open.pop() {
            self.attach(wrap);
        }
        self
    }

    /// Number of wraps currently open.
    #[must_use]
    pub fn open_scopes(&self) -> usize {
        self.open.len()
    }

    /// Number of top-level instructions declared so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true if nothing has been declared at the top level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn finish(self) -> Result<Instructions<P>, OperationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Instructions::new(self.roots, self.settings))
    }

    fn leaf(&mut self, kind: InstructionKind, handler: Handler<P>, options: Options) -> &mut Self {
        if !handler.can_step() {
            self.record(OperationError::misconfigured(format!(
                "handler '{}' cannot be used as a {kind}",
                handler.name()
            )));
        }
        self.attach(Instruction::new(kind, handler, options));
        self
    }

    fn attach(&mut self, instruction: Instruction<P>) {
        match self.open.last_mut() {
            Some(parent) => parent.push_child(instruction),
            None => self.roots.push(instruction),
        }
    }

    fn record(&mut self, err: OperationError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerResult;
    use crate::instruction::Next;
    use crate::state::State;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Owner;

    impl Owner {
        fn step1(&self, _state: &mut State) -> HandlerResult {
            Ok(json!(true))
        }

        fn in_transaction(&self, state: &mut State, next: &mut Next<'_>) -> HandlerResult {
            Ok(json!(next.run(state)?))
        }
    }

    fn step() -> Handler<Owner> {
        Handler::method("step1", Owner::step1)
    }

    fn wrap() -> Handler<Owner> {
        Handler::around_method("in_transaction", Owner::in_transaction)
    }

    #[test]
    fn test_nested_wraps_build_a_tree() {
        let mut ops = Declaration::<Owner>::new();
        ops.wrap(wrap(), Options::new(), |ops| {
            ops.step(step(), Options::new());
            assert_eq!(ops.open_scopes(), 1);

            ops.wrap(wrap(), Options::new().with("lock", "none"), |ops| {
                assert_eq!(ops.open_scopes(), 2);
                ops.step(step(), Options::new().with("key", "value"));
            });
        });
        ops.step(step(), Options::new());

        assert_eq!(ops.open_scopes(), 0);
        let tree = ops.finish().unwrap();
        let roots = tree.as_slice();

        assert_eq!(roots.len(), 2);
        assert!(roots[0].kind().is_wrap());
        assert_eq!(roots[0].handler_name(), "in_transaction");
        assert_eq!(roots[0].children().len(), 2);
        assert!(roots[1].kind().is_step());

        let inner = &roots[0].children()[1];
        assert!(inner.kind().is_wrap());
        assert_eq!(inner.options().get("lock"), Some(&json!("none")));
        assert_eq!(inner.children().len(), 1);
        assert_eq!(inner.children()[0].handler_name(), "step1");
        assert!(inner.children()[0].children().is_empty());
    }

    #[test]
    fn test_empty_dependency_is_an_argument_error() {
        let mut ops = Declaration::<Owner>::new();
        ops.depends_on(DependencyCategory::State, Vec::<&str>::new());

        let err = ops.finish().unwrap_err();
        assert_eq!(err.kind(), "ArgumentError");
    }

    #[test]
    fn test_invalid_dependency_key() {
        let mut ops = Declaration::<Owner>::new();
        ops.depends_on(DependencyCategory::Params, ["current user"]);

        assert_eq!(ops.finish().unwrap_err().kind(), "InvalidKey");
    }

    #[test]
    fn test_dependency_attaches_to_open_scope() {
        let mut ops = Declaration::<Owner>::new();
        ops.wrap(wrap(), Options::new(), |ops| {
            ops.depends_on(DependencyCategory::Options, ["id"]);
        });

        let tree = ops.finish().unwrap();
        let gate = tree.as_slice()[0].children()[0].as_dependency().unwrap();
        assert_eq!(gate.category, DependencyCategory::Options);
        assert_eq!(gate.keys[0].as_str(), "id");
    }

    #[test]
    fn test_handler_position_checks() {
        let mut ops = Declaration::<Owner>::new();
        ops.wrap(step(), Options::new(), |_| {});
        assert_eq!(ops.finish().unwrap_err().kind(), "Misconfigured");

        let mut ops = Declaration::<Owner>::new();
        ops.step(wrap(), Options::new());
        assert_eq!(ops.finish().unwrap_err().kind(), "Misconfigured");
    }

    #[test]
    fn test_first_error_wins() {
        let mut ops = Declaration::<Owner>::new();
        ops.depends_on(DependencyCategory::State, Vec::<&str>::new())
            .step(wrap(), Options::new());

        assert_eq!(ops.finish().unwrap_err().kind(), "ArgumentError");
    }

    #[test]
    fn test_settings_are_carried() {
        let mut ops = Declaration::<Owner>::new();
        ops.debug(true).step("operations.tracker".into(), Options::new());

        let tree = ops.finish().unwrap();
        assert!(tree.settings().debug());
        assert_eq!(tree.as_slice()[0].handler_name(), "operations.tracker");
    }
}
