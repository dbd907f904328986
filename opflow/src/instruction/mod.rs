//! Instructions: the nodes of a compiled pipeline tree.
//!
//! An [`Instruction`] is one declared unit of work. Only wraps carry
//! children. Trees are built once per pipeline type and never mutated
//! afterwards.

mod handler;
mod kind;
mod options;

pub use handler::{AroundEntry, AroundFn, Entry, Handler, Method, MethodCall, Next, StepFn};
pub use kind::{Dependency, DependencyCategory, InstructionKind};
pub use options::Options;

use crate::state::is_truthy;
use serde_json::Value;
use std::fmt;

/// One node of an instruction tree.
pub struct Instruction<P> {
    kind: InstructionKind,
    handler: Handler<P>,
    options: Options,
    children: Vec<Instruction<P>>,
}

impl<P> Instruction<P> {
    /// Creates a childless instruction.
    #[must_use]
    pub fn new(kind: InstructionKind, handler: Handler<P>, options: Options) -> Self {
        Self {
            kind,
            handler,
            options,
            children: Vec::new(),
        }
    }

    /// Creates a dependency gate.
    #[must_use]
    pub fn dependency(dependency: Dependency) -> Self {
        Self::new(
            InstructionKind::Dependency(dependency),
            Handler::Noop,
            Options::new(),
        )
    }

    /// Appends a child. Only the tree builder calls this, and only on wraps.
    pub(crate) fn push_child(&mut self, child: Self) {
        debug_assert!(self.kind.is_wrap(), "only wraps carry children");
        self.children.push(child);
    }

    /// The instruction kind.
    #[must_use]
    pub fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    /// The handler.
    #[must_use]
    pub fn handler(&self) -> &Handler<P> {
        &self.handler
    }

    /// The frozen options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Child instructions, in declaration order. Empty unless a wrap.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The gate, for dependency instructions.
    #[must_use]
    pub fn as_dependency(&self) -> Option<&Dependency> {
        match &self.kind {
            InstructionKind::Dependency(dependency) => Some(dependency),
            _ => None,
        }
    }

    /// Diagnostic identity of the handler.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }

    /// Whether `result` should mark the state failed.
    ///
    /// Failure handlers never fail and truthy results never fail; anything
    /// else fails unless the instruction was declared with `fail: false`.
    #[must_use]
    pub fn can_fail(&self, result: &Value) -> bool {
        if self.kind.is_failure() || is_truthy(result) {
            return false;
        }
        self.options.fail()
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}

impl<P> Clone for Instruction<P> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            handler: self.handler.clone(),
            options: self.options.clone(),
            children: self.children.clone(),
        }
    }
}

impl<P> fmt::Debug for Instruction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("kind", &self.kind)
            .field("handler", &self.handler)
            .field("options", &self.options)
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerResult;
    use crate::state::{Key, State};
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Owner;

    fn step(options: Options) -> Instruction<Owner> {
        Instruction::new(
            InstructionKind::Step,
            Handler::function(|_state: &mut State| -> HandlerResult { Ok(json!(true)) }),
            options,
        )
    }

    #[test]
    fn test_can_fail_defaults() {
        let instruction = step(Options::new());

        assert!(instruction.can_fail(&Value::Null));
        assert!(instruction.can_fail(&json!(false)));
        assert!(!instruction.can_fail(&json!(true)));
        assert!(!instruction.can_fail(&json!({"id": 1})));
    }

    #[test]
    fn test_can_fail_disabled() {
        let instruction = step(Options::new().with("fail", false));
        assert!(!instruction.can_fail(&json!(false)));
    }

    #[test]
    fn test_failure_handlers_never_fail() {
        let instruction: Instruction<Owner> = Instruction::new(
            InstructionKind::Failure,
            Handler::registry("notify"),
            Options::new(),
        );
        assert!(!instruction.can_fail(&Value::Null));
    }

    #[test]
    fn test_wrap_children_and_depth() {
        let mut inner: Instruction<Owner> = Instruction::new(
            InstructionKind::Wrap,
            Handler::around(|state, next| Ok(json!(next.run(state)?))),
            Options::new().with("lock", "none"),
        );
        inner.push_child(step(Options::new()));

        let mut outer: Instruction<Owner> = Instruction::new(
            InstructionKind::Wrap,
            Handler::around(|state, next| Ok(json!(next.run(state)?))),
            Options::new(),
        );
        outer.push_child(step(Options::new()));
        outer.push_child(inner);

        assert_eq!(outer.children().len(), 2);
        assert_eq!(outer.children()[1].options().get("lock"), Some(&json!("none")));
        assert_eq!(outer.depth(), 3);
        assert!(outer.children()[0].children().is_empty());
    }

    #[test]
    fn test_dependency_instruction() {
        let gate = Dependency::new(DependencyCategory::State, vec![Key::new("model").unwrap()]);
        let instruction: Instruction<Owner> = Instruction::dependency(gate.clone());

        assert_eq!(instruction.as_dependency(), Some(&gate));
        assert_eq!(instruction.handler_name(), "none");
        assert_eq!(instruction.kind().to_string(), "depend");
    }
}
