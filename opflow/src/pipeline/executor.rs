//! Traversal of a compiled instruction tree.

use super::{invoke, Instructions, Operation};
use crate::errors::OperationError;
use crate::instruction::{Dependency, DependencyCategory, Instruction, InstructionKind, Next, Options};
use crate::observability::TreeRecord;
use crate::state::{Key, State};
use serde_json::Value;

/// Walks one pipeline type's tree against a shared state.
///
/// Each level runs its instructions in order. Before every instruction the
/// failed flag is checked; once it is set, the failure handlers at or after
/// the current position of that level run and the level stops. Nothing
/// above or below that level is affected by the cascade itself, though the
/// failed flag stays visible to every level that checks it afterwards.
///
/// Required-option gates are level-local too: a gate binds the later steps
/// and failure handlers of its own level until the next gate replaces it.
/// Children of a wrap start with no required options.
pub struct Executor<'a, P: Operation> {
    operation: &'a P,
    instructions: &'a Instructions<P>,
    level: usize,
}

impl<'a, P: Operation> Executor<'a, P> {
    /// Creates an executor for `instructions` run on behalf of `operation`.
    ///
    /// `level` is the nesting depth used for diagnostics.
    #[must_use]
    pub fn new(operation: &'a P, instructions: &'a Instructions<P>, level: usize) -> Self {
        Self {
            operation,
            instructions,
            level,
        }
    }

    /// Runs the tree, then the type's entry point if it has one.
    ///
    /// The entry point receives the params as options; params that are not
    /// an object give it empty options. Soft failures only set the failed
    /// flag on `state`.
    ///
    /// # Errors
    ///
    /// Returns the first structural error raised by a dependency gate,
    /// a container lookup, or a handler. Execution stops at that point.
    pub fn run(self, state: &mut State) -> Result<(), OperationError> {
        tracing::debug!(operation = P::name(), level = self.level, "Pipeline started");

        let roots = self.instructions.as_slice();
        self.iterate(roots, state, self.level)?;

        if let Some(entry) = P::entry() {
            let options = match state.params() {
                Some(Value::Object(params)) => Options::from(params.clone()),
                _ => Options::new(),
            };
            entry.invoke(self.operation, state, &options)?;
        }

        tracing::debug!(
            operation = P::name(),
            level = self.level,
            success = state.is_successful(),
            "Pipeline finished"
        );
        Ok(())
    }

    fn iterate(
        &self,
        instructions: &'a [Instruction<P>],
        state: &mut State,
        level: usize,
    ) -> Result<(), OperationError> {
        let mut required: &'a [Key] = &[];

        for (index, instruction) in instructions.iter().enumerate() {
            if state.is_failed() {
                self.run_failures(&instructions[index..], required, state, level)?;
                break;
            }

            match instruction.kind() {
                InstructionKind::Step => self.run_step(instruction, required, state, level)?,
                InstructionKind::Wrap => self.run_wrap(instruction, state, level)?,
                InstructionKind::Failure => {}
                InstructionKind::Dependency(dependency) => {
                    self.trace(instruction, state, level);
                    if let Some(keys) = Self::check(dependency, state)? {
                        required = keys;
                    }
                }
            }
        }
        Ok(())
    }

    fn run_step(
        &self,
        instruction: &Instruction<P>,
        required: &[Key],
        state: &mut State,
        level: usize,
    ) -> Result<(), OperationError> {
        let options = instruction.options();
        if let Some(key) = required.iter().find(|key| !options.contains(key.as_str())) {
            return Err(OperationError::missing_option(key.as_str(), options.to_string()));
        }

        self.trace(instruction, state, level);

        let result = invoke::step(
            self.operation,
            self.instructions.settings(),
            instruction,
            state,
            level,
        )?;
        if instruction.can_fail(&result) {
            state.fail();
        }
        Ok(())
    }

    fn run_wrap(
        &self,
        instruction: &'a Instruction<P>,
        state: &mut State,
        level: usize,
    ) -> Result<(), OperationError> {
        self.trace(instruction, state, level);

        let operation = self.operation;
        let mut children =
            |state: &mut State| self.iterate(instruction.children(), state, level + 1);
        let mut next = Next::new(&mut children);

        invoke::around(operation, instruction, state, &mut next, level)?;
        Ok(())
    }

    fn run_failures(
        &self,
        remaining: &[Instruction<P>],
        required: &[Key],
        state: &mut State,
        level: usize,
    ) -> Result<(), OperationError> {
        let handlers = remaining.iter().filter(|instruction| instruction.kind().is_failure());
        tracing::debug!(operation = P::name(), level, "Running failure handlers");

        for instruction in handlers {
            self.run_step(instruction, required, state, level)?;
            if instruction.options().fail_fast() {
                break;
            }
        }
        Ok(())
    }

    /// Checks a gate. An options gate yields the keys that replace the
    /// level's required options.
    fn check(
        dependency: &'a Dependency,
        state: &State,
    ) -> Result<Option<&'a [Key]>, OperationError> {
        match dependency.category {
            DependencyCategory::State => {
                for key in &dependency.keys {
                    if !state.contains(key.as_str()) {
                        return Err(OperationError::missing_key(
                            dependency.category,
                            key.as_str(),
                            state.to_string(),
                        ));
                    }
                }
            }
            DependencyCategory::Params => {
                for key in &dependency.keys {
                    let present = state.param(key.as_str()).is_some_and(|value| !value.is_null());
                    if !present {
                        return Err(OperationError::missing_key(
                            dependency.category,
                            key.as_str(),
                            state.to_string(),
                        ));
                    }
                }
            }
            DependencyCategory::Options => return Ok(Some(dependency.keys.as_slice())),
        }
        Ok(None)
    }

    fn trace(&self, instruction: &Instruction<P>, state: &State, level: usize) {
        tracing::trace!(
            operation = P::name(),
            level,
            kind = %instruction.kind(),
            handler = instruction.handler_name(),
            "Executing instruction"
        );

        let settings = self.instructions.settings();
        if settings.debug() {
            settings.logger().log_tree(&TreeRecord {
                message: "Execute".to_string(),
                level,
                kind: instruction.kind().to_string(),
                handler: instruction.handler_name().to_string(),
                options: instruction.options().to_string(),
                state: state.to_string(),
            });
        }
    }
}
