//! Tree-shaped trace output for executed instructions.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

/// One traced instruction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// What happened.
    pub message: String,
    /// Nesting depth; root instructions are level 0.
    pub level: usize,
    /// Instruction kind (`step`, `wrap`, `failure`, `depend`).
    pub kind: String,
    /// Handler identity.
    pub handler: String,
    /// Rendered instruction options.
    pub options: String,
    /// Rendered state at the time of the trace.
    pub state: String,
}

impl TreeRecord {
    /// Renders the record as one indented line.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{}-> {} type={} handler={} options={} state={}",
            "  ".repeat(self.level),
            self.message,
            self.kind,
            self.handler,
            self.options,
            self.state
        )
    }
}

/// Receives one record per executed instruction when debugging is on.
///
/// Implementations are observers only: nothing they do may influence
/// execution.
pub trait TreeLogger: Send + Sync {
    /// Records one instruction execution.
    fn log_tree(&self, record: &TreeRecord);
}

/// A tree logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTreeLogger;

impl TreeLogger for NoOpTreeLogger {
    fn log_tree(&self, _record: &TreeRecord) {}
}

/// A tree logger writing rendered lines through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingTreeLogger {
    level: Level,
}

impl Default for TracingTreeLogger {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingTreeLogger {
    /// Creates a tree logger emitting at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level tree logger.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl TreeLogger for TracingTreeLogger {
    fn log_tree(&self, record: &TreeRecord) {
        if self.level == Level::DEBUG {
            debug!(level = record.level, kind = %record.kind, "{}", record.render());
        } else {
            info!(level = record.level, kind = %record.kind, "{}", record.render());
        }
    }
}

/// A tree logger that keeps every record, for tests.
#[derive(Debug, Default)]
pub struct CollectingTreeLogger {
    records: RwLock<Vec<TreeRecord>>,
}

impl CollectingTreeLogger {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far.
    #[must_use]
    pub fn records(&self) -> Vec<TreeRecord> {
        self.records.read().clone()
    }

    /// All records rendered as lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.records.read().iter().map(TreeRecord::render).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Forgets all records.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl TreeLogger for CollectingTreeLogger {
    fn log_tree(&self, record: &TreeRecord) {
        self.records.write().push(record.clone());
    }
}
