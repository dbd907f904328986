//! Per-type configuration attached at declaration time.

use crate::container::Container;
use crate::observability::{TracingTreeLogger, TreeLogger};
use std::fmt;
use std::sync::Arc;

/// Configuration a pipeline type carries alongside its tree.
///
/// Set once while declaring and read implicitly by every invocation.
#[derive(Clone)]
pub struct Settings {
    container: Option<Arc<dyn Container>>,
    debug: bool,
    logger: Arc<dyn TreeLogger>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            container: None,
            debug: false,
            logger: Arc::new(TracingTreeLogger::default()),
        }
    }
}

impl Settings {
    /// Creates default settings: no container, debug off, tracing logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a container for name-based handlers.
    #[must_use]
    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Turns tree tracing on or off.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replaces the tree logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn TreeLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The attached container, if any.
    #[must_use]
    pub fn container(&self) -> Option<&Arc<dyn Container>> {
        self.container.as_ref()
    }

    /// Whether tree tracing is on.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// The tree logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn TreeLogger> {
        &self.logger
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("container", &self.container.is_some())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HandlerRegistry;
    use crate::observability::CollectingTreeLogger;

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert!(settings.container().is_none());
        assert!(!settings.debug());
    }

    #[test]
    fn test_builders() {
        let logger = Arc::new(CollectingTreeLogger::new());
        let settings = Settings::new()
            .with_container(Arc::new(HandlerRegistry::new()))
            .with_debug(true)
            .with_logger(logger);

        assert!(settings.container().is_some());
        assert!(settings.debug());
        assert!(format!("{settings:?}").contains("debug: true"));
    }
}
