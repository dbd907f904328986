//! Observability utilities.

mod tree_logger;

pub use tree_logger::{
    CollectingTreeLogger, NoOpTreeLogger, TracingTreeLogger, TreeLogger, TreeRecord,
};

use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins over `default_filter`. Returns false if a global
/// subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing("warn");
        assert!(!init_tracing("warn"));
    }
}
