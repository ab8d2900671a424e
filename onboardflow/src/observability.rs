//! Tracing setup for host applications.
//!
//! The engine emits structured `tracing` events throughout; hosts that
//! already install their own subscriber can ignore this module entirely.

use tracing_subscriber::EnvFilter;

/// Installs a formatted `tracing` subscriber for the whole process.
///
/// `default_directives` applies when `RUST_LOG` is unset, e.g.
/// `"onboardflow=debug,info"`. Safe to call more than once; later calls
/// are no-ops because a global subscriber is already installed.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("onboardflow=debug");
        // A second call must not panic even though a subscriber exists.
        init_tracing("info");
    }
}
