//! Logging initialization
//!
//! Single initialization point for the `tracing` subscriber. Logs go to
//! stderr so stdout stays free for the run summary.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "rollcall=debug,rollcall_core=debug"
    } else {
        "rollcall=info,rollcall_core=info"
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Later calls are no-ops.
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        // A subscriber may already be installed (tests); keep it
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
