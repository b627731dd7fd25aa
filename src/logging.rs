//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter, e.g. `HANDAGE_LOG=handedness_age=debug`.
pub const LOG_ENV: &str = "HANDAGE_LOG";

/// Initialize the `tracing` subscriber.
///
/// Logs go to stderr so stdout stays reserved for the report. `HANDAGE_LOG`
/// wins when set and valid; otherwise `verbose` picks between `debug` and
/// `warn` for this crate.
///
/// Calling this more than once is a no-op.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose {
            "handedness_age=debug"
        } else {
            "handedness_age=warn"
        };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
