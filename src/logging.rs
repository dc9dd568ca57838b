//! Diagnostic logging for the tabtail binary.
//!
//! Logs go to stderr so that stdout carries only rendered lines. `RUST_LOG`
//! wins over the `-v` count when set.

use tracing_subscriber::EnvFilter;

/// Default directive for a given `-v` count.
fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
