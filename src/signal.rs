//! Signal handling for live mode.
//!
//! Flag-based, using `signal-hook::flag`: the first SIGINT/SIGTERM asks the
//! live loop to stop and print its summary, a second one exits immediately
//! with code 1.

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Set up signal handlers for graceful shutdown.
///
/// Returns a flag that becomes `true` when a termination signal arrives. The
/// live loop polls it between events.
pub fn setup_shutdown_handlers() -> Result<Arc<AtomicBool>, std::io::Error> {
    let term_now = Arc::new(AtomicBool::new(false));

    for sig in TERM_SIGNALS {
        // Exits with code 1 only once term_now is already set
        flag::register_conditional_shutdown(*sig, 1, Arc::clone(&term_now))?;
        flag::register(*sig, Arc::clone(&term_now))?;
    }

    Ok(term_now)
}
