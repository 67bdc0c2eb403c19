//! Signal handling for matrixd.
//!
//! Termination signals do not act on hardware directly: they clear a run
//! flag that the main loop checks every tick, so the shutdown sequence
//! always executes from the same thread that owns the loop.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    sync::Arc,
    thread,
};

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the daemon should keep running
    pub running: Arc<AtomicBool>,
}

/// Install the termination-signal handler thread.
///
/// SIGTERM, SIGINT, and SIGHUP all request a graceful shutdown by clearing
/// the returned `running` flag.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP])
        .context("failed to register signal handlers")?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let name = match sig {
                    SIGTERM => "SIGTERM",
                    SIGINT => "SIGINT",
                    SIGHUP => "SIGHUP",
                    _ => "signal",
                };
                log_pipe!();
                if debug_enabled {
                    log_info!("Received {} (signal {}), initiating graceful shutdown...", name, sig);
                } else {
                    log_info!("Received {}, initiating graceful shutdown...", name);
                }
                running_clone.store(false, Ordering::SeqCst);
                // Keep draining repeated signals; the main loop exits on the flag.
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState { running })
}
