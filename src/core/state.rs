//! Shutdown state for watch mode.
//!
//! `SHUTDOWN` records that Ctrl+C was received. Once watch mode registers a
//! sender, the handler also notifies the actor system so it can stop
//! gracefully instead of exiting the process.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Sender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a receiver has been registered:
/// - Before `register_shutdown()`: exit immediately, nothing to tear down
/// - After `register_shutdown()`: notify the actor system
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            crate::log!("watch"; "shutting down...");
            let _ = tx.send(());
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the actor system for graceful shutdown.
///
/// Returns `false` if a sender was already registered.
pub fn register_shutdown(shutdown_tx: Sender<()>) -> bool {
    SHUTDOWN_TX.set(shutdown_tx).is_ok()
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
