// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start the shutdown signal listener (Unix)
///
/// Spawns a background task that waits for SIGTERM or SIGINT and then
/// notifies `shutdown` once.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger::log_shutdown_requested(name);
        // notify_one stores a permit if the accept loop is not waiting yet
        shutdown.notify_one();
    });

    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_shutdown_requested("Ctrl+C");
                shutdown.notify_one();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });

    Ok(())
}
