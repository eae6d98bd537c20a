// Server loop module
// Accepts connections until shutdown is requested, then drains

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use crate::config;
use crate::logger;

/// Run the accept loop on `listener` until `state.shutdown` is notified.
///
/// After shutdown the listener is closed first, idle connections are closed,
/// and in-flight requests get `performance.shutdown_timeout` seconds to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(listener: TcpListener, state: Arc<config::AppState>) {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state, &graceful),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = state.shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on open connections
    drop(listener);

    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    let remaining = drain_connections(graceful, &state.active_connections, timeout).await;
    logger::log_shutdown_complete(remaining);
}
