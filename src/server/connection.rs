// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state (holds the active connection counter)
/// * `graceful` - Shutdown watcher the connection is registered with
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    graceful: &GracefulShutdown,
) {
    let conn_counter = &state.active_connections;

    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), graceful);
}

/// Serve a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 connection settings (keep-alive)
/// 3. Registers the connection with the shutdown watcher, so idle
///    keep-alive connections are closed once shutdown starts
/// 4. Applies timeout to the connection
/// 5. Decrements connection counter when done
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);
    let perf = &state.config.performance;

    let timeout_duration =
        std::time::Duration::from_secs(std::cmp::max(perf.read_timeout, perf.write_timeout));

    // Build HTTP/1 connection with keep-alive support
    let mut builder = http1::Builder::new();
    builder.keep_alive(perf.keep_alive_timeout > 0);

    let service_state = Arc::clone(&state);
    let conn = graceful.watch(builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, peer_addr, Arc::clone(&service_state))),
    ));

    tokio::spawn(async move {
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}
