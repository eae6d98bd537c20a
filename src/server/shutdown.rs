// Graceful shutdown module
// Closes watched connections after the listener has been dropped

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::logger;

/// Signal every watched connection to finish and wait up to `timeout`.
///
/// Idle keep-alive connections close right away; connections with a request
/// in flight close once their response is written.
/// Returns the number of connections still open when the wait ended.
pub async fn drain_connections(
    graceful: GracefulShutdown,
    active: &AtomicUsize,
    timeout: Duration,
) -> usize {
    let open = active.load(Ordering::SeqCst);
    if open > 0 {
        logger::log_shutdown_draining(open, timeout.as_secs());
    }

    match tokio::time::timeout(timeout, graceful.shutdown()).await {
        Ok(()) => 0,
        Err(_) => active.load(Ordering::SeqCst),
    }
}
