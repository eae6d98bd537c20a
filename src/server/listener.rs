// Listener module
// Creates TCP listeners with SO_REUSEADDR / SO_REUSEPORT set

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Pending connection queue length
const BACKLOG: i32 = 1024;

/// Create a `TcpListener` with `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix) enabled.
///
/// Lets a restarted process bind immediately while old sockets sit in
/// `TIME_WAIT`, and lets several processes share one port.
pub fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Tokio requires non-blocking sockets
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
