//! The connection contract a [`Session`](crate::session::Session) depends on.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// The operations a [`Session`](crate::session::Session) needs from its transport, beyond
/// plain [`Read`]/[`Write`].
///
/// Implemented for [`TcpStream`], the transport RCON actually runs over. Implementing it for
/// other blocking duplex byte streams lets a [`Session`] be driven in tests without a real
/// socket.
pub trait BlockingTransport: Read + Write {
    /// Sets (or clears, with `None`) the timeout applied to subsequent reads.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Closes both halves of the connection. Implementations must tolerate being called on
    /// an already-shut-down connection, so that [`Session::close`](crate::session::Session::close)
    /// stays idempotent.
    fn shutdown(&self) -> io::Result<()>;
}

impl BlockingTransport for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already shut down or never fully connected; shutdown is idempotent from the
            // caller's perspective.
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err),
        }
    }
}
