//! A client for the Source RCON protocol, the binary remote-console protocol spoken by
//! Minecraft-family dedicated servers (and the Source engine games it's named for).
//!
//! [`Session`] drives a single authenticated connection: it performs the auth handshake,
//! serializes commands onto the wire, and resolves fragmented multi-packet responses back
//! into a single string using one of three [`FragmentStrategy`] variants. [`RconClient`]
//! wraps a `Session` with host/port/password bookkeeping and optional reconnect-on-failure
//! behavior for callers that don't want to manage the TCP connection themselves.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use rcon::Session;
//!
//! # fn main() -> rcon::Result<()> {
//! let transport = TcpStream::connect("127.0.0.1:25575")?;
//! let session = Session::new(transport)?;
//! session.try_authenticate("password")?;
//! let response = session.send_command("list")?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

mod charset;
mod client;
mod codec;
mod error;
mod fragment;
mod frame;
mod packet;
mod session;
mod transport;

pub use charset::Charset;
pub use client::{RconClient, RconClientConfig, RconClientConfigBuilder, DEFAULT_CONNECT_TIMEOUT};
pub use error::{ProtocolViolation, RconError, Result};
pub use fragment::{FragmentStrategy, DEFAULT_FRAGMENT_TIMEOUT};
pub use packet::{Packet, AUTH, AUTH_RESPONSE, EXEC_COMMAND, RESPONSE_VALUE, SENTINEL_REQUEST_ID};
pub use session::{
    Session, SessionBuilder, DEFAULT_READ_BUFFER_CAPACITY, DEFAULT_TRANSPORT_READ_TIMEOUT,
    MAX_RECOMMENDED_READ_BUFFER_CAPACITY,
};
pub use transport::BlockingTransport;
