//! A convenience wrapper that owns connection details and reconnects transparently.
//!
//! [`Session`] itself owns exactly one transport for its lifetime and never reconnects; this
//! module is the layer above it that does, owning a connection factory and lazily
//! (re)establishing a connection around a non-reconnecting inner protocol driver.

use std::net::TcpStream;
use std::time::Duration;

use getset::Getters;

use crate::charset::Charset;
use crate::error::{RconError, Result};
use crate::fragment::FragmentStrategy;
use crate::session::{Session, SessionBuilder};

/// Connection settings for an [`RconClient`], following the same builder shape as
/// [`SessionBuilder`].
#[derive(Clone, Getters)]
#[getset(get = "pub")]
pub struct RconClientConfig {
    host: String,
    port: u16,
    #[getset(skip)]
    password: String,
    charset: Charset,
    fragment_strategy: FragmentStrategy,
    fragment_timeout: Duration,
    transport_read_timeout: Duration,
    connect_timeout: Duration,
    /// Whether a single failed operation should trigger one reconnect-and-retry attempt
    /// before the error is surfaced to the caller.
    reconnect_on_failure: bool,
}

impl std::fmt::Debug for RconClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("charset", &self.charset)
            .field("fragment_strategy", &self.fragment_strategy)
            .field("fragment_timeout", &self.fragment_timeout)
            .field("transport_read_timeout", &self.transport_read_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("reconnect_on_failure", &self.reconnect_on_failure)
            .finish()
    }
}

/// Builder for an [`RconClientConfig`].
#[derive(Debug, Clone)]
pub struct RconClientConfigBuilder {
    host: String,
    port: u16,
    password: String,
    charset: Charset,
    fragment_strategy: FragmentStrategy,
    fragment_timeout: Duration,
    transport_read_timeout: Duration,
    connect_timeout: Duration,
    reconnect_on_failure: bool,
}

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

impl RconClientConfigBuilder {
    /// Starts a config builder for `host:port`, authenticating with `password` once
    /// connected. Every other setting defaults to the same value [`SessionBuilder`] does.
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            charset: Charset::default(),
            fragment_strategy: FragmentStrategy::default(),
            fragment_timeout: crate::fragment::DEFAULT_FRAGMENT_TIMEOUT,
            transport_read_timeout: crate::session::DEFAULT_TRANSPORT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reconnect_on_failure: true,
        }
    }

    /// Sets the payload charset passed through to every [`Session`] this client opens.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the fragment-resolution strategy passed through to every [`Session`].
    pub fn fragment_strategy(mut self, strategy: FragmentStrategy) -> Self {
        self.fragment_strategy = strategy;
        self
    }

    /// Sets the fragment inactivity timeout passed through to every [`Session`].
    pub fn fragment_timeout(mut self, timeout: Duration) -> Self {
        self.fragment_timeout = timeout;
        self
    }

    /// Sets the transport read timeout passed through to every [`Session`].
    pub fn transport_read_timeout(mut self, timeout: Duration) -> Self {
        self.transport_read_timeout = timeout;
        self
    }

    /// Sets the timeout applied to the initial TCP handshake.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables the single reconnect-and-retry attempt on failure. Enabled by
    /// default.
    pub fn reconnect_on_failure(mut self, reconnect: bool) -> Self {
        self.reconnect_on_failure = reconnect;
        self
    }

    /// Finalizes the configuration.
    pub fn build(self) -> RconClientConfig {
        RconClientConfig {
            host: self.host,
            port: self.port,
            password: self.password,
            charset: self.charset,
            fragment_strategy: self.fragment_strategy,
            fragment_timeout: self.fragment_timeout,
            transport_read_timeout: self.transport_read_timeout,
            connect_timeout: self.connect_timeout,
            reconnect_on_failure: self.reconnect_on_failure,
        }
    }
}

/// A host/port/password-aware RCON client that lazily opens a [`Session`] and, on request,
/// transparently reconnects after a connection failure.
///
/// Unlike [`Session`], which owns a single transport for its whole lifetime, `RconClient`
/// owns connection *details* and is free to tear down and re-establish the underlying
/// session. All protocol behavior still lives in [`Session`]; this type only adds connection
/// management around it.
pub struct RconClient {
    config: RconClientConfig,
    session: Option<Session<TcpStream>>,
}

impl RconClient {
    /// Creates a client from `config`. No connection is opened until the first command.
    pub fn new(config: RconClientConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Executes `command`, opening and authenticating a connection first if one isn't
    /// already established, and retrying once after a fresh reconnect if the configuration
    /// allows it and the first attempt failed with a connection-level error.
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        self.ensure_connected()?;

        match self.session().send_command(command) {
            Ok(response) => Ok(response),
            Err(err) if self.config.reconnect_on_failure && is_connection_level(&err) => {
                tracing::warn!(error = %err, "command failed, reconnecting and retrying once");
                self.session = None;
                self.ensure_connected()?;
                self.session().send_command(command)
            }
            Err(err) => Err(err),
        }
    }

    /// Closes the underlying session, if one is open. Safe to call when already
    /// disconnected.
    pub fn close(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            session.close()?;
        }
        Ok(())
    }

    fn session(&self) -> &Session<TcpStream> {
        self.session
            .as_ref()
            .expect("ensure_connected must be called before session() is used")
    }

    fn ensure_connected(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let address = format!("{}:{}", self.config.host, self.config.port);
        tracing::debug!(address = %address, "opening rcon connection");

        let transport = connect_with_timeout(&address, self.config.connect_timeout)?;

        let session = SessionBuilder::new()
            .charset(self.config.charset)
            .fragment_strategy(self.config.fragment_strategy)
            .fragment_timeout(self.config.fragment_timeout)
            .transport_read_timeout(self.config.transport_read_timeout)
            .build(transport)?;

        session.try_authenticate(&self.config.password)?;
        self.session = Some(session);
        Ok(())
    }
}

fn connect_with_timeout(address: &str, timeout: Duration) -> Result<TcpStream> {
    use std::net::ToSocketAddrs;

    let socket_addr = address
        .to_socket_addrs()
        .map_err(RconError::from)?
        .next()
        .ok_or_else(|| RconError::invalid_argument(format!("could not resolve address {address}")))?;

    Ok(TcpStream::connect_timeout(&socket_addr, timeout)?)
}

/// Whether `err` represents a failure at the connection level (as opposed to a protocol
/// violation or an authentication rejection), and is therefore worth retrying after a
/// reconnect.
fn is_connection_level(err: &RconError) -> bool {
    matches!(err, RconError::Connection(_) | RconError::FragmentAssembly { .. })
}
