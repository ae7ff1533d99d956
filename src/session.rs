//! Connection lifecycle, the auth handshake, and request/response correlation.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::charset::Charset;
use crate::error::{ProtocolViolation, RconError, Result};
use crate::fragment::{FragmentStrategy, DEFAULT_FRAGMENT_TIMEOUT};
use crate::frame::{FrameReader, FrameWriter, DEFAULT_WRITE_BUFFER_CAPACITY};
use crate::packet::{Packet, AUTH, AUTH_RESPONSE, EXEC_COMMAND, RESPONSE_VALUE, SENTINEL_REQUEST_ID};
use crate::transport::BlockingTransport;

/// Default capacity hint for the internal read buffer. Frames are always read to their
/// exact reported length regardless of this value; it only avoids reallocating the buffer
/// across repeated reads when set at or above [`MAX_RECOMMENDED_READ_BUFFER_CAPACITY`].
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 4096;

/// The read-buffer capacity that admits a full server-to-client frame (header + max payload
/// + pad) without reallocating.
pub const MAX_RECOMMENDED_READ_BUFFER_CAPACITY: usize = 4096 + 10;

/// Default transport-level read timeout, applied to every individual read.
pub const DEFAULT_TRANSPORT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for a [`Session`], following the same default-then-setter-then-build shape as the
/// rest of this crate's configuration types.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    charset: Charset,
    read_buffer_capacity: usize,
    write_buffer_capacity: usize,
    fragment_strategy: FragmentStrategy,
    fragment_timeout: Duration,
    transport_read_timeout: Duration,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            charset: Charset::default(),
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
            write_buffer_capacity: DEFAULT_WRITE_BUFFER_CAPACITY,
            fragment_strategy: FragmentStrategy::default(),
            fragment_timeout: DEFAULT_FRAGMENT_TIMEOUT,
            transport_read_timeout: DEFAULT_TRANSPORT_READ_TIMEOUT,
        }
    }
}

impl SessionBuilder {
    /// Creates a new builder with every option set to its documented default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the charset used to encode/decode payload text. Fixed for the session's
    /// lifetime once [`build`](SessionBuilder::build) is called.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the read-buffer capacity hint.
    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    /// Sets the initial write scratch buffer capacity. Grows on demand.
    pub fn write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.write_buffer_capacity = capacity;
        self
    }

    /// Sets the initial fragment-resolution strategy. May be changed later via
    /// [`Session::set_fragment_strategy`].
    pub fn fragment_strategy(mut self, strategy: FragmentStrategy) -> Self {
        self.fragment_strategy = strategy;
        self
    }

    /// Sets the initial inactivity window used by [`FragmentStrategy::Timeout`]. May be
    /// changed later via [`Session::set_fragment_timeout`].
    pub fn fragment_timeout(mut self, timeout: Duration) -> Self {
        self.fragment_timeout = timeout;
        self
    }

    /// Sets the transport-level read timeout applied to individual reads. Should be at
    /// least as long as `fragment_timeout` for [`FragmentStrategy::Timeout`] to work.
    pub fn transport_read_timeout(mut self, timeout: Duration) -> Self {
        self.transport_read_timeout = timeout;
        self
    }

    /// Builds a [`Session`] around an already-opened transport.
    pub fn build<T: BlockingTransport>(self, transport: T) -> Result<Session<T>> {
        transport.set_read_timeout(Some(self.transport_read_timeout))?;

        // Seed the request id counter randomly, as real-world RCON clients do, so a pair of
        // sessions opened back to back don't allocate identical ids; -1 is reserved as the
        // failure sentinel and is never handed out (see `allocate_request_id`).
        let next_request_id: i32 = rand::random();
        tracing::debug!(fragment_strategy = ?self.fragment_strategy, "session established");

        Ok(Session {
            reader: FrameReader::new(self.charset, self.read_buffer_capacity),
            state: Mutex::new(SessionState {
                transport,
                writer: FrameWriter::new(self.charset, self.write_buffer_capacity),
                next_request_id,
                fragment_strategy: self.fragment_strategy,
                fragment_timeout: self.fragment_timeout,
                transport_read_timeout: self.transport_read_timeout,
                broken: false,
            }),
        })
    }
}

struct SessionState<T> {
    transport: T,
    writer: FrameWriter,
    next_request_id: i32,
    fragment_strategy: FragmentStrategy,
    fragment_timeout: Duration,
    transport_read_timeout: Duration,
    broken: bool,
}

/// A single RCON connection: authentication, request/response correlation, and the active
/// fragment-resolution strategy all live here.
///
/// `authenticate`, `send_command`, and the read/write pair they're built on form a single
/// critical section per `Session`: concurrent callers are serialized via an internal lock,
/// never interleaved. Callers that want parallelism should use independent `Session`s, each
/// owning its own transport.
pub struct Session<T> {
    reader: FrameReader,
    state: Mutex<SessionState<T>>,
}

impl<T: BlockingTransport> Session<T> {
    /// Builds a session around `transport` using every default setting. Equivalent to
    /// `SessionBuilder::new().build(transport)`.
    pub fn new(transport: T) -> Result<Self> {
        SessionBuilder::new().build(transport)
    }

    /// Replaces the active fragment-resolution strategy.
    pub fn set_fragment_strategy(&self, strategy: FragmentStrategy) {
        self.lock_state_ignoring_broken().fragment_strategy = strategy;
    }

    /// Replaces the inactivity window used by [`FragmentStrategy::Timeout`].
    pub fn set_fragment_timeout(&self, timeout: Duration) {
        self.lock_state_ignoring_broken().fragment_timeout = timeout;
    }

    /// Performs the authentication handshake, returning whether it succeeded.
    ///
    /// A `false` return is a normal (if unwelcome) outcome, not an error: the server
    /// explicitly rejected the password via the sentinel `request_id == -1`. Use
    /// [`try_authenticate`](Session::try_authenticate) if you'd rather treat that as an
    /// error.
    #[tracing::instrument(name = "authenticate", skip(self, password))]
    pub fn authenticate(&self, password: &str) -> Result<bool> {
        let mut state = self.lock_state()?;
        let result = self.authenticate_locked(&mut state, password);
        if result.is_err() {
            state.broken = true;
        }
        result
    }

    /// Like [`authenticate`](Session::authenticate), but turns a `false` result into
    /// [`RconError::AuthenticationFailed`].
    pub fn try_authenticate(&self, password: &str) -> Result<()> {
        if self.authenticate(password)? {
            Ok(())
        } else {
            Err(RconError::AuthenticationFailed)
        }
    }

    /// Executes `command` on the server and returns the concatenated payload of every
    /// fragment in its response, in arrival order.
    #[tracing::instrument(name = "send_command", skip(self), fields(command_len = command.len()))]
    pub fn send_command(&self, command: &str) -> Result<String> {
        let mut state = self.lock_state()?;
        let result = self.send_command_locked(&mut state, command);
        if result.is_err() {
            state.broken = true;
        }
        result
    }

    /// Idempotently closes the underlying transport. Safe to call more than once, and safe
    /// to call after any other operation has already failed.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.broken {
            return Ok(());
        }
        state.broken = true;
        Ok(state.transport.shutdown()?)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState<T>>> {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.broken {
            return Err(RconError::SessionBroken);
        }
        Ok(guard)
    }

    fn lock_state_ignoring_broken(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate_request_id(state: &mut SessionState<T>) -> i32 {
        if state.next_request_id == SENTINEL_REQUEST_ID {
            state.next_request_id = state.next_request_id.wrapping_add(1);
        }
        let id = state.next_request_id;
        state.next_request_id = state.next_request_id.wrapping_add(1);
        id
    }

    fn authenticate_locked(&self, state: &mut SessionState<T>, password: &str) -> Result<bool> {
        let id = Self::allocate_request_id(state);
        tracing::debug!(request_id = id, "sending AUTH packet");
        let packet = Packet::new(id, AUTH, password);
        state.writer.write(&mut state.transport, &packet)?;

        let mut response = self.reader.read(&mut state.transport)?;

        // Quirk: some Source-family servers send a spurious empty RESPONSE_VALUE packet
        // before the real AUTH_RESPONSE. Discard it unconditionally, per spec.
        if response.packet_type() == RESPONSE_VALUE {
            if !response.payload().is_empty() {
                tracing::warn!(
                    request_id = id,
                    "discarding non-empty payload on spurious pre-AUTH_RESPONSE packet"
                );
            }
            tracing::debug!(request_id = id, "discarding spurious RESPONSE_VALUE before AUTH_RESPONSE");
            response = self.reader.read(&mut state.transport)?;
        }

        if response.packet_type() != AUTH_RESPONSE {
            return Err(RconError::Protocol(ProtocolViolation::UnexpectedPacketType {
                expected: AUTH_RESPONSE,
                actual: response.packet_type(),
            }));
        }

        Ok(response.is_valid())
    }

    fn send_command_locked(&self, state: &mut SessionState<T>, command: &str) -> Result<String> {
        let command_id = Self::allocate_request_id(state);
        tracing::debug!(request_id = command_id, "--> {command}");
        let packet = Packet::new(command_id, EXEC_COMMAND, command);
        state.writer.write(&mut state.transport, &packet)?;

        match state.fragment_strategy {
            FragmentStrategy::PacketSize => self.assemble_packet_size(state, command_id),
            FragmentStrategy::Timeout => self.assemble_timeout(state, command_id),
            FragmentStrategy::ActiveProbe => self.assemble_active_probe(state, command_id),
        }
    }

    fn validate_fragment(packet: &Packet, expected_id: i32) -> Result<()> {
        if !packet.is_valid() {
            return Err(RconError::Protocol(ProtocolViolation::InvalidSentinelInResponse));
        }
        if packet.packet_type() != RESPONSE_VALUE {
            return Err(RconError::Protocol(ProtocolViolation::UnexpectedPacketType {
                expected: RESPONSE_VALUE,
                actual: packet.packet_type(),
            }));
        }
        if packet.request_id() != expected_id {
            return Err(RconError::Protocol(ProtocolViolation::UnmatchedRequestId {
                expected: expected_id,
                actual: packet.request_id(),
            }));
        }
        Ok(())
    }

    /// Heuristic strategy: stop after any fragment shorter than the server-to-client
    /// ceiling. See [`FragmentStrategy::PacketSize`] for the known hazard.
    fn assemble_packet_size(&self, state: &mut SessionState<T>, command_id: i32) -> Result<String> {
        let mut payload = String::new();
        loop {
            let packet = self.reader.read(&mut state.transport)?;
            Self::validate_fragment(&packet, command_id)?;

            let wire_len = state.writer.charset().encode(packet.payload()).len();
            tracing::trace!(request_id = command_id, wire_len, "received fragment");
            payload.push_str(packet.payload());

            if wire_len < crate::codec::MAX_SERVER_PAYLOAD_BYTES {
                break;
            }
        }
        Ok(payload)
    }

    /// Quiescence-based strategy: read until an inactivity timeout (or end-of-stream) fires.
    fn assemble_timeout(&self, state: &mut SessionState<T>, command_id: i32) -> Result<String> {
        state.transport.set_read_timeout(Some(state.fragment_timeout))?;

        let mut payload = String::new();
        let outcome = loop {
            match self.reader.read(&mut state.transport) {
                Ok(packet) => {
                    if let Err(err) = Self::validate_fragment(&packet, command_id) {
                        break Err(err);
                    }
                    tracing::trace!(request_id = command_id, "received fragment");
                    payload.push_str(packet.payload());
                }
                Err(RconError::Connection(io_err)) if is_quiescence(&io_err) => break Ok(payload),
                Err(other) => break Err(other),
            }
        };

        // Restore the session's standing read timeout regardless of how assembly ended.
        state.transport.set_read_timeout(Some(state.transport_read_timeout))?;

        outcome
    }

    /// Deterministic default strategy: an unconditional empty probe command delimits the
    /// end of the real response, since the server processes and echoes commands in order.
    fn assemble_active_probe(&self, state: &mut SessionState<T>, command_id: i32) -> Result<String> {
        let first = self.reader.read(&mut state.transport)?;
        Self::validate_fragment(&first, command_id)?;
        let mut payload = String::new();
        payload.push_str(first.payload());

        let probe_id = Self::allocate_request_id(state);
        let probe = Packet::new(probe_id, EXEC_COMMAND, "");
        tracing::debug!(request_id = probe_id, "sending ACTIVE_PROBE sentinel");
        if let Err(err) = state.writer.write(&mut state.transport, &probe) {
            return Err(attach_partial_payload(err, payload));
        }

        loop {
            let packet = match self.reader.read(&mut state.transport) {
                Ok(packet) => packet,
                Err(err) => return Err(attach_partial_payload(err, payload)),
            };

            if packet.request_id() == probe_id {
                tracing::trace!(request_id = probe_id, "probe echoed, response complete");
                break;
            }

            if let Err(err) = Self::validate_fragment(&packet, command_id) {
                return Err(err);
            }
            tracing::trace!(request_id = command_id, "received fragment");
            payload.push_str(packet.payload());
        }

        Ok(payload)
    }
}

/// Whether `err` represents the fragment-timeout strategy's inactivity window elapsing, or
/// the connection closing, both of which are treated as "no more fragments are coming".
fn is_quiescence(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::ConnectionAborted
    )
}

/// Implements the documented choice for Open Question #1: surface read failures that occur
/// after the `ACTIVE_PROBE` packet has been sent, but attach whatever payload was already
/// assembled so it isn't silently lost.
fn attach_partial_payload(err: RconError, partial_payload: String) -> RconError {
    match err {
        RconError::Connection(io_err) => RconError::FragmentAssembly {
            partial_payload_len: partial_payload.len(),
            partial_payload,
            source: io_err,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use super::*;

    /// Opens a real loopback TCP connection and hands back both ends, so tests exercise the
    /// actual framing and timeout behavior rather than an in-memory stand-in.
    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();
        (client.join().unwrap(), server)
    }

    #[test]
    fn authenticate_succeeds_when_server_accepts_password() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let auth = reader.read(&mut server).unwrap();
            assert_eq!(auth.packet_type(), AUTH);
            writer
                .write(&mut server, &Packet::new(auth.request_id(), AUTH_RESPONSE, ""))
                .unwrap();
        });

        let authenticated = session.authenticate("hunter2").unwrap();
        handle.join().unwrap();
        assert!(authenticated);
    }

    #[test]
    fn authenticate_fails_when_server_rejects_password() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let _auth = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(SENTINEL_REQUEST_ID, AUTH_RESPONSE, ""))
                .unwrap();
        });

        let authenticated = session.authenticate("wrong").unwrap();
        handle.join().unwrap();
        assert!(!authenticated);
    }

    #[test]
    fn authenticate_discards_spurious_empty_response_value_before_auth_response() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let auth = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(auth.request_id(), RESPONSE_VALUE, ""))
                .unwrap();
            writer
                .write(&mut server, &Packet::new(auth.request_id(), AUTH_RESPONSE, ""))
                .unwrap();
        });

        let authenticated = session.authenticate("hunter2").unwrap();
        handle.join().unwrap();
        assert!(authenticated);
    }

    #[test]
    fn send_command_with_active_probe_assembles_single_fragment_response() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let command = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "hello"))
                .unwrap();
            let probe = reader.read(&mut server).unwrap();
            assert_eq!(probe.payload(), "");
            writer
                .write(&mut server, &Packet::new(probe.request_id(), RESPONSE_VALUE, ""))
                .unwrap();
        });

        let response = session.send_command("say hello").unwrap();
        handle.join().unwrap();
        assert_eq!(response, "hello");
    }

    #[test]
    fn send_command_with_active_probe_assembles_multiple_fragments() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let command = reader.read(&mut server).unwrap();
            for chunk in ["first ", "second ", "third"] {
                writer
                    .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, chunk))
                    .unwrap();
            }
            let probe = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(probe.request_id(), RESPONSE_VALUE, ""))
                .unwrap();
        });

        let response = session.send_command("list").unwrap();
        handle.join().unwrap();
        assert_eq!(response, "first second third");
    }

    #[test]
    fn send_command_with_packet_size_strategy_stops_after_short_fragment() {
        let (client, mut server) = connected_pair();
        let session = SessionBuilder::new()
            .fragment_strategy(FragmentStrategy::PacketSize)
            .build(client)
            .unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let command = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "short"))
                .unwrap();
        });

        let response = session.send_command("list").unwrap();
        handle.join().unwrap();
        assert_eq!(response, "short");
    }

    #[test]
    fn send_command_with_timeout_strategy_completes_on_inactivity() {
        let (client, mut server) = connected_pair();
        let session = SessionBuilder::new()
            .fragment_strategy(FragmentStrategy::Timeout)
            .fragment_timeout(Duration::from_millis(50))
            .transport_read_timeout(Duration::from_secs(5))
            .build(client)
            .unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let command = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "a"))
                .unwrap();
            writer
                .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "b"))
                .unwrap();
            thread::sleep(Duration::from_millis(200));
        });

        let response = session.send_command("list").unwrap();
        handle.join().unwrap();
        assert_eq!(response, "ab");
    }

    #[test]
    fn session_is_broken_after_a_protocol_violation() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let auth = reader.read(&mut server).unwrap();
            writer
                .write(
                    &mut server,
                    &Packet::new(auth.request_id(), RESPONSE_VALUE, "not an auth response"),
                )
                .unwrap();
        });

        let err = session.authenticate("x").unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, RconError::Protocol(_)));

        let second = session.authenticate("x");
        assert!(matches!(second, Err(RconError::SessionBroken)));
    }

    #[test]
    fn close_is_idempotent() {
        let (client, _server) = connected_pair();
        let session = Session::new(client).unwrap();
        session.close().unwrap();
        session.close().unwrap();
    }

    /// Property 12: concurrent `send_command` callers on the *same* session are serialized,
    /// not interleaved: every command's probe round-trip completes before the next
    /// command's write begins, and no `request_id` is ever reused.
    #[test]
    fn concurrent_send_command_on_same_session_is_serialized() {
        use std::sync::Arc;

        let (client, mut server) = connected_pair();
        let session = Arc::new(Session::new(client).unwrap());

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let mut seen_ids = std::collections::HashSet::new();

            // Each command, under ACTIVE_PROBE, is exactly one fragment read followed by a
            // probe write and a probe read. If the session failed to serialize callers, two
            // commands' frames could arrive out of this strict order.
            for _ in 0..8 {
                let command = reader.read(&mut server).unwrap();
                assert!(seen_ids.insert(command.request_id()), "request id reused");
                writer
                    .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "ok"))
                    .unwrap();
                let probe = reader.read(&mut server).unwrap();
                assert!(seen_ids.insert(probe.request_id()), "request id reused");
                writer
                    .write(&mut server, &Packet::new(probe.request_id(), RESPONSE_VALUE, ""))
                    .unwrap();
            }
        });

        let worker_handles: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for _ in 0..2 {
                        assert_eq!(session.send_command("status").unwrap(), "ok");
                    }
                })
            })
            .collect();

        for worker in worker_handles {
            worker.join().unwrap();
        }
        handle.join().unwrap();
    }

    /// Open Question #1: a connection dropped after the `ACTIVE_PROBE` packet has been sent
    /// surfaces as `RconError::FragmentAssembly`, carrying whatever payload was already
    /// assembled rather than discarding it.
    #[test]
    fn active_probe_surfaces_partial_payload_on_post_probe_connection_drop() {
        let (client, mut server) = connected_pair();
        let session = Session::new(client).unwrap();

        let handle = thread::spawn(move || {
            let reader = FrameReader::new(Charset::Utf8, 4096);
            let mut writer = FrameWriter::new(Charset::Utf8, 64);
            let command = reader.read(&mut server).unwrap();
            writer
                .write(&mut server, &Packet::new(command.request_id(), RESPONSE_VALUE, "partial"))
                .unwrap();
            let _probe = reader.read(&mut server).unwrap();
            // Drop the connection without ever echoing the probe back.
            server.shutdown(std::net::Shutdown::Both).ok();
        });

        let err = session.send_command("list").unwrap_err();
        handle.join().unwrap();

        match err {
            RconError::FragmentAssembly {
                partial_payload,
                partial_payload_len,
                ..
            } => {
                assert_eq!(partial_payload, "partial");
                assert_eq!(partial_payload_len, "partial".len());
            }
            other => panic!("expected FragmentAssembly, got {other:?}"),
        }

        // The session is poisoned after the failure, per the broken-session contract.
        assert!(matches!(session.send_command("list"), Err(RconError::SessionBroken)));
    }
}
