//! Strategies for deciding when a fragmented command response is complete.
//!
//! The protocol lets a server split one command's response across multiple
//! `RESPONSE_VALUE` packets sharing a `request_id`, with no end-of-stream marker. Deciding
//! that no more fragments are coming is the hardest problem this crate solves; the three
//! variants here are the closed set of user-visible strategies a
//! [`Session`](crate::session::Session) can use to solve it.

use std::time::Duration;

/// Default inactivity window for [`FragmentStrategy::Timeout`].
pub const DEFAULT_FRAGMENT_TIMEOUT: Duration = Duration::from_millis(100);

/// How a [`Session`](crate::session::Session) decides that a multi-packet command response
/// is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentStrategy {
    /// Stop after any fragment shorter than [`crate::codec::MAX_SERVER_PAYLOAD_BYTES`] bytes.
    ///
    /// Simple but heuristic: a response whose total size happens to be an exact multiple of
    /// the server-to-client ceiling produces a spurious trailing hang, since every fragment
    /// in that case is exactly full-sized. Retained only for compatibility with callers that
    /// specifically request it; RFC-level documentation of this protocol deprecates it in
    /// favor of [`FragmentStrategy::ActiveProbe`].
    PacketSize,

    /// Apply a short inactivity timeout to the read side and treat a timeout (or
    /// end-of-stream) as completion. Every successfully received fragment resets the window.
    /// Adds latency proportional to the timeout on every command.
    Timeout,

    /// After the real command, unconditionally send a second, empty `EXEC_COMMAND` probe
    /// packet with a fresh request id. Because the server processes and echoes commands in
    /// order, the first fragment whose `request_id` matches the probe marks the end of the
    /// real response. Deterministic, adds exactly one round trip, and does not depend on
    /// timing. This is the default.
    #[default]
    ActiveProbe,
}
