//! Error types returned by this crate.

use std::io;

use thiserror::Error;

/// The reason a fragment-resolution pass or packet read failed at the protocol level.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProtocolViolation {
    /// A frame's length prefix was outside the legal `[10, 4106]` range.
    #[error("invalid frame length {length} (must be in 10..=4106)")]
    InvalidFrameLength {
        /// The length prefix as read off the wire.
        length: i32,
    },

    /// A packet was received with a type other than the one required at this point
    /// in the protocol (e.g. something other than `AUTH_RESPONSE` after authenticating).
    #[error("unexpected packet type {actual} (expected {expected})")]
    UnexpectedPacketType {
        /// The packet type required by the current phase of the protocol.
        expected: i32,
        /// The packet type actually received.
        actual: i32,
    },

    /// A command response fragment carried the sentinel invalid `request_id` of `-1`.
    #[error("server sent the invalid sentinel request id (-1) in a command response")]
    InvalidSentinelInResponse,

    /// A command response fragment's `request_id` did not match the outstanding request.
    #[error("unmatched request id in command response: expected {expected}, got {actual}")]
    UnmatchedRequestId {
        /// The `request_id` of the outstanding request.
        expected: i32,
        /// The `request_id` actually observed on the fragment.
        actual: i32,
    },
}

/// Errors that can occur while using a [`Session`](crate::session::Session).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RconError {
    /// The transport could not be opened, a read/write on it failed, or the peer closed the
    /// connection unexpectedly.
    #[error(transparent)]
    Connection(#[from] io::Error),

    /// `AUTH_RESPONSE` was received with `request_id == -1`.
    #[error("authentication failed (server rejected the supplied password)")]
    AuthenticationFailed,

    /// A malformed frame or an out-of-phase/out-of-order packet was received.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// A command or password exceeded the protocol's size limits, or an invalid argument was
    /// otherwise supplied (e.g. a null byte in a command).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A blocking operation exceeded its configured deadline.
    ///
    /// Under the [`FragmentStrategy::Timeout`](crate::fragment::FragmentStrategy::Timeout)
    /// strategy this is an expected control signal encountered internally, never returned to
    /// the caller; this variant is only surfaced when a genuine timeout occurs outside of
    /// fragment resolution (e.g. during connect).
    #[error("operation timed out")]
    Timeout,

    /// The `ACTIVE_PROBE` strategy lost the connection after the probe packet had already been
    /// sent. The data successfully assembled before the failure is attached so it is not lost.
    #[error("connection failed while assembling a fragmented response ({partial_payload_len} bytes recovered): {source}")]
    FragmentAssembly {
        /// The payload text assembled from fragments received before the failure.
        partial_payload: String,
        /// The number of bytes in `partial_payload`, surfaced for the error message.
        partial_payload_len: usize,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An operation was attempted on a [`Session`](crate::session::Session) that has already
    /// encountered a connection or protocol error and is therefore no longer usable.
    #[error("session is broken after a previous error and can no longer be used")]
    SessionBroken,
}

impl RconError {
    /// Shorthand for constructing an [`RconError::InvalidArgument`].
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Convenience alias for `Result<T, RconError>`.
pub type Result<T> = std::result::Result<T, RconError>;
