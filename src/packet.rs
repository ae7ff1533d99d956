//! The logical packet type, independent of its wire representation.

use getset::CopyGetters;

/// `SERVERDATA_RESPONSE_VALUE`: server-to-client command output, and a placeholder used for
/// certain server quirks (e.g. the spurious empty packet some servers send before
/// [`AUTH_RESPONSE`]).
pub const RESPONSE_VALUE: i32 = 0;

/// `SERVERDATA_EXECCOMMAND`: client-to-server command execution.
///
/// This value is overloaded on the wire: the server reuses the same `2` as
/// [`AUTH_RESPONSE`] during the authentication phase. The protocol does not carry a
/// direction bit, so the two are disambiguated purely by which phase of the exchange is
/// in progress, never by the numeral itself. See [`AUTH_RESPONSE`] for the other half of
/// this overload.
pub const EXEC_COMMAND: i32 = 2;

/// `SERVERDATA_AUTH_RESPONSE`: server-to-client authentication result. Numerically
/// identical to [`EXEC_COMMAND`]; see that constant's documentation.
pub const AUTH_RESPONSE: i32 = 2;

/// `SERVERDATA_AUTH`: client-to-server authentication request.
pub const AUTH: i32 = 3;

/// The sentinel `request_id` a server uses to signal an authentication failure.
pub const SENTINEL_REQUEST_ID: i32 = -1;

/// An immutable RCON packet: a `(request_id, type, payload)` triple.
///
/// Packets carry no validity of their own beyond [`Packet::is_valid`]; the meaning of
/// `packet_type` is interpreted by the caller according to which phase of the protocol is
/// in progress (see [`EXEC_COMMAND`]/[`AUTH_RESPONSE`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, CopyGetters)]
pub struct Packet {
    /// The request identifier this packet carries.
    #[getset(get_copy = "pub")]
    request_id: i32,

    /// The wire-visible packet type. See the module constants for the closed set of legal
    /// values.
    #[getset(get_copy = "pub")]
    packet_type: i32,

    payload: String,
}

impl Packet {
    /// Builds a new packet. `payload` may be empty but is never absent.
    pub fn new(request_id: i32, packet_type: i32, payload: impl Into<String>) -> Self {
        Self {
            request_id,
            packet_type,
            payload: payload.into(),
        }
    }

    /// The packet's payload text.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// A packet with `request_id == -1` is the server's sentinel for an authentication
    /// failure and is considered invalid; every other `request_id` is valid.
    pub fn is_valid(&self) -> bool {
        self.request_id != SENTINEL_REQUEST_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_request_id_is_invalid() {
        let packet = Packet::new(SENTINEL_REQUEST_ID, AUTH_RESPONSE, "");
        assert!(!packet.is_valid());
    }

    #[test]
    fn ordinary_request_id_is_valid() {
        let packet = Packet::new(1, AUTH_RESPONSE, "");
        assert!(packet.is_valid());
    }

    #[test]
    fn missing_payload_is_empty_string_not_absent() {
        let packet = Packet::new(1, RESPONSE_VALUE, "");
        assert_eq!(packet.payload(), "");
    }

    #[test]
    fn equality_and_hash_are_structural() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = Packet::new(1, EXEC_COMMAND, "list");
        let b = Packet::new(1, EXEC_COMMAND, "list");
        assert_eq!(a, b);

        let mut hasher_a = DefaultHasher::new();
        a.hash(&mut hasher_a);
        let mut hasher_b = DefaultHasher::new();
        b.hash(&mut hasher_b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());
    }
}
