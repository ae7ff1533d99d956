//! Bit-exact encode/decode of a single packet to/from a byte sequence.
//!
//! This module does **not** handle the length prefix that precedes a packet on the wire;
//! that is the [frame layer's](crate::frame) job. It only deals with the twelve bytes of
//! `request_id`/`type` plus the payload and its trailing pad, i.e. everything after the
//! length prefix.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::charset::Charset;
use crate::error::{ProtocolViolation, RconError, Result};
use crate::packet::Packet;

/// Maximum payload size, in bytes, for a packet sent from client to server.
pub const MAX_CLIENT_PAYLOAD_BYTES: usize = 1446;

/// Maximum payload size, in bytes, for a packet sent from server to client.
pub const MAX_SERVER_PAYLOAD_BYTES: usize = 4096;

/// Bytes consumed by the fixed `request_id` + `type` fields plus the two trailing pad bytes,
/// i.e. every byte of the body besides the payload itself.
const FIXED_OVERHEAD_BYTES: usize = 4 + 4 + 2;

/// Validates that `packet`'s payload, once encoded under `charset`, fits within the
/// client-to-server maximum of [`MAX_CLIENT_PAYLOAD_BYTES`] bytes.
pub fn validate(packet: &Packet, charset: Charset) -> Result<()> {
    let encoded_len = charset.encode(packet.payload()).len();
    if encoded_len > MAX_CLIENT_PAYLOAD_BYTES {
        return Err(RconError::invalid_argument(format!(
            "payload of {encoded_len} bytes exceeds the {MAX_CLIENT_PAYLOAD_BYTES}-byte client-to-server limit"
        )));
    }
    Ok(())
}

/// Encodes `packet`'s body (everything after the length prefix) into `buffer`, appending to
/// whatever is already there. Does not write the length prefix.
pub fn encode(packet: &Packet, charset: Charset, buffer: &mut Vec<u8>) -> Result<()> {
    validate(packet, charset)?;

    buffer.write_i32::<LittleEndian>(packet.request_id())?;
    buffer.write_i32::<LittleEndian>(packet.packet_type())?;
    buffer.extend_from_slice(&charset.encode(packet.payload()));
    buffer.push(0);
    buffer.push(0);

    Ok(())
}

/// The wire size, in bytes, of `packet`'s body under `charset`, i.e. the value that would
/// go in the length prefix.
pub fn encoded_body_len(packet: &Packet, charset: Charset) -> usize {
    FIXED_OVERHEAD_BYTES + charset.encode(packet.payload()).len()
}

/// Decodes a packet body (the `length` bytes that follow a frame's length prefix) into a
/// [`Packet`].
///
/// `body` must be exactly `length` bytes: `request_id` (4 bytes), `type` (4 bytes),
/// `length - 10` payload bytes, then two trailing pad bytes.
pub fn decode(body: &[u8], charset: Charset) -> Result<Packet> {
    if body.len() < FIXED_OVERHEAD_BYTES {
        return Err(RconError::Protocol(ProtocolViolation::InvalidFrameLength {
            length: body.len() as i32,
        }));
    }

    let mut cursor = body;
    let request_id = cursor.read_i32::<LittleEndian>()?;
    let packet_type = cursor.read_i32::<LittleEndian>()?;

    // `cursor` now holds payload bytes followed by the two trailing pad bytes.
    let payload_len = cursor.len() - 2;
    let payload_bytes = &cursor[..payload_len];
    let payload = charset.decode(payload_bytes);

    Ok(Packet::new(request_id, packet_type, payload))
}
