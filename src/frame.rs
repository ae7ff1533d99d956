//! Length-prefixed framing on top of a blocking byte transport.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::charset::Charset;
use crate::codec;
use crate::error::{ProtocolViolation, RconError, Result};
use crate::packet::Packet;

/// Minimum legal value of a frame's length prefix: `request_id` (4) + `type` (4) + the
/// two-byte terminator/pad, i.e. the smallest possible (empty-payload) packet body.
const MIN_FRAME_LENGTH: i32 = 10;

/// Maximum legal value of a frame's length prefix: the server-to-client payload ceiling of
/// [`codec::MAX_SERVER_PAYLOAD_BYTES`] plus the fixed 10-byte header/pad overhead.
const MAX_FRAME_LENGTH: i32 = codec::MAX_SERVER_PAYLOAD_BYTES as i32 + MIN_FRAME_LENGTH;

/// Default scratch buffer capacity for a [`FrameWriter`], a typical Ethernet MTU.
pub const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 1460;

/// Writes [`Packet`]s as length-prefixed frames onto a transport.
pub struct FrameWriter {
    charset: Charset,
    scratch: Vec<u8>,
}

impl FrameWriter {
    /// Creates a writer with the given charset and initial scratch buffer capacity. The
    /// buffer grows on demand if a packet doesn't fit.
    pub fn new(charset: Charset, buffer_capacity: usize) -> Self {
        Self {
            charset,
            scratch: Vec::with_capacity(buffer_capacity),
        }
    }

    /// The charset this writer encodes payloads with.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Serializes `packet` and writes the complete frame to `transport` in one call, so a
    /// partial frame is never observable by the peer on a successful write.
    pub fn write<W: Write>(&mut self, transport: &mut W, packet: &Packet) -> Result<()> {
        codec::validate(packet, self.charset)?;

        self.scratch.clear();
        // Reserve the length prefix; it's backfilled once the body's length is known.
        self.scratch.write_i32::<LittleEndian>(0)?;

        codec::encode(packet, self.charset, &mut self.scratch)?;

        let body_len = (self.scratch.len() - 4) as i32;
        (&mut self.scratch[0..4]).write_i32::<LittleEndian>(body_len)?;

        transport.write_all(&self.scratch)?;
        transport.flush()?;

        Ok(())
    }
}

/// Reads [`Packet`]s from length-prefixed frames on a transport.
pub struct FrameReader {
    charset: Charset,
    buffer_capacity: usize,
}

impl FrameReader {
    /// Creates a reader with the given charset and read-buffer capacity hint.
    pub fn new(charset: Charset, buffer_capacity: usize) -> Self {
        Self {
            charset,
            buffer_capacity,
        }
    }

    /// Reads exactly one packet from `transport`.
    ///
    /// Every read is blocking and exact: a short read on the underlying transport is looped
    /// over internally via [`Read::read_exact`], and an end-of-stream before the expected
    /// bytes arrive surfaces as a distinct connection-closed I/O error.
    pub fn read<R: Read>(&self, transport: &mut R) -> Result<Packet> {
        let mut length_bytes = [0u8; 4];
        read_exact_or_closed(transport, &mut length_bytes)?;
        let length = i32::from_le_bytes(length_bytes);

        if length < MIN_FRAME_LENGTH || length > MAX_FRAME_LENGTH {
            return Err(RconError::Protocol(ProtocolViolation::InvalidFrameLength { length }));
        }

        let mut body = Vec::with_capacity(self.buffer_capacity.max(length as usize));
        body.resize(length as usize, 0);
        read_exact_or_closed(transport, &mut body)?;

        codec::decode(&body, self.charset)
    }
}

/// Like [`Read::read_exact`], but maps an end-of-stream before `buffer` is full to a
/// dedicated "connection closed" I/O error kind rather than letting
/// [`io::ErrorKind::UnexpectedEof`] propagate unlabeled, per spec.md's distinct
/// connection-closed error.
fn read_exact_or_closed<R: Read>(transport: &mut R, buffer: &mut [u8]) -> Result<()> {
    match transport.read_exact(buffer) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            Err(RconError::Connection(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "connection closed while reading a frame",
            )))
        }
        Err(err) => Err(err.into()),
    }
}
