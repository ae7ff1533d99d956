//! Text encodings used for packet payloads.

/// The character encoding a [`Session`](crate::session::Session) uses to translate between
/// payload bytes on the wire and the [`String`] values exposed to callers.
///
/// Changing the charset mid-session is not supported; it is fixed when the session (or its
/// builder) is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8, the default. Matches what most modern RCON servers emit.
    #[default]
    Utf8,

    /// ISO-8859-1 (Latin-1), needed for servers that emit legacy console color escapes
    /// prefixed by byte `0xA7`, which is not valid US-ASCII and is rarely valid UTF-8 either.
    Iso8859_1,
}

impl Charset {
    /// Encodes `text` into bytes suitable for a packet payload under this charset.
    pub(crate) fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            // Every Unicode scalar value in 0..=0xFF maps to the identically-numbered
            // ISO-8859-1 byte; anything outside that range has no representation and is
            // replaced with `?`, mirroring the lossy behavior of `String::from_utf8_lossy`
            // for the UTF-8 case below.
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| u32::from(c).try_into().unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Decodes `bytes` read from a packet payload under this charset.
    pub(crate) fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}
