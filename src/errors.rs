//! Error types for decoding and encoding.

use failure::Fail;
use std::io;

/// Which text-decoding path an error arose on, for error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextPath {
    /// The short property-name fast path.
    ShortName,
    /// The general string path.
    Text,
}

impl std::fmt::Display for TextPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TextPath::ShortName => write!(f, "short name"),
            TextPath::Text => write!(f, "string"),
        }
    }
}

/// An error encountered while decoding a TOKSON stream.
///
/// Every variant carries enough structure to locate the offending bytes;
/// none of them is recoverable within the same decode session.
#[derive(Debug, Fail)]
pub enum DecodeError {
    /// The stream did not open with the format signature.
    #[fail(
        display = "bad signature: found {:#04x} at offset {}, expected {:#04x}",
        found, offset, expected
    )]
    BadSignature {
        /// The byte actually present.
        found: u8,
        /// Its offset from the start of the signature.
        offset: usize,
        /// The signature byte that belongs there.
        expected: u8,
    },

    /// A VInt ran longer than its announced width allows, or its final
    /// group overflows the width.
    #[fail(display = "malformed VInt: does not fit in {} bits", width)]
    MalformedVarInt {
        /// The announced width in bits.
        width: u8,
    },

    /// A multi-byte UTF-8 sequence was cut off by the end of its declared
    /// byte range.
    #[fail(
        display = "truncated UTF-8 in {}: leading byte {:#04x} at offset {} needs {} more bytes",
        path, lead, offset, needed
    )]
    TruncatedUtf8 {
        /// The leading byte of the cut-off sequence.
        lead: u8,
        /// Offset of the leading byte within the text payload.
        offset: usize,
        /// How many continuation bytes were still owed.
        needed: usize,
        /// Which decode path hit the error.
        path: TextPath,
    },

    /// A byte inside a UTF-8 sequence was not a valid continuation byte,
    /// or a byte can never start a sequence.
    #[fail(
        display = "invalid UTF-8 in {}: byte {:#04x} at offset {}",
        path, byte, offset
    )]
    InvalidUtf8Continuation {
        /// The offending byte.
        byte: u8,
        /// Its offset within the text payload.
        offset: usize,
        /// Which decode path hit the error.
        path: TextPath,
    },

    /// Inside a chunked string, a byte that is neither a continuation
    /// marker nor the terminator.
    #[fail(
        display = "mismatched chunk marker: found {:#04x}, expected 0x1c or 0x1d",
        found
    )]
    MismatchedChunk {
        /// The byte found where a marker belongs.
        found: u8,
    },

    /// A name back-reference pointed past the end of the symbol table.
    #[fail(
        display = "invalid back-reference: index {} with {} names defined",
        index, len
    )]
    InvalidBackReference {
        /// The index the stream asked for.
        index: u64,
        /// The number of names defined so far.
        len: usize,
    },

    /// An end-of-container tag that does not match the open container.
    #[fail(display = "mismatched {} {}", found, context)]
    MismatchedContainerEnd {
        /// The structural tag found.
        found: &'static str,
        /// Where it was found.
        context: &'static str,
    },

    /// The source ran dry in the middle of an item.
    #[fail(display = "unexpected end of input while decoding {}", decoding)]
    UnexpectedEndOfInput {
        /// What was being decoded.
        decoding: &'static str,
    },

    /// A tag byte from an unassigned type class.
    #[fail(display = "unknown tag byte {:#04x}", tag)]
    UnknownTag {
        /// The unassigned tag.
        tag: u8,
    },

    /// The current token is not of the kind an accessor asked for, or a
    /// tag appeared somewhere the grammar forbids it.
    #[fail(display = "unexpected {}, expected {}", found, expected)]
    UnexpectedToken {
        /// What is actually there.
        found: &'static str,
        /// What the caller or the grammar required.
        expected: &'static str,
    },

    /// A declared length does not fit in the address space.
    #[fail(display = "declared length {} overflows usize", len)]
    LengthOverflow {
        /// The declared length.
        len: u64,
    },

    /// An I/O error from a streaming source.
    #[fail(display = "i/o error: {}", _0)]
    Io(#[fail(cause)] io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> DecodeError { DecodeError::Io(e) }
}

/// An error encountered while encoding, always a caller mistake rather
/// than an environmental failure.
#[derive(Debug, Fail, PartialEq, Eq)]
pub enum GenerationError {
    /// A write call that the current structural context forbids.
    #[fail(display = "out of context: expected {}, got {}", expected, actual)]
    OutOfContext {
        /// What the context called for.
        expected: &'static str,
        /// What was written instead.
        actual: &'static str,
    },

    /// `finish` was called with containers still open.
    #[fail(display = "{} container(s) still open", depth)]
    UnclosedContainer {
        /// How many containers remained open.
        depth: usize,
    },

    /// A 32-bit-width token carried a value outside the i32 range.
    #[fail(display = "integer {} out of range for its declared width", value)]
    IntOutOfRange {
        /// The offending value.
        value: i64,
    },
}
