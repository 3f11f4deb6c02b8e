//! # TOKSON
//!
//! TOKSON (TOKen Stream Object Notation) is a self-describing binary format
//! together with a pull-based streaming codec: a [`TokenDecoder`] that turns
//! bytes into a forward-only stream of [`Token`]s, and a [`TokenEncoder`]
//! that turns token-level write calls back into bytes.
//!
//! [`TokenDecoder`]: crate::encoding::TokenDecoder
//! [`TokenEncoder`]: crate::encoding::TokenEncoder
//!
//! # Usage
//!
//! ```
//! use tokson::prelude::*;
//!
//! let mut enc = TokenEncoder::new();
//! enc.write_start_object().unwrap();
//! enc.write_name("a").unwrap();
//! enc.write_i32(1).unwrap();
//! enc.write_end_object().unwrap();
//! let bytes = enc.finish().unwrap();
//!
//! let mut dec = TokenDecoder::from_slice(&bytes).unwrap();
//! assert_eq!(dec.next_token().unwrap(), Token::StartObject);
//! assert_eq!(dec.next_token().unwrap(), Token::PropertyName("a".to_string()));
//! assert_eq!(dec.next_token().unwrap(), Token::IntValue(1, IntWidth::W32));
//! assert_eq!(dec.next_token().unwrap(), Token::EndObject);
//! assert_eq!(dec.next_token().unwrap(), Token::EndOfInput);
//! ```
//!
//! Decoding is strictly forward: there is exactly one current token at a
//! time, no rewind, and no lookahead beyond the token being decoded. Any
//! malformed input, truncated or otherwise corrupt, terminates the parse
//! with a typed [`DecodeError`](crate::errors::DecodeError), never a panic
//! or an out-of-bounds access.
//!
//! # Specification
//!
//! This section describes the TOKSON wire format.
//!
//! ## Signature
//!
//! Every stream starts with the four bytes `B5 54 4B 01` (`0xB5`, `'T'`,
//! `'K'`, format version 1). The first signature byte may re-appear where a
//! value is expected; the decoder treats it as a reset marker, re-validates
//! the remaining signature bytes, and clears its symbol table.
//!
//! ## Tags
//!
//! The first byte of every item is called the *tag*. The first 3 bits of the
//! tag are called the *type*, with the remaining 5 bits being *metadata*.
//!
//! | Type  | Semantics                     |
//! | ---   | ---                           |
//! | `000` | constants and structure       |
//! | `001` | integers                      |
//! | `010` | string values                 |
//! | `011` | property-name definitions     |
//! | `100` | property-name back-references |
//! | `101` | floats                        |
//!
//! ## Constants and structure
//!
//! | Metadata | Semantics          |
//! | ---      | ---                |
//! | `00000`  | `null`             |
//! | `00001`  | `true`             |
//! | `00010`  | `false`            |
//! | `00011`  | start of object    |
//! | `00100`  | end of object      |
//! | `00101`  | start of array     |
//! | `00110`  | end of array       |
//! | `00111`  | chunked string     |
//! | `01000`  | binary: VInt length, then raw bytes |
//! | `01001`  | big integer, non-negative           |
//! | `01010`  | big integer, negative               |
//! | `01011`  | big decimal        |
//!
//! Big integers carry a VInt byte length followed by a little-endian
//! magnitude; negative values store `-(n + 1)` where `n` is the magnitude.
//! Big decimals carry a zigzag VInt scale, a sign byte (0 or 1), a VInt
//! length, and the little-endian unscaled magnitude.
//!
//! ## Integers
//!
//! When metadata bit 4 is clear, the low 4 bits are a zigzag-encoded tiny
//! literal covering `-8..=7`. Metadata `10000` and `10001` announce a zigzag
//! VInt payload bounded to 32 and 64 bits respectively.
//!
//! ## Strings and names
//!
//! Metadata `0..=30` is the byte length inline; metadata 31 means a VInt
//! length follows. Name definitions append the decoded text to the symbol
//! table; a back-reference tag replays an earlier name by table index
//! (inline for indices `0..=30`, VInt otherwise).
//!
//! ## Chunked strings
//!
//! After the chunked-string tag come zero or more fragments, each introduced
//! by the marker byte `0x1C` with a VInt byte length, terminated by the
//! marker `0x1D`. UTF-8 codepoints may straddle fragment boundaries; the
//! assembled bytes are validated as one run.
//!
//! ## VInts
//!
//! Variable-length integers use 7 data bits per byte with the high bit as a
//! continuation flag, least-significant group first. Signed values are
//! zigzag-mapped (even for non-negative, odd for negative) before encoding.
//! Encoders emit the minimal number of bytes.
//!
//! ## Floats
//!
//! | Metadata | Semantics                     |
//! | ---      | ---                           |
//! | `00000`  | half precision, 2 bytes LE    |
//! | `00001`  | single precision, 4 bytes LE  |
//! | `00010`  | double precision, 8 bytes LE  |
//!
//! Half-precision values widen to single precision on decode.

#![warn(
    deprecated_in_future,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]

pub mod encoding;
pub mod errors;
pub mod pool;
pub mod prelude;
pub mod source;
pub mod symbols;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::errors::DecodeError;

/// Width hint attached to an [`IntValue`](Token::IntValue) token, recording
/// which integer encoding the value travelled in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// Tiny literal or 32-bit VInt.
    W32,
    /// 64-bit VInt.
    W64,
}

/// The kind of an open container frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// An object: alternating property names and values.
    Object,
    /// An array: a plain sequence of values.
    Array,
}

/// One unit of the decoded stream.
///
/// A decode session produces these strictly in order; [`Token::EndOfInput`]
/// is produced (repeatedly, without error) once the source is exhausted at a
/// clean top-level boundary.
///
/// # Example
///
/// ```
/// use tokson::Token;
///
/// let t = Token::from("hello");
///
/// let val = match t {
///     Token::StringValue(s) => s,
///     _ => panic!(),
/// };
///
/// assert_eq!(val, "hello");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Start of an object.
    StartObject,
    /// End of an object.
    EndObject,
    /// Start of an array.
    StartArray,
    /// End of an array.
    EndArray,
    /// A property name inside an object.
    PropertyName(String),
    /// A string value.
    StringValue(String),
    /// An integer value with the width it was encoded at.
    IntValue(i64, IntWidth),
    /// A single-precision float value.
    FloatValue(f32),
    /// A double-precision float value.
    DoubleValue(f64),
    /// An arbitrary-precision integer value.
    BigIntValue(BigInt),
    /// An arbitrary-precision decimal value, `unscaled * 10^(-scale)`.
    BigDecimalValue {
        /// The unscaled integer.
        unscaled: BigInt,
        /// The decimal scale.
        scale: i64,
    },
    /// A boolean value.
    BooleanValue(bool),
    /// A null value.
    NullValue,
    /// An embedded binary value.
    EmbeddedBinary(Bytes),
    /// The source is exhausted at a top-level boundary.
    EndOfInput,
}

use Token::*;

impl Token {
    /// A short, stable description of the token kind, used in error
    /// messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StartObject => "start-object",
            EndObject => "end-object",
            StartArray => "start-array",
            EndArray => "end-array",
            PropertyName(_) => "property name",
            StringValue(_) => "string value",
            IntValue(..) => "integer value",
            FloatValue(_) => "float value",
            DoubleValue(_) => "double value",
            BigIntValue(_) => "big integer value",
            BigDecimalValue { .. } => "big decimal value",
            BooleanValue(_) => "boolean value",
            NullValue => "null value",
            EmbeddedBinary(_) => "binary value",
            EndOfInput => "end of input",
        }
    }

    /// Indicates whether the token is a scalar value, as opposed to a
    /// structural token, a property name, or end of input.
    pub fn is_scalar(&self) -> bool {
        match self {
            StringValue(_) | IntValue(..) | FloatValue(_) | DoubleValue(_) | BigIntValue(_)
            | BigDecimalValue { .. } | BooleanValue(_) | NullValue | EmbeddedBinary(_) => true,
            _ => false,
        }
    }

    /// Borrows the text of a [`StringValue`] or [`PropertyName`].
    ///
    /// # Example
    ///
    /// ```
    /// use tokson::Token;
    ///
    /// assert_eq!(Token::from("foo").as_str().unwrap(), "foo");
    /// assert!(Token::NullValue.as_str().is_err());
    /// ```
    pub fn as_str(&self) -> Result<&str, DecodeError> {
        match self {
            StringValue(s) | PropertyName(s) => Ok(s),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "string value or property name",
            }),
        }
    }

    /// Returns the integer of an [`IntValue`].
    pub fn as_i64(&self) -> Result<i64, DecodeError> {
        match self {
            IntValue(i, _) => Ok(*i),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "integer value",
            }),
        }
    }

    /// Returns the float of a [`FloatValue`].
    pub fn as_f32(&self) -> Result<f32, DecodeError> {
        match self {
            FloatValue(f) => Ok(*f),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "float value",
            }),
        }
    }

    /// Returns the double of a [`DoubleValue`].
    pub fn as_f64(&self) -> Result<f64, DecodeError> {
        match self {
            DoubleValue(f) => Ok(*f),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "double value",
            }),
        }
    }

    /// Returns the boolean of a [`BooleanValue`].
    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self {
            BooleanValue(b) => Ok(*b),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "boolean value",
            }),
        }
    }

    /// Borrows the payload of an [`EmbeddedBinary`].
    pub fn as_binary(&self) -> Result<&Bytes, DecodeError> {
        match self {
            EmbeddedBinary(b) => Ok(b),
            other => Err(DecodeError::UnexpectedToken {
                found: other.kind(),
                expected: "binary value",
            }),
        }
    }
}

impl From<bool> for Token {
    fn from(b: bool) -> Token { BooleanValue(b) }
}

impl From<i32> for Token {
    fn from(i: i32) -> Token { IntValue(i as i64, IntWidth::W32) }
}

impl From<i64> for Token {
    fn from(i: i64) -> Token { IntValue(i, IntWidth::W64) }
}

impl From<f32> for Token {
    fn from(f: f32) -> Token { FloatValue(f) }
}

impl From<f64> for Token {
    fn from(f: f64) -> Token { DoubleValue(f) }
}

impl From<&str> for Token {
    fn from(s: &str) -> Token { StringValue(s.to_string()) }
}

impl From<String> for Token {
    fn from(s: String) -> Token { StringValue(s) }
}

impl From<BigInt> for Token {
    fn from(i: BigInt) -> Token { BigIntValue(i) }
}

impl From<Bytes> for Token {
    fn from(b: Bytes) -> Token { EmbeddedBinary(b) }
}

impl From<Vec<u8>> for Token {
    fn from(v: Vec<u8>) -> Token { EmbeddedBinary(Bytes::from(v)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_tests() {
        assert!(Token::from(5i32).is_scalar());
        assert!(!StartObject.is_scalar());

        assert_eq!(Token::from(true).as_bool().unwrap(), true);
        assert_eq!(Token::from(-3i64).as_i64().unwrap(), -3);
        assert_eq!(Token::from("word").as_str().unwrap(), "word");
        assert_eq!(
            Token::from(vec![1u8, 2, 3]).as_binary().unwrap(),
            &Bytes::from(vec![1u8, 2, 3])
        );
    }

    #[test]
    fn wrong_kind_accessors_fail_fast() {
        let t = Token::from(1i32);
        assert!(t.as_str().is_err());
        assert!(t.as_bool().is_err());
        assert!(t.as_binary().is_err());
        assert!(NullValue.as_i64().is_err());
    }
}
