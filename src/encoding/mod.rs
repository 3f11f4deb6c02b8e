//! The TOKSON wire codec.
//!
//! [`TokenDecoder`] pulls tokens out of a [`ByteSource`]; [`TokenEncoder`]
//! writes them back. The free functions at this level cover the common
//! whole-buffer case.
//!
//! [`ByteSource`]: crate::source::ByteSource
//!
//! # Example
//!
//! ```
//! use tokson::encoding::{decode_tokens, encode_tokens};
//! use tokson::Token;
//!
//! let tokens = vec![
//!     Token::StartArray,
//!     Token::from("one"),
//!     Token::from(2i32),
//!     Token::EndArray,
//! ];
//!
//! let bytes = encode_tokens(&tokens).unwrap();
//! assert_eq!(decode_tokens(&bytes).unwrap(), tokens);
//! ```

mod constants;
pub mod de;
pub mod ser;
pub(crate) mod utf8;
pub(crate) mod vint;

pub use de::TokenDecoder;
pub use ser::TokenEncoder;

use crate::{
    errors::{DecodeError, GenerationError},
    Token,
};

/// Encodes a token sequence as one complete stream.
pub fn encode_tokens(tokens: &[Token]) -> Result<Vec<u8>, GenerationError> {
    let mut enc = TokenEncoder::new();
    for token in tokens {
        enc.write_token(token)?;
    }
    enc.finish()
}

/// Decodes a whole buffer to a token sequence.
///
/// The terminating [`Token::EndOfInput`] is not included in the output.
pub fn decode_tokens(bytes: &[u8]) -> Result<Vec<Token>, DecodeError> {
    let mut dec = TokenDecoder::from_slice(bytes)?;
    let mut out = Vec::new();
    loop {
        match dec.next_token()? {
            Token::EndOfInput => return Ok(out),
            token => out.push(token),
        }
    }
}
