//! The usual imports for working with TOKSON streams.

pub use crate::{
    encoding::{decode_tokens, encode_tokens, TokenDecoder, TokenEncoder},
    errors::{DecodeError, GenerationError},
    pool::{CodecPool, Session},
    source::{BufferSource, ByteSource, StreamSource},
    symbols::SymbolTable,
    ContainerKind, IntWidth, Token,
};
pub use bytes::Bytes;
pub use half::f16;
pub use num_bigint::BigInt;
pub use num_traits::Num;
