//! The pull decoder.

use super::{constants::*, utf8, vint};
use crate::{
    errors::DecodeError,
    pool::Session,
    source::{BufferSource, ByteSource},
    symbols::SymbolTable,
    ContainerKind, IntWidth, Token,
};
use bytes::Bytes;
use half::f16;
use num_bigint::{BigInt, Sign};
use smallvec::SmallVec;
use ContainerKind::*;
use Token::*;

/// A pull-based decoder over a [`ByteSource`].
///
/// Construction validates the stream signature; afterwards each call to
/// [`next_token`](TokenDecoder::next_token) advances exactly one token.
/// Structural nesting is tracked on an internal stack, so mismatched
/// container ends and dangling property names are caught the moment their
/// tag is read. Once the source is exhausted at a top-level boundary the
/// decoder yields [`Token::EndOfInput`] on every further call.
#[derive(Debug)]
pub struct TokenDecoder<S> {
    source: S,
    symbols: SymbolTable,
    stack: SmallVec<[ContainerKind; 16]>,
    expect_name: bool,
    ended: bool,
    current: Option<Token>,
    scratch: Vec<u8>,
}

impl TokenDecoder<BufferSource> {
    /// Starts decoding an in-memory buffer.
    pub fn from_slice(bytes: &[u8]) -> Result<TokenDecoder<BufferSource>, DecodeError> {
        TokenDecoder::new(BufferSource::from(bytes))
    }

    /// Starts decoding an owned buffer.
    pub fn from_bytes(bytes: Bytes) -> Result<TokenDecoder<BufferSource>, DecodeError> {
        TokenDecoder::new(BufferSource::from(bytes))
    }
}

impl<S: ByteSource> TokenDecoder<S> {
    /// Starts decoding `source`, validating the signature.
    pub fn new(source: S) -> Result<TokenDecoder<S>, DecodeError> {
        TokenDecoder::with_session(source, Session::new())
    }

    /// Starts decoding `source` with recycled per-stream state.
    pub fn with_session(source: S, mut session: Session) -> Result<TokenDecoder<S>, DecodeError> {
        session.reset();
        let mut dec = TokenDecoder {
            source,
            symbols: session.symbols,
            stack: SmallVec::new(),
            expect_name: false,
            ended: false,
            current: None,
            scratch: session.scratch,
        };
        dec.read_signature(0)?;
        Ok(dec)
    }

    /// Gives the per-stream state back for pooling.
    pub fn into_session(self) -> Session {
        Session {
            symbols: self.symbols,
            scratch: self.scratch,
        }
    }

    /// The token most recently produced, if any.
    pub fn current_token(&self) -> Option<&Token> { self.current.as_ref() }

    /// The nesting depth of open containers.
    pub fn depth(&self) -> usize { self.stack.len() }

    /// The number of bytes consumed so far.
    pub fn position(&self) -> usize { self.source.position() }

    /// Borrows the text of the current token.
    pub fn current_str(&self) -> Result<&str, DecodeError> {
        self.require_current()?.as_str()
    }

    /// The integer of the current token.
    pub fn current_i64(&self) -> Result<i64, DecodeError> {
        self.require_current()?.as_i64()
    }

    /// The float of the current token.
    pub fn current_f32(&self) -> Result<f32, DecodeError> {
        self.require_current()?.as_f32()
    }

    /// The double of the current token.
    pub fn current_f64(&self) -> Result<f64, DecodeError> {
        self.require_current()?.as_f64()
    }

    /// The boolean of the current token.
    pub fn current_bool(&self) -> Result<bool, DecodeError> {
        self.require_current()?.as_bool()
    }

    /// The binary payload of the current token.
    pub fn current_binary(&self) -> Result<&Bytes, DecodeError> {
        self.require_current()?.as_binary()
    }

    fn require_current(&self) -> Result<&Token, DecodeError> {
        self.current.as_ref().ok_or(DecodeError::UnexpectedToken {
            found: "no token yet",
            expected: "a decoded token",
        })
    }

    /// Advances to the next token.
    pub fn next_token(&mut self) -> Result<Token, DecodeError> {
        if self.ended {
            self.current = Some(EndOfInput);
            return Ok(EndOfInput);
        }
        let token = if self.expect_name {
            self.next_name()?
        } else {
            self.next_value()?
        };
        self.current = Some(token.clone());
        Ok(token)
    }

    /// Validates signature bytes starting at `from`.
    fn read_signature(&mut self, from: usize) -> Result<(), DecodeError> {
        for offset in from..SIGNATURE.len() {
            let found = self.source.read_byte("signature")?;
            let expected = SIGNATURE[offset];
            if found != expected {
                return Err(DecodeError::BadSignature {
                    found,
                    offset,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Sets the name/value expectation after a completed value.
    fn after_value(&mut self) {
        self.expect_name = self.stack.last() == Some(&Object);
    }

    fn next_name(&mut self) -> Result<Token, DecodeError> {
        let byte = self.source.read_byte("property name")?;
        match byte & MASK_TYPE {
            TYPE_CON if byte == CON_END_OBJ => {
                self.stack.pop();
                self.after_value();
                Ok(EndObject)
            }
            TYPE_CON if byte == CON_END_ARR => Err(DecodeError::MismatchedContainerEnd {
                found: "end-array",
                context: "inside an object",
            }),
            TYPE_NAME => {
                let name = self.read_defined_name(byte)?;
                self.symbols.define(name.clone());
                self.expect_name = false;
                Ok(PropertyName(name))
            }
            TYPE_REF => {
                let meta = byte & MASK_META;
                let index = if meta == LEN_ESCAPE {
                    vint::read_u64(&mut self.source, "name reference")?
                } else {
                    meta as u64
                };
                let name = self.symbols.resolve(index)?.to_owned();
                self.expect_name = false;
                Ok(PropertyName(name))
            }
            _ => Err(DecodeError::UnexpectedToken {
                found: tag_class(byte),
                expected: "property name",
            }),
        }
    }

    fn next_value(&mut self) -> Result<Token, DecodeError> {
        loop {
            let byte = match self.source.try_byte()? {
                Some(b) => b,
                None => {
                    if self.stack.is_empty() {
                        self.ended = true;
                        return Ok(EndOfInput);
                    }
                    return Err(DecodeError::UnexpectedEndOfInput { decoding: "value" });
                }
            };

            // a repeated header at value position is a stream reset
            if byte == SIG_0 {
                self.read_signature(1)?;
                self.symbols.reset();
                continue;
            }

            return match byte & MASK_TYPE {
                TYPE_CON => self.decode_constant(byte),
                TYPE_INT => self.decode_int(byte),
                TYPE_STR => {
                    let len = self.read_length(byte, "string length")?;
                    let payload = self.source.read_exact(len, "string payload")?;
                    let text = utf8::decode_text(&payload)?;
                    self.after_value();
                    Ok(StringValue(text))
                }
                TYPE_FLOAT => self.decode_float(byte),
                TYPE_NAME | TYPE_REF => Err(DecodeError::UnexpectedToken {
                    found: tag_class(byte),
                    expected: "property value",
                }),
                _ => Err(DecodeError::UnknownTag { tag: byte }),
            };
        }
    }

    fn decode_constant(&mut self, byte: u8) -> Result<Token, DecodeError> {
        match byte {
            CON_NULL => {
                self.after_value();
                Ok(NullValue)
            }
            CON_TRUE => {
                self.after_value();
                Ok(BooleanValue(true))
            }
            CON_FALSE => {
                self.after_value();
                Ok(BooleanValue(false))
            }
            CON_START_OBJ => {
                self.stack.push(Object);
                self.expect_name = true;
                Ok(StartObject)
            }
            CON_START_ARR => {
                self.stack.push(Array);
                self.expect_name = false;
                Ok(StartArray)
            }
            CON_END_OBJ => match self.stack.last() {
                // value position inside an object means a name was just read
                Some(Object) => Err(DecodeError::UnexpectedToken {
                    found: "end-object",
                    expected: "property value",
                }),
                Some(Array) => Err(DecodeError::MismatchedContainerEnd {
                    found: "end-object",
                    context: "inside an array",
                }),
                None => Err(DecodeError::MismatchedContainerEnd {
                    found: "end-object",
                    context: "with no open container",
                }),
            },
            CON_END_ARR => match self.stack.last() {
                Some(Array) => {
                    self.stack.pop();
                    self.after_value();
                    Ok(EndArray)
                }
                Some(Object) => Err(DecodeError::MismatchedContainerEnd {
                    found: "end-array",
                    context: "inside an object",
                }),
                None => Err(DecodeError::MismatchedContainerEnd {
                    found: "end-array",
                    context: "with no open container",
                }),
            },
            CON_CHUNKED => {
                let text = self.decode_chunked()?;
                self.after_value();
                Ok(StringValue(text))
            }
            CON_BINARY => {
                let len = vint::read_len(&mut self.source, "binary length")?;
                let payload = self.source.read_exact(len, "binary payload")?;
                self.after_value();
                Ok(EmbeddedBinary(payload))
            }
            CON_BIGINT_POS => {
                let magnitude = self.read_magnitude("big integer")?;
                self.after_value();
                Ok(BigIntValue(magnitude))
            }
            CON_BIGINT_NEG => {
                let magnitude = self.read_magnitude("big integer")?;
                self.after_value();
                Ok(BigIntValue(-magnitude - BigInt::from(1)))
            }
            CON_BIGDEC => {
                let scale = vint::read_i64(&mut self.source, "big decimal scale")?;
                let sign = self.source.read_byte("big decimal sign")?;
                if sign > 1 {
                    return Err(DecodeError::UnexpectedToken {
                        found: "sign byte",
                        expected: "0 or 1",
                    });
                }
                let magnitude = self.read_magnitude("big decimal")?;
                let unscaled = if sign == 1 { -magnitude } else { magnitude };
                self.after_value();
                Ok(BigDecimalValue { unscaled, scale })
            }
            _ => Err(DecodeError::UnknownTag { tag: byte }),
        }
    }

    /// Reads a VInt byte length and a little-endian magnitude.
    fn read_magnitude(&mut self, what: &'static str) -> Result<BigInt, DecodeError> {
        let len = vint::read_len(&mut self.source, what)?;
        let payload = self.source.read_exact(len, what)?;
        Ok(BigInt::from_bytes_le(Sign::Plus, &payload))
    }

    fn decode_int(&mut self, byte: u8) -> Result<Token, DecodeError> {
        let token = if byte & INT_WIDE_BIT == 0 {
            let tiny = vint::unzigzag32((byte & 0b0000_1111) as u32);
            IntValue(tiny as i64, IntWidth::W32)
        } else if byte == INT_VINT32 {
            let v = vint::read_i32(&mut self.source, "integer")?;
            IntValue(v as i64, IntWidth::W32)
        } else if byte == INT_VINT64 {
            let v = vint::read_i64(&mut self.source, "integer")?;
            IntValue(v, IntWidth::W64)
        } else {
            return Err(DecodeError::UnknownTag { tag: byte });
        };
        self.after_value();
        Ok(token)
    }

    fn decode_float(&mut self, byte: u8) -> Result<Token, DecodeError> {
        let token = match byte {
            FLOAT_HALF => {
                let raw = self.source.read_exact(2, "half float")?;
                let bits = u16::from(raw[0]) | u16::from(raw[1]) << 8;
                FloatValue(f16::from_bits(bits).to_f32())
            }
            FLOAT_SINGLE => {
                let raw = self.source.read_exact(4, "float")?;
                let mut bits: u32 = 0;
                for (i, &b) in raw.iter().enumerate() {
                    bits |= u32::from(b) << (8 * i);
                }
                FloatValue(f32::from_bits(bits))
            }
            FLOAT_DOUBLE => {
                let raw = self.source.read_exact(8, "double")?;
                let mut bits: u64 = 0;
                for (i, &b) in raw.iter().enumerate() {
                    bits |= u64::from(b) << (8 * i);
                }
                DoubleValue(f64::from_bits(bits))
            }
            _ => return Err(DecodeError::UnknownTag { tag: byte }),
        };
        self.after_value();
        Ok(token)
    }

    /// Assembles a chunked string, validating UTF-8 over the whole run so
    /// codepoints may straddle fragment boundaries.
    fn decode_chunked(&mut self) -> Result<String, DecodeError> {
        self.scratch.clear();
        loop {
            let marker = self.source.read_byte("chunk marker")?;
            match marker {
                CHUNK_MORE => {
                    let len = vint::read_len(&mut self.source, "chunk length")?;
                    let frag = self.source.read_exact(len, "chunk payload")?;
                    self.scratch.extend_from_slice(&frag);
                }
                CHUNK_END => break,
                other => return Err(DecodeError::MismatchedChunk { found: other }),
            }
        }
        utf8::decode_text(&self.scratch)
    }

    /// Reads the name payload of a definition tag.
    fn read_defined_name(&mut self, byte: u8) -> Result<String, DecodeError> {
        let len = self.read_length(byte, "name length")?;
        let payload = self.source.read_exact(len, "name payload")?;
        if len <= MAX_SHORT_NAME {
            utf8::decode_name(&payload)
        } else {
            utf8::decode_text(&payload)
        }
    }

    /// Inline metadata length, or a VInt when the metadata is the escape.
    fn read_length(&mut self, byte: u8, what: &'static str) -> Result<usize, DecodeError> {
        let meta = byte & MASK_META;
        if meta == LEN_ESCAPE {
            vint::read_len(&mut self.source, what)
        } else {
            Ok(meta as usize)
        }
    }
}

/// Describes a tag byte's type class for error messages.
fn tag_class(byte: u8) -> &'static str {
    match byte & MASK_TYPE {
        TYPE_CON => "constant or structural tag",
        TYPE_INT => "integer value",
        TYPE_STR => "string value",
        TYPE_NAME => "property name definition",
        TYPE_REF => "property name reference",
        TYPE_FLOAT => "float value",
        _ => "unknown tag",
    }
}
