//! The token encoder.

use super::{constants::*, vint};
use crate::{
    errors::GenerationError,
    pool::Session,
    symbols::SymbolTable,
    ContainerKind, IntWidth, Token,
};
use half::f16;
use num_bigint::{BigInt, Sign};
use smallvec::SmallVec;
use ContainerKind::*;

/// Builds a TOKSON byte stream from token-level write calls.
///
/// The encoder mirrors the decoder's structural state machine and rejects
/// out-of-context writes with a [`GenerationError`], so a stream it emits
/// without error is always well-formed. Property names are interned; a
/// repeated name is written as a back-reference.
///
/// # Example
///
/// ```
/// use tokson::encoding::TokenEncoder;
///
/// let mut enc = TokenEncoder::new();
/// enc.write_start_array().unwrap();
/// enc.write_str("hi").unwrap();
/// enc.write_null().unwrap();
/// enc.write_end_array().unwrap();
/// let bytes = enc.finish().unwrap();
/// assert_eq!(&bytes[..4], &[0xb5, 0x54, 0x4b, 0x01]);
/// ```
#[derive(Debug)]
pub struct TokenEncoder {
    out: Vec<u8>,
    symbols: SymbolTable,
    stack: SmallVec<[ContainerKind; 16]>,
    expect_name: bool,
    scratch: Vec<u8>,
}

impl Default for TokenEncoder {
    fn default() -> TokenEncoder { TokenEncoder::new() }
}

impl TokenEncoder {
    /// Creates an encoder and writes the stream signature.
    pub fn new() -> TokenEncoder { TokenEncoder::with_session(Session::new()) }

    /// Creates an encoder with recycled per-stream state.
    pub fn with_session(mut session: Session) -> TokenEncoder {
        session.reset();
        let mut enc = TokenEncoder {
            out: Vec::new(),
            symbols: session.symbols,
            stack: SmallVec::new(),
            expect_name: false,
            scratch: session.scratch,
        };
        enc.out.extend_from_slice(&SIGNATURE);
        enc
    }

    /// The nesting depth of open containers.
    pub fn depth(&self) -> usize { self.stack.len() }

    /// The number of bytes emitted so far.
    pub fn position(&self) -> usize { self.out.len() }

    /// Finalizes the stream.
    pub fn finish(self) -> Result<Vec<u8>, GenerationError> {
        if !self.stack.is_empty() {
            return Err(GenerationError::UnclosedContainer {
                depth: self.stack.len(),
            });
        }
        Ok(self.out)
    }

    /// Finalizes the stream and gives the per-stream state back for
    /// pooling.
    pub fn finish_session(self) -> Result<(Vec<u8>, Session), GenerationError> {
        if !self.stack.is_empty() {
            return Err(GenerationError::UnclosedContainer {
                depth: self.stack.len(),
            });
        }
        let session = Session {
            symbols: self.symbols,
            scratch: self.scratch,
        };
        Ok((self.out, session))
    }

    fn check_value(&self, actual: &'static str) -> Result<(), GenerationError> {
        if self.expect_name {
            return Err(GenerationError::OutOfContext {
                expected: "property name",
                actual,
            });
        }
        Ok(())
    }

    fn value_written(&mut self) {
        self.expect_name = self.stack.last() == Some(&Object);
    }

    /// Writes a property name, as a definition on first use and a
    /// back-reference afterwards.
    pub fn write_name(&mut self, name: &str) -> Result<(), GenerationError> {
        if !self.expect_name {
            return Err(GenerationError::OutOfContext {
                expected: "property value",
                actual: "property name",
            });
        }
        let (index, seen) = self.symbols.intern(name);
        if seen {
            let index = index as u64;
            if index < LEN_ESCAPE as u64 {
                self.out.push(TYPE_REF | index as u8);
            } else {
                self.out.push(TYPE_REF | LEN_ESCAPE);
                vint::write_u64(&mut self.out, index);
            }
        } else {
            self.put_text(TYPE_NAME, name);
        }
        self.expect_name = false;
        Ok(())
    }

    /// Writes a `null`.
    pub fn write_null(&mut self) -> Result<(), GenerationError> {
        self.check_value("null value")?;
        self.out.push(CON_NULL);
        self.value_written();
        Ok(())
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, b: bool) -> Result<(), GenerationError> {
        self.check_value("boolean value")?;
        self.out.push(if b { CON_TRUE } else { CON_FALSE });
        self.value_written();
        Ok(())
    }

    /// Writes a 32-bit integer, as a tiny literal when it fits.
    pub fn write_i32(&mut self, i: i32) -> Result<(), GenerationError> {
        self.check_value("integer value")?;
        if i >= -8 && i <= 7 {
            self.out.push(TYPE_INT | vint::zigzag32(i) as u8);
        } else {
            self.out.push(INT_VINT32);
            vint::write_i32(&mut self.out, i);
        }
        self.value_written();
        Ok(())
    }

    /// Writes a 64-bit integer.
    pub fn write_i64(&mut self, i: i64) -> Result<(), GenerationError> {
        self.check_value("integer value")?;
        self.out.push(INT_VINT64);
        vint::write_i64(&mut self.out, i);
        self.value_written();
        Ok(())
    }

    /// Writes a half-precision float.
    pub fn write_f16(&mut self, f: f16) -> Result<(), GenerationError> {
        self.check_value("float value")?;
        self.out.push(FLOAT_HALF);
        self.out.extend_from_slice(&f.to_bits().to_le_bytes());
        self.value_written();
        Ok(())
    }

    /// Writes a single-precision float.
    pub fn write_f32(&mut self, f: f32) -> Result<(), GenerationError> {
        self.check_value("float value")?;
        self.out.push(FLOAT_SINGLE);
        self.out.extend_from_slice(&f.to_bits().to_le_bytes());
        self.value_written();
        Ok(())
    }

    /// Writes a double-precision float.
    pub fn write_f64(&mut self, f: f64) -> Result<(), GenerationError> {
        self.check_value("double value")?;
        self.out.push(FLOAT_DOUBLE);
        self.out.extend_from_slice(&f.to_bits().to_le_bytes());
        self.value_written();
        Ok(())
    }

    /// Writes a string value in one piece.
    pub fn write_str(&mut self, s: &str) -> Result<(), GenerationError> {
        self.check_value("string value")?;
        self.put_text(TYPE_STR, s);
        self.value_written();
        Ok(())
    }

    /// Writes a string value as a chunked sequence of fragments.
    ///
    /// Fragment boundaries need not respect codepoint boundaries on the
    /// wire, but each fragment passed here is already valid UTF-8, so the
    /// assembled value always is too.
    pub fn write_chunked<'a, I>(&mut self, fragments: I) -> Result<(), GenerationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.check_value("string value")?;
        self.out.push(CON_CHUNKED);
        for frag in fragments {
            self.out.push(CHUNK_MORE);
            vint::write_u64(&mut self.out, frag.len() as u64);
            self.out.extend_from_slice(frag.as_bytes());
        }
        self.out.push(CHUNK_END);
        self.value_written();
        Ok(())
    }

    /// Writes an embedded binary value.
    pub fn write_binary(&mut self, bytes: &[u8]) -> Result<(), GenerationError> {
        self.check_value("binary value")?;
        self.out.push(CON_BINARY);
        vint::write_u64(&mut self.out, bytes.len() as u64);
        self.out.extend_from_slice(bytes);
        self.value_written();
        Ok(())
    }

    /// Writes an arbitrary-precision integer.
    pub fn write_bigint(&mut self, i: &BigInt) -> Result<(), GenerationError> {
        self.check_value("big integer value")?;
        if i.sign() == Sign::Minus {
            self.out.push(CON_BIGINT_NEG);
            let magnitude = -i - BigInt::from(1);
            self.put_magnitude(&magnitude);
        } else {
            self.out.push(CON_BIGINT_POS);
            self.put_magnitude(i);
        }
        self.value_written();
        Ok(())
    }

    /// Writes an arbitrary-precision decimal, `unscaled * 10^(-scale)`.
    pub fn write_bigdecimal(&mut self, unscaled: &BigInt, scale: i64) -> Result<(), GenerationError> {
        self.check_value("big decimal value")?;
        self.out.push(CON_BIGDEC);
        vint::write_i64(&mut self.out, scale);
        if unscaled.sign() == Sign::Minus {
            self.out.push(1);
            self.put_magnitude(&-unscaled);
        } else {
            self.out.push(0);
            self.put_magnitude(unscaled);
        }
        self.value_written();
        Ok(())
    }

    /// Opens an object.
    pub fn write_start_object(&mut self) -> Result<(), GenerationError> {
        self.check_value("start-object")?;
        self.out.push(CON_START_OBJ);
        self.stack.push(Object);
        self.expect_name = true;
        Ok(())
    }

    /// Closes the innermost object.
    pub fn write_end_object(&mut self) -> Result<(), GenerationError> {
        match self.stack.last() {
            Some(Object) if self.expect_name => {
                self.out.push(CON_END_OBJ);
                self.stack.pop();
                self.value_written();
                Ok(())
            }
            Some(Object) => Err(GenerationError::OutOfContext {
                expected: "property value",
                actual: "end-object",
            }),
            Some(Array) => Err(GenerationError::OutOfContext {
                expected: "end-array",
                actual: "end-object",
            }),
            None => Err(GenerationError::OutOfContext {
                expected: "a value",
                actual: "end-object",
            }),
        }
    }

    /// Opens an array.
    pub fn write_start_array(&mut self) -> Result<(), GenerationError> {
        self.check_value("start-array")?;
        self.out.push(CON_START_ARR);
        self.stack.push(Array);
        self.expect_name = false;
        Ok(())
    }

    /// Closes the innermost array.
    pub fn write_end_array(&mut self) -> Result<(), GenerationError> {
        match self.stack.last() {
            Some(Array) => {
                self.out.push(CON_END_ARR);
                self.stack.pop();
                self.value_written();
                Ok(())
            }
            Some(Object) => Err(GenerationError::OutOfContext {
                expected: if self.expect_name { "property name" } else { "property value" },
                actual: "end-array",
            }),
            None => Err(GenerationError::OutOfContext {
                expected: "a value",
                actual: "end-array",
            }),
        }
    }

    /// Re-emits the signature mid-stream and forgets all interned names.
    ///
    /// Only legal between top-level values.
    pub fn write_reset(&mut self) -> Result<(), GenerationError> {
        if !self.stack.is_empty() {
            return Err(GenerationError::OutOfContext {
                expected: "a top-level boundary",
                actual: "stream reset",
            });
        }
        self.out.extend_from_slice(&SIGNATURE);
        self.symbols.reset();
        Ok(())
    }

    /// Writes one decoded token back out.
    pub fn write_token(&mut self, token: &Token) -> Result<(), GenerationError> {
        match token {
            Token::StartObject => self.write_start_object(),
            Token::EndObject => self.write_end_object(),
            Token::StartArray => self.write_start_array(),
            Token::EndArray => self.write_end_array(),
            Token::PropertyName(s) => self.write_name(s),
            Token::StringValue(s) => self.write_str(s),
            Token::IntValue(i, IntWidth::W32) => {
                if *i < i64::from(i32::min_value()) || *i > i64::from(i32::max_value()) {
                    return Err(GenerationError::IntOutOfRange { value: *i });
                }
                self.write_i32(*i as i32)
            }
            Token::IntValue(i, IntWidth::W64) => self.write_i64(*i),
            Token::FloatValue(f) => self.write_f32(*f),
            Token::DoubleValue(f) => self.write_f64(*f),
            Token::BigIntValue(i) => self.write_bigint(i),
            Token::BigDecimalValue { unscaled, scale } => self.write_bigdecimal(unscaled, *scale),
            Token::BooleanValue(b) => self.write_bool(*b),
            Token::NullValue => self.write_null(),
            Token::EmbeddedBinary(b) => self.write_binary(b),
            Token::EndOfInput => Err(GenerationError::OutOfContext {
                expected: "a writable token",
                actual: "end of input",
            }),
        }
    }

    /// Emits a text tag with an inline or escaped length, then the bytes.
    fn put_text(&mut self, type_bits: u8, s: &str) {
        let len = s.len();
        if len < LEN_ESCAPE as usize {
            self.out.push(type_bits | len as u8);
        } else {
            self.out.push(type_bits | LEN_ESCAPE);
            vint::write_u64(&mut self.out, len as u64);
        }
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Emits a VInt byte length and a little-endian magnitude.
    fn put_magnitude(&mut self, i: &BigInt) {
        let (_, bytes) = i.to_bytes_le();
        vint::write_u64(&mut self.out, bytes.len() as u64);
        self.out.extend_from_slice(&bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_ints_are_one_byte() {
        let mut enc = TokenEncoder::new();
        enc.write_i32(0).unwrap();
        enc.write_i32(-1).unwrap();
        enc.write_i32(7).unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(&bytes[4..], &[0b0010_0000, 0b0010_0001, 0b0010_1110]);
    }

    #[test]
    fn repeated_names_become_references() {
        let mut enc = TokenEncoder::new();
        enc.write_start_object().unwrap();
        enc.write_name("id").unwrap();
        enc.write_i32(1).unwrap();
        enc.write_end_object().unwrap();
        enc.write_start_object().unwrap();
        enc.write_name("id").unwrap();
        enc.write_i32(2).unwrap();
        enc.write_end_object().unwrap();
        let bytes = enc.finish().unwrap();

        // first use defines, second replays index 0
        assert_eq!(bytes[5], 0b0110_0010);
        assert_eq!(&bytes[6..8], b"id");
        assert_eq!(bytes[11], 0b1000_0000);
    }

    #[test]
    fn out_of_context_writes_are_rejected() {
        let mut enc = TokenEncoder::new();
        enc.write_start_object().unwrap();
        assert_eq!(
            enc.write_i32(3).unwrap_err(),
            GenerationError::OutOfContext {
                expected: "property name",
                actual: "integer value",
            }
        );
        enc.write_name("n").unwrap();
        assert!(enc.write_end_object().is_err());
        assert!(enc.write_end_array().is_err());
        assert!(enc.write_reset().is_err());
        enc.write_i32(3).unwrap();
        enc.write_end_object().unwrap();
        assert!(enc.finish().is_ok());
    }

    #[test]
    fn finish_rejects_open_containers() {
        let mut enc = TokenEncoder::new();
        enc.write_start_array().unwrap();
        assert_eq!(
            enc.finish().unwrap_err(),
            GenerationError::UnclosedContainer { depth: 1 }
        );
    }

    #[test]
    fn width_hints_are_honored() {
        let mut enc = TokenEncoder::new();
        assert_eq!(
            enc.write_token(&Token::IntValue(1 << 40, crate::IntWidth::W32))
                .unwrap_err(),
            GenerationError::IntOutOfRange { value: 1 << 40 }
        );
        enc.write_token(&Token::IntValue(5, crate::IntWidth::W64)).unwrap();
        let bytes = enc.finish().unwrap();
        assert_eq!(bytes[4], 0b0011_0001);
    }
}
