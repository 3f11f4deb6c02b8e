//! Byte sources feeding the decoder.

use crate::errors::DecodeError;
use bytes::Bytes;
use std::io::{self, Read};

/// Cap on the up-front allocation for a declared payload length.
///
/// A stream source reads longer payloads incrementally so that a corrupt
/// length field cannot force a huge allocation before any bytes exist to
/// back it.
const ALLOC_CAP: usize = 0x1000;

/// Refill granularity for [`StreamSource`].
const CHUNK: usize = 0x2000;

/// A positioned supplier of bytes for a [`TokenDecoder`].
///
/// [`TokenDecoder`]: crate::encoding::TokenDecoder
///
/// All reads fail with [`DecodeError::UnexpectedEndOfInput`] naming the
/// field being decoded, so exhaustion mid-item and exhaustion at a clean
/// boundary are distinguishable by the caller.
pub trait ByteSource {
    /// Reads one byte, failing if the source is exhausted.
    fn read_byte(&mut self, what: &'static str) -> Result<u8, DecodeError>;

    /// Reads one byte, or `None` at a clean end of input.
    fn try_byte(&mut self) -> Result<Option<u8>, DecodeError>;

    /// Reads exactly `len` bytes.
    fn read_exact(&mut self, len: usize, what: &'static str) -> Result<Bytes, DecodeError>;

    /// Checks whether `n` more bytes can be read, without consuming any.
    fn ensure_available(&mut self, n: usize) -> Result<bool, DecodeError>;

    /// Discards exactly `n` bytes.
    fn skip(&mut self, n: usize, what: &'static str) -> Result<(), DecodeError>;

    /// The number of bytes consumed so far.
    fn position(&self) -> usize;
}

/// A source over a fully in-memory buffer.
///
/// Payload reads are zero-copy slices of the backing [`Bytes`]. Lengths are
/// checked against the remaining buffer before anything is materialized, so
/// a declared length in the gigabytes against a short buffer fails without
/// allocating.
#[derive(Clone, Debug)]
pub struct BufferSource {
    buf: Bytes,
    consumed: usize,
}

impl BufferSource {
    /// Wraps a buffer.
    pub fn new(buf: Bytes) -> BufferSource {
        BufferSource { buf, consumed: 0 }
    }

    fn remaining(&self) -> usize { self.buf.len() }
}

impl From<Bytes> for BufferSource {
    fn from(buf: Bytes) -> BufferSource { BufferSource::new(buf) }
}

impl From<Vec<u8>> for BufferSource {
    fn from(v: Vec<u8>) -> BufferSource { BufferSource::new(Bytes::from(v)) }
}

impl From<&[u8]> for BufferSource {
    fn from(s: &[u8]) -> BufferSource { BufferSource::new(Bytes::from(s)) }
}

impl ByteSource for BufferSource {
    fn read_byte(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        if self.remaining() == 0 {
            return Err(DecodeError::UnexpectedEndOfInput { decoding: what });
        }
        let byte = self.buf[0];
        self.buf.advance(1);
        self.consumed += 1;
        Ok(byte)
    }

    fn try_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let byte = self.buf[0];
        self.buf.advance(1);
        self.consumed += 1;
        Ok(Some(byte))
    }

    fn read_exact(&mut self, len: usize, what: &'static str) -> Result<Bytes, DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEndOfInput { decoding: what });
        }
        let out = self.buf.split_to(len);
        self.consumed += len;
        Ok(out)
    }

    fn ensure_available(&mut self, n: usize) -> Result<bool, DecodeError> {
        Ok(self.remaining() >= n)
    }

    fn skip(&mut self, n: usize, what: &'static str) -> Result<(), DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEndOfInput { decoding: what });
        }
        self.buf.advance(n);
        self.consumed += n;
        Ok(())
    }

    fn position(&self) -> usize { self.consumed }
}

/// A source over any [`io::Read`], with an internal refill buffer.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    consumed: usize,
    eof: bool,
}

impl<R: Read> StreamSource<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> StreamSource<R> {
        StreamSource {
            inner,
            buf: Vec::with_capacity(CHUNK),
            pos: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Unwraps the reader. Bytes already pulled into the refill buffer but
    /// not yet consumed are lost.
    pub fn into_inner(self) -> R { self.inner }

    fn buffered(&self) -> usize { self.buf.len() - self.pos }

    /// Pulls more bytes from the reader. Returns false at end of stream.
    fn refill(&mut self) -> Result<bool, DecodeError> {
        if self.eof {
            return Ok(false);
        }
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        let old_len = self.buf.len();
        self.buf.resize(old_len + CHUNK, 0);
        loop {
            match self.inner.read(&mut self.buf[old_len..]) {
                Ok(0) => {
                    self.buf.truncate(old_len);
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.buf.truncate(old_len + n);
                    return Ok(true);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(old_len);
                    return Err(DecodeError::Io(e));
                }
            }
        }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_byte(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        match self.try_byte()? {
            Some(b) => Ok(b),
            None => Err(DecodeError::UnexpectedEndOfInput { decoding: what }),
        }
    }

    fn try_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        if self.buffered() == 0 && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        self.consumed += 1;
        Ok(Some(byte))
    }

    fn read_exact(&mut self, len: usize, what: &'static str) -> Result<Bytes, DecodeError> {
        // grow toward len in bounded steps rather than trusting it up front
        let mut out = Vec::with_capacity(len.min(ALLOC_CAP));
        while out.len() < len {
            if self.buffered() == 0 && !self.refill()? {
                return Err(DecodeError::UnexpectedEndOfInput { decoding: what });
            }
            let take = (len - out.len()).min(self.buffered());
            out.extend_from_slice(&self.buf[self.pos..self.pos + take]);
            self.pos += take;
            self.consumed += take;
        }
        Ok(Bytes::from(out))
    }

    fn ensure_available(&mut self, n: usize) -> Result<bool, DecodeError> {
        while self.buffered() < n {
            if !self.refill()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn skip(&mut self, n: usize, what: &'static str) -> Result<(), DecodeError> {
        let mut left = n;
        while left > 0 {
            if self.buffered() == 0 && !self.refill()? {
                return Err(DecodeError::UnexpectedEndOfInput { decoding: what });
            }
            let take = left.min(self.buffered());
            self.pos += take;
            self.consumed += take;
            left -= take;
        }
        Ok(())
    }

    fn position(&self) -> usize { self.consumed }
}
