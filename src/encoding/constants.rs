//! Tag bytes and bit masks of the wire format.

/// 0xe0
pub(crate) const MASK_TYPE: u8 = 0b1110_0000;
/// 0x1f
pub(crate) const MASK_META: u8 = 0b0001_1111;

/// Constant and structural type bits, 0x00
pub(crate) const TYPE_CON: u8 = 0b0000_0000;
/// Integer type bits, 0x20
pub(crate) const TYPE_INT: u8 = 0b0010_0000;
/// String-value type bits, 0x40
pub(crate) const TYPE_STR: u8 = 0b0100_0000;
/// Name-definition type bits, 0x60
pub(crate) const TYPE_NAME: u8 = 0b0110_0000;
/// Name back-reference type bits, 0x80
pub(crate) const TYPE_REF: u8 = 0b1000_0000;
/// Float type bits, 0xa0
pub(crate) const TYPE_FLOAT: u8 = 0b1010_0000;

/// `null`
pub(crate) const CON_NULL: u8 = 0b0000_0000;
/// `true`
pub(crate) const CON_TRUE: u8 = 0b0000_0001;
/// `false`
pub(crate) const CON_FALSE: u8 = 0b0000_0010;
/// Start of object
pub(crate) const CON_START_OBJ: u8 = 0b0000_0011;
/// End of object
pub(crate) const CON_END_OBJ: u8 = 0b0000_0100;
/// Start of array
pub(crate) const CON_START_ARR: u8 = 0b0000_0101;
/// End of array
pub(crate) const CON_END_ARR: u8 = 0b0000_0110;
/// Start of a chunked string
pub(crate) const CON_CHUNKED: u8 = 0b0000_0111;
/// Embedded binary
pub(crate) const CON_BINARY: u8 = 0b0000_1000;
/// Non-negative big integer
pub(crate) const CON_BIGINT_POS: u8 = 0b0000_1001;
/// Negative big integer
pub(crate) const CON_BIGINT_NEG: u8 = 0b0000_1010;
/// Big decimal
pub(crate) const CON_BIGDEC: u8 = 0b0000_1011;

/// Chunk continuation marker, 0x1c. Not a valid tag.
pub(crate) const CHUNK_MORE: u8 = 0b0001_1100;
/// Chunk terminator marker, 0x1d. Not a valid tag.
pub(crate) const CHUNK_END: u8 = 0b0001_1101;

/// Wide-integer indicator bit, 0x10
pub(crate) const INT_WIDE_BIT: u8 = 0b0001_0000;
/// 32-bit VInt integer tag, 0x30
pub(crate) const INT_VINT32: u8 = TYPE_INT | INT_WIDE_BIT;
/// 64-bit VInt integer tag, 0x31
pub(crate) const INT_VINT64: u8 = TYPE_INT | INT_WIDE_BIT | 0b0000_0001;

/// Metadata value announcing a VInt length or index, 0x1f
pub(crate) const LEN_ESCAPE: u8 = 0b0001_1111;

/// Half-precision float tag
pub(crate) const FLOAT_HALF: u8 = TYPE_FLOAT;
/// Single-precision float tag
pub(crate) const FLOAT_SINGLE: u8 = TYPE_FLOAT | 0b0000_0001;
/// Double-precision float tag
pub(crate) const FLOAT_DOUBLE: u8 = TYPE_FLOAT | 0b0000_0010;

/// First signature byte, also the mid-stream reset marker
pub(crate) const SIG_0: u8 = 0xb5;
/// Second signature byte, `'T'`
pub(crate) const SIG_1: u8 = 0x54;
/// Third signature byte, `'K'`
pub(crate) const SIG_2: u8 = 0x4b;
/// Format version byte
pub(crate) const SIG_VERSION: u8 = 0x01;

/// The four-byte stream signature.
pub(crate) const SIGNATURE: [u8; 4] = [SIG_0, SIG_1, SIG_2, SIG_VERSION];

/// Longest name that takes the short-name decode path, in bytes.
pub(crate) const MAX_SHORT_NAME: usize = 64;
