use tokson::prelude::*;
use DecodeError::*;

const SIG: [u8; 4] = [0xb5, 0x54, 0x4b, 0x01];

fn with_sig(body: &[u8]) -> Vec<u8> {
    let mut v = SIG.to_vec();
    v.extend_from_slice(body);
    v
}

#[test]
fn every_truncated_prefix_fails_cleanly() {
    let bytes = encode_tokens(&[
        Token::StartObject,
        Token::PropertyName("items".to_string()),
        Token::StartArray,
        Token::IntValue(77777, IntWidth::W32),
        Token::StringValue("text".to_string()),
        Token::FloatValue(1.0),
        Token::EndArray,
        Token::PropertyName("blob".to_string()),
        Token::EmbeddedBinary(Bytes::from(vec![0u8; 20])),
        Token::EndObject,
    ])
    .unwrap();

    for cut in 0..bytes.len() {
        let result = decode_tokens(&bytes[..cut]);
        if cut == SIG.len() {
            // a bare signature is a complete, empty stream
            assert_eq!(result.unwrap(), vec![]);
        } else {
            assert!(result.is_err(), "prefix of {} bytes decoded", cut);
        }
    }

    assert!(decode_tokens(&bytes).is_ok());
}

#[test]
fn bad_signature_names_the_byte() {
    match decode_tokens(&[0xb5, 0x54, 0x00, 0x01]).unwrap_err() {
        BadSignature { found, offset, expected } => {
            assert_eq!(found, 0x00);
            assert_eq!(offset, 2);
            assert_eq!(expected, 0x4b);
        }
        other => panic!("wrong error: {}", other),
    }

    match decode_tokens(&[]).unwrap_err() {
        UnexpectedEndOfInput { decoding } => assert_eq!(decoding, "signature"),
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn truncated_utf8_in_a_string() {
    // declared length 3, but 0xe6 opens a sequence needing two more bytes
    let bytes = with_sig(&[0b0100_0011, b'a', 0xe6, 0x97]);
    let err = decode_tokens(&bytes).unwrap_err();
    assert_eq!(
        err.to_string(),
        "truncated UTF-8 in string: leading byte 0xe6 at offset 1 needs 1 more bytes"
    );
}

#[test]
fn truncated_utf8_in_a_short_name() {
    let bytes = with_sig(&[
        0b0000_0011, // start of object
        0b0110_0001, // name definition, length 1
        0xe6,
        0b0000_0000,
        0b0000_0100,
    ]);
    let err = decode_tokens(&bytes).unwrap_err();
    assert_eq!(
        err.to_string(),
        "truncated UTF-8 in short name: leading byte 0xe6 at offset 0 needs 2 more bytes"
    );
}

#[test]
fn invalid_continuation_byte() {
    let bytes = with_sig(&[0b0100_0010, 0xc3, 0x41]);
    match decode_tokens(&bytes).unwrap_err() {
        InvalidUtf8Continuation { byte, offset, .. } => {
            assert_eq!(byte, 0x41);
            assert_eq!(offset, 1);
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn huge_declared_length_fails_without_allocating() {
    // string claims ~2 GiB against a 7-byte buffer
    let mut bytes = with_sig(&[0b0101_1111]);
    bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0x07]); // VInt 0x7fffffff
    bytes.extend_from_slice(b"abcdefg");
    match decode_tokens(&bytes).unwrap_err() {
        UnexpectedEndOfInput { decoding } => assert_eq!(decoding, "string payload"),
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn back_reference_out_of_bounds() {
    let bytes = with_sig(&[
        0b0000_0011, // start of object
        0b1000_0101, // reference to index 5, nothing defined
    ]);
    match decode_tokens(&bytes).unwrap_err() {
        InvalidBackReference { index, len } => {
            assert_eq!(index, 5);
            assert_eq!(len, 0);
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn container_ends_must_match() {
    // end-object inside an array
    let bytes = with_sig(&[0b0000_0101, 0b0000_0100]);
    match decode_tokens(&bytes).unwrap_err() {
        MismatchedContainerEnd { found, context } => {
            assert_eq!(found, "end-object");
            assert_eq!(context, "inside an array");
        }
        other => panic!("wrong error: {}", other),
    }

    // end-array with nothing open
    let bytes = with_sig(&[0b0000_0110]);
    match decode_tokens(&bytes).unwrap_err() {
        MismatchedContainerEnd { found, context } => {
            assert_eq!(found, "end-array");
            assert_eq!(context, "with no open container");
        }
        other => panic!("wrong error: {}", other),
    }

    // end-array where an object wants a name
    let bytes = with_sig(&[0b0000_0011, 0b0000_0110]);
    match decode_tokens(&bytes).unwrap_err() {
        MismatchedContainerEnd { found, context } => {
            assert_eq!(found, "end-array");
            assert_eq!(context, "inside an object");
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn dangling_name_cannot_be_closed_over() {
    let bytes = with_sig(&[
        0b0000_0011, // start of object
        0b0110_0001, // name definition, length 1
        b'a',
        0b0000_0100, // end of object where the value belongs
    ]);
    match decode_tokens(&bytes).unwrap_err() {
        UnexpectedToken { found, expected } => {
            assert_eq!(found, "end-object");
            assert_eq!(expected, "property value");
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn value_tag_at_name_position() {
    let bytes = with_sig(&[
        0b0000_0011, // start of object
        0b0010_0010, // tiny int where a name belongs
    ]);
    match decode_tokens(&bytes).unwrap_err() {
        UnexpectedToken { found, expected } => {
            assert_eq!(found, "integer value");
            assert_eq!(expected, "property name");
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn stray_chunk_marker() {
    let bytes = with_sig(&[0b0000_0111, 0x42]);
    match decode_tokens(&bytes).unwrap_err() {
        MismatchedChunk { found } => assert_eq!(found, 0x42),
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn overlong_vint_is_rejected() {
    let mut bytes = with_sig(&[0b0011_0001]); // 64-bit VInt tag
    bytes.extend_from_slice(&[0xff; 10]);
    bytes.push(0x01);
    match decode_tokens(&bytes).unwrap_err() {
        MalformedVarInt { width } => assert_eq!(width, 64),
        other => panic!("wrong error: {}", other),
    }

    // 32-bit tag with a 64-bit payload
    let mut bytes = with_sig(&[0b0011_0000]);
    bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0x7f]);
    match decode_tokens(&bytes).unwrap_err() {
        MalformedVarInt { width } => assert_eq!(width, 32),
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn unknown_tags_are_rejected() {
    for &tag in &[0xc0u8, 0xc7, 0xe0, 0xff, 0b0000_1111, 0b0011_0010, 0b1010_0111] {
        let bytes = with_sig(&[tag]);
        match decode_tokens(&bytes).unwrap_err() {
            UnknownTag { tag: found } => assert_eq!(found, tag),
            other => panic!("wrong error for {:#04x}: {}", tag, other),
        }
    }
}

#[test]
fn big_decimal_sign_byte_must_be_zero_or_one() {
    let bytes = with_sig(&[
        0b0000_1011, // big decimal
        0x00,        // scale 0
        0x02,        // invalid sign byte
    ]);
    match decode_tokens(&bytes).unwrap_err() {
        UnexpectedToken { found, expected } => {
            assert_eq!(found, "sign byte");
            assert_eq!(expected, "0 or 1");
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn chunk_markers_are_not_tags() {
    for &tag in &[0x1cu8, 0x1d] {
        let bytes = with_sig(&[tag]);
        assert!(decode_tokens(&bytes).is_err());
    }
}

#[test]
fn corrupt_reset_is_a_bad_signature() {
    // 0xb5 at value position starts a reset, but the tail is wrong
    let bytes = with_sig(&[0xb5, 0x54, 0x4b, 0x99]);
    match decode_tokens(&bytes).unwrap_err() {
        BadSignature { found, offset, expected } => {
            assert_eq!(found, 0x99);
            assert_eq!(offset, 3);
            assert_eq!(expected, 0x01);
        }
        other => panic!("wrong error: {}", other),
    }
}

#[test]
fn eof_inside_a_container_is_an_error() {
    let bytes = with_sig(&[0b0000_0101, 0b0000_0000]); // [null, ...cut
    match decode_tokens(&bytes).unwrap_err() {
        UnexpectedEndOfInput { decoding } => assert_eq!(decoding, "value"),
        other => panic!("wrong error: {}", other),
    }
}
