//! Strict UTF-8 decoding with byte-precise errors.
//!
//! Both text paths, the short-name path and the general string path, decode
//! with `std::str::from_utf8` and only re-examine the payload when it fails.
//! The classifier picks the walk up at the reported offset so that a sequence
//! cut off by the declared length is reported as truncation at its leading
//! byte, distinct from a plain bad continuation byte.

use crate::errors::{DecodeError, TextPath};

/// Decodes a short property name.
pub(crate) fn decode_name(bytes: &[u8]) -> Result<String, DecodeError> {
    decode(bytes, TextPath::ShortName)
}

/// Decodes a general string payload.
pub(crate) fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
    decode(bytes, TextPath::Text)
}

fn decode(bytes: &[u8], path: TextPath) -> Result<String, DecodeError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => Err(classify(bytes, e.valid_up_to(), path)),
    }
}

/// Names the malformed sequence starting at `at`, the first offset the
/// standard decoder could not get past.
fn classify(bytes: &[u8], at: usize, path: TextPath) -> DecodeError {
    let lead = bytes.get(at).copied().unwrap_or(0);
    let needed = match lead {
        0xc2..=0xdf => 1,
        0xe0..=0xef => 2,
        0xf0..=0xf4 => 3,
        // bare continuation bytes, overlong leads, and out-of-range leads
        _ => {
            return DecodeError::InvalidUtf8Continuation {
                byte: lead,
                offset: at,
                path,
            };
        }
    };

    if at + needed >= bytes.len() {
        return DecodeError::TruncatedUtf8 {
            lead,
            offset: at,
            needed: needed - (bytes.len() - at - 1),
            path,
        };
    }

    for k in 1..=needed {
        let cont = bytes[at + k];
        let ok = match (k, lead) {
            // E0 excludes overlongs, ED excludes surrogates
            (1, 0xe0) => cont >= 0xa0 && cont <= 0xbf,
            (1, 0xed) => cont >= 0x80 && cont <= 0x9f,
            // F0 excludes overlongs, F4 caps at U+10FFFF
            (1, 0xf0) => cont >= 0x90 && cont <= 0xbf,
            (1, 0xf4) => cont >= 0x80 && cont <= 0x8f,
            _ => cont >= 0x80 && cont <= 0xbf,
        };
        if !ok {
            return DecodeError::InvalidUtf8Continuation {
                byte: cont,
                offset: at + k,
                path,
            };
        }
    }

    DecodeError::InvalidUtf8Continuation {
        byte: lead,
        offset: at,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed() {
        assert_eq!(decode_name(b"plain").unwrap(), "plain");
        assert_eq!(decode_name("héllo".as_bytes()).unwrap(), "héllo");
        assert_eq!(decode_text("日本語".as_bytes()).unwrap(), "日本語");
        assert_eq!(decode_text("🎉".as_bytes()).unwrap(), "🎉");
        assert_eq!(decode_text(&[]).unwrap(), "");
    }

    #[test]
    fn truncation_is_reported_at_the_lead() {
        // 0xe6 opens a three-byte sequence; only one continuation present
        let err = decode_text(&[b'a', 0xe6, 0x97]).unwrap_err();
        match err {
            DecodeError::TruncatedUtf8 { lead, offset, needed, path } => {
                assert_eq!(lead, 0xe6);
                assert_eq!(offset, 1);
                assert_eq!(needed, 1);
                assert_eq!(path, TextPath::Text);
            }
            other => panic!("wrong error: {}", other),
        }
    }

    #[test]
    fn short_name_path_is_labelled() {
        let err = decode_name(&[0xe6]).unwrap_err();
        match err {
            DecodeError::TruncatedUtf8 { needed, path, .. } => {
                assert_eq!(needed, 2);
                assert_eq!(path, TextPath::ShortName);
            }
            other => panic!("wrong error: {}", other),
        }
    }

    #[test]
    fn bad_continuations_name_the_byte() {
        // 0x41 where a continuation byte belongs
        let err = decode_text(&[0xc3, 0x41]).unwrap_err();
        match err {
            DecodeError::InvalidUtf8Continuation { byte, offset, .. } => {
                assert_eq!(byte, 0x41);
                assert_eq!(offset, 1);
            }
            other => panic!("wrong error: {}", other),
        }

        // bare continuation byte as a lead
        assert!(decode_text(&[0x80]).is_err());
        // overlong two-byte lead
        assert!(decode_text(&[0xc0, 0x80]).is_err());
        // beyond U+10FFFF
        assert!(decode_text(&[0xf5, 0x80, 0x80, 0x80]).is_err());
    }

    #[test]
    fn errors_after_a_valid_prefix_keep_their_offset() {
        let err = decode_text(&[b'o', b'k', 0x80]).unwrap_err();
        match err {
            DecodeError::InvalidUtf8Continuation { byte, offset, path } => {
                assert_eq!(byte, 0x80);
                assert_eq!(offset, 2);
                assert_eq!(path, TextPath::Text);
            }
            other => panic!("wrong error: {}", other),
        }

        // multi-byte sequences before the failure do not skew the offset
        let mut payload = "héllo".as_bytes().to_vec();
        payload.push(0xe6);
        let err = decode_text(&payload).unwrap_err();
        match err {
            DecodeError::TruncatedUtf8 { lead, offset, needed, .. } => {
                assert_eq!(lead, 0xe6);
                assert_eq!(offset, 6);
                assert_eq!(needed, 2);
            }
            other => panic!("wrong error: {}", other),
        }
    }

    #[test]
    fn surrogates_are_rejected() {
        // U+D800 encoded directly
        assert!(decode_text(&[0xed, 0xa0, 0x80]).is_err());
        // U+D7FF just below the range is fine
        assert!(decode_text(&[0xed, 0x9f, 0xbf]).is_ok());
    }
}
