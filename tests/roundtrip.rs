use proptest::prelude::*;
use tokson::prelude::*;
use tokson_strategy::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 1_000, ..ProptestConfig::default() })]

    #[test]
    fn encode_decode_streams(tokens in arb_tokens()) {
        let enc = encode_tokens(&tokens).unwrap();
        let dec = decode_tokens(&enc);
        prop_assert_eq!(dec.ok(), Some(tokens));
    }

    #[test]
    fn scalars_roundtrip(t in arb_scalar()) {
        let enc = encode_tokens(&[t.clone()]).unwrap();
        prop_assert_eq!(decode_tokens(&enc).unwrap(), vec![t]);
    }

    #[test]
    fn truncation_never_panics(tokens in arb_tokens(), cut in 0usize..4096) {
        let enc = encode_tokens(&tokens).unwrap();
        let cut = cut % (enc.len() + 1);
        // any outcome is fine as long as it is a Result, not a crash
        let _ = decode_tokens(&enc[..cut]);
    }

    #[test]
    fn flipped_bytes_never_panic(tokens in arb_tokens(), pos in 0usize..4096, bit in 0u8..8) {
        let mut enc = encode_tokens(&tokens).unwrap();
        let pos = pos % enc.len();
        enc[pos] ^= 1u8 << bit;
        let _ = decode_tokens(&enc);
    }
}
