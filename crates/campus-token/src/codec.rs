//! Unpadded URL-safe base64.
//!
//! Encoding never emits `=`. Decoding accepts input with or without padding
//! and rejects characters outside the URL-safe alphabet, impossible lengths
//! and non-canonical trailing bits (so two different strings never decode to
//! the same bytes).

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Malformed base64url input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid base64url input: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Encode bytes as unpadded base64url.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    ENGINE.encode(bytes)
}

/// Decode base64url, with or without trailing padding.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(ENGINE.decode(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_strips_padding() {
        assert_eq!(encode(b"a"), "YQ");
        assert_eq!(encode(b"ab"), "YWI");
        assert_eq!(encode(b"abc"), "YWJj");
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn test_url_safe_alphabet() {
        // 0xfb 0xff encodes to "+/" in the standard alphabet.
        assert_eq!(encode([0xfb, 0xff]), "-_8");
        assert_eq!(decode("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_accepts_padding() {
        assert_eq!(decode("YQ==").unwrap(), b"a");
        assert_eq!(decode("YQ").unwrap(), b"a");
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert!(decode("YW+j").is_err());
        assert!(decode("YW/j").is_err());
        assert!(decode("Y").is_err());
        assert!(decode("YWJj!").is_err());
        // Non-canonical trailing bits ("YR" would otherwise also mean "a").
        assert!(decode("YR").is_err());
    }

    #[test]
    fn test_roundtrip_edge_bytes() {
        for bytes in [&b""[..], &[0u8][..], &[0, 0, 0][..], &[0xff; 7][..]] {
            assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = encode(&bytes);
            prop_assert!(!encoded.contains('='));
            prop_assert_eq!(decode(&encoded).unwrap(), bytes);
        }
    }
}
