//! HMAC-SHA256 message authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const SIGNATURE_LEN: usize = 32;

/// Compute the HMAC-SHA256 tag of `message` under `key`.
pub fn sign(message: &[u8], key: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Check a provided tag against the one computed for `message`.
///
/// The comparison runs in constant time with respect to the tag contents.
pub fn verify(message: &[u8], key: &[u8], provided: &[u8]) -> bool {
    let expected = sign(message, key);
    constant_time_eq(&expected, provided)
}

/// Constant-time byte comparison. Slices of different length are unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_case_2() {
        let tag = sign(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        assert_eq!(sign(b"msg", b"key"), sign(b"msg", b"key"));
        assert_ne!(sign(b"msg", b"key"), sign(b"msg", b"other"));
        assert_ne!(sign(b"msg", b"key"), sign(b"msh", b"key"));
    }

    #[test]
    fn test_empty_inputs_still_sign() {
        assert_eq!(sign(b"", b"").len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_verify() {
        let tag = sign(b"payload", b"secret");
        assert!(verify(b"payload", b"secret", &tag));
        assert!(!verify(b"payload", b"wrong", &tag));
        assert!(!verify(b"payload", b"secret", &tag[..31]));
        assert!(!verify(b"payload", b"secret", &[]));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
