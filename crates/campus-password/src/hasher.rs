//! PBKDF2-HMAC-SHA256 password hashing.

use campus_core::PasswordConfig;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Tag written as the first field of every stored hash.
pub const ALGORITHM: &str = "pbkdf2_sha256";

/// Iteration count for new hashes.
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Stored hashes asking for more rounds than this are rejected unverified.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Random salt length in bytes (hex-encoded in the stored form).
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hashes and verifies passwords in the format
/// `pbkdf2_sha256$<iterations>$<salt_hex>$<digest_hex>`.
///
/// The salt enters the key derivation as its hex text, not as raw bytes.
/// Stored hashes from the previous service were produced that way and must
/// keep verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.clamp(1, MAX_ITERATIONS),
        }
    }

    pub fn from_config(config: &PasswordConfig) -> Self {
        Self::new(config.iterations)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);

        let digest = derive(password, &salt_hex, self.iterations);
        format!(
            "{ALGORITHM}${}${salt_hex}${}",
            self.iterations,
            hex::encode(digest)
        )
    }

    /// Check `password` against a stored hash.
    ///
    /// Never fails: anything that is not a well-formed hash of this password
    /// yields `false`. The iteration count comes from the stored value, not
    /// from `self`.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some(parsed) = StoredHash::parse(stored) else {
            tracing::debug!("rejecting malformed password hash");
            return false;
        };

        let candidate = derive(password, parsed.salt, parsed.iterations);
        candidate.ct_eq(parsed.digest.as_slice()).into()
    }

    /// Whether a stored hash was produced with weaker settings than this
    /// hasher's and should be replaced at the next successful login.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        match StoredHash::parse(stored) {
            Some(parsed) => parsed.iterations < self.iterations,
            None => true,
        }
    }
}

/// Hash `password` with the default policy.
pub fn hash_password(password: &str) -> String {
    PasswordHasher::default().hash(password)
}

/// Verify `password` against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHasher::default().verify(password, stored)
}

/// Fields of a stored hash that passed shape checks.
struct StoredHash<'a> {
    iterations: u32,
    salt: &'a str,
    digest: Vec<u8>,
}

impl<'a> StoredHash<'a> {
    fn parse(stored: &'a str) -> Option<Self> {
        let mut fields = stored.split('$');
        let (Some(tag), Some(iterations), Some(salt), Some(digest), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return None;
        };

        if tag != ALGORITHM {
            return None;
        }

        let iterations: u32 = iterations.parse().ok()?;
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return None;
        }

        let digest = hex::decode(digest).ok()?;
        if digest.is_empty() {
            return None;
        }

        Some(Self {
            iterations,
            salt,
            digest,
        })
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low round count keeps the unit tests fast; the format is identical.
    fn fast() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_stored_format() {
        let stored = fast().hash("secret");
        let fields: Vec<&str> = stored.split('$').collect();

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "pbkdf2_sha256");
        assert_eq!(fields[1], "1000");
        assert_eq!(fields[2].len(), SALT_LEN * 2);
        assert!(fields[2].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fields[3].len(), DIGEST_LEN * 2);
    }

    #[test]
    fn test_known_vector() {
        // PBKDF2-HMAC-SHA256("passwd", "salt", 1), first 32 bytes (RFC 7914 §11).
        let stored = "pbkdf2_sha256$1$salt$55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc";
        assert!(fast().verify("passwd", stored));
        assert!(!fast().verify("passwd2", stored));
    }

    #[test]
    fn test_roundtrip_edge_passwords() {
        let hasher = fast();
        let long = "x".repeat(128);
        for password in ["", "pässwörd 🔑", long.as_str()] {
            let stored = hasher.hash(password);
            assert!(hasher.verify(password, &stored), "{password:?}");
        }
    }

    #[test]
    fn test_wrong_password() {
        let hasher = fast();
        let stored = hasher.hash("right");
        assert!(!hasher.verify("wrong", &stored));
        assert!(!hasher.verify("Right", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = fast();
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn test_uses_stored_iterations() {
        let stored = PasswordHasher::new(2_000).hash("pw");
        assert!(fast().verify("pw", &stored));
    }

    #[test]
    fn test_malformed_hashes_are_false() {
        let hasher = fast();
        let good = hasher.hash("pw");
        let (_, rest) = good.split_once('$').unwrap();

        let cases = [
            String::new(),
            "pbkdf2_sha256".to_string(),
            "pbkdf2_sha256$1000$abcd".to_string(),
            format!("{good}$extra"),
            format!("bcrypt${rest}"),
            good.replacen("$1000$", "$many$", 1),
            good.replacen("$1000$", "$0$", 1),
            good.replacen("$1000$", "$-5$", 1),
            good.replacen("$1000$", "$99999999999$", 1),
            good.replacen("$1000$", &format!("${}$", MAX_ITERATIONS + 1), 1),
            format!("{}$zz", good.rsplit_once('$').unwrap().0),
            format!("{}$", good.rsplit_once('$').unwrap().0),
        ];
        for stored in &cases {
            assert!(!hasher.verify("pw", stored), "{stored:?}");
        }
    }

    #[test]
    fn test_needs_rehash() {
        let hasher = PasswordHasher::new(2_000);
        assert!(hasher.needs_rehash(&fast().hash("pw")));
        assert!(!hasher.needs_rehash(&hasher.hash("pw")));
        assert!(hasher.needs_rehash("garbage"));
    }

    #[test]
    fn test_new_clamps_iterations() {
        assert_eq!(PasswordHasher::new(0).iterations(), 1);
        assert_eq!(PasswordHasher::new(u32::MAX).iterations(), MAX_ITERATIONS);
    }

    #[test]
    fn test_from_config() {
        let config = PasswordConfig { iterations: 150_000 };
        assert_eq!(PasswordHasher::from_config(&config).iterations(), 150_000);
    }
}
