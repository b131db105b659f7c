//! Password commands.
//!
//! `campus password hash` - Hash a password for seeding a user store.
//! `campus password verify` - Check a password against a stored hash.

use campus_password::{DEFAULT_ITERATIONS, PasswordHasher};

pub fn hash(password: String, iterations: Option<u32>) -> anyhow::Result<()> {
    let hasher = PasswordHasher::new(iterations.unwrap_or(DEFAULT_ITERATIONS));
    println!("{}", hasher.hash(&password));
    Ok(())
}

pub fn verify(password: String, stored: String) -> anyhow::Result<()> {
    let hasher = PasswordHasher::default();
    if !hasher.verify(&password, stored.trim()) {
        anyhow::bail!("password does not match");
    }

    println!("✔ Password matches");
    if hasher.needs_rehash(stored.trim()) {
        println!(
            "  Note: hash uses fewer than {} iterations; rehash on next login",
            hasher.iterations()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_command() {
        let stored = PasswordHasher::new(1_000).hash("s3cret-pass");
        assert!(verify("s3cret-pass".to_string(), stored.clone()).is_ok());
        assert!(verify("wrong".to_string(), stored).is_err());
        assert!(verify("x".to_string(), "not-a-hash".to_string()).is_err());
    }
}
