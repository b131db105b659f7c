//! Secret key commands.
//!
//! `campus keys generate` - Generate a new token signing secret.

use anyhow::Context;
use campus_token::SecretKey;
use std::path::PathBuf;

/// Generate a new signing secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let key = SecretKey::generate();

    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        key.save_to_file(&path)
            .with_context(|| format!("Failed to write secret to {}", path.display()))?;

        println!("✔ Generated signing secret: {}", path.display());
        println!();
        println!("⚠️  Keep this file secret! Never commit it to version control.");
        println!();
        println!("Point the server at it with `secret.secret_key_file` or:");
        println!("  export SECRET_KEY=$(cat {})", path.display());
    } else {
        println!("{}", key.expose());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_secret_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("secret.key");
        generate(Some(path.clone())).unwrap();

        let secret = std::fs::read_to_string(&path).unwrap();
        assert_eq!(secret.len(), 64);
        assert!(SecretKey::load_from_file(&path).is_ok());
    }
}
