//! password hashing for admin accounts.
//!
//! argon2id with per-password random salts. the resulting phc string
//! embeds algorithm and parameters, so verification needs no config.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// hash a plaintext password for storage.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// verify a plaintext password against a stored phc hash string.
///
/// unparseable hashes count as a failed check rather than an error.
pub fn verify(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash("hunter2").unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(verify("hunter2", &hashed));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hashed = hash("hunter2").unwrap();
        assert!(!verify("hunter3", &hashed));
        assert!(!verify("", &hashed));
    }

    #[test]
    fn test_salts_are_unique() {
        let a = hash("same-password").unwrap();
        let b = hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_fails_closed() {
        assert!(!verify("hunter2", "not-a-phc-string"));
        assert!(!verify("hunter2", ""));
    }
}
