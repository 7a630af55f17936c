use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

/// Argon2id hash of `plain` with the server-wide `pepper` appended.
/// The salt is random, so two calls never return the same string.
pub fn hash_password(plain: &str, pepper: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let peppered = format!("{plain}{pepper}");
    let hash = Argon2::default()
        .hash_password(peppered.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// A wrong password and an unreadable stored hash both answer `false`.
pub fn verify_password(plain: &str, pepper: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash could not be parsed");
            return false;
        }
    };
    let peppered = format!("{plain}{pepper}");
    Argon2::default()
        .verify_password(peppered.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEPPER: &str = "test-pepper";

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, PEPPER).expect("hashing should succeed");
        assert!(verify_password(password, PEPPER, &hash));
        assert!(!hash.contains(password));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple", PEPPER).unwrap();
        assert!(!verify_password("wrong-password", PEPPER, &hash));
    }

    #[test]
    fn verify_rejects_wrong_pepper() {
        let hash = hash_password("secret1", PEPPER).unwrap();
        assert!(!verify_password("secret1", "other-pepper", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret1", PEPPER).unwrap();
        let b = hash_password("secret1", PEPPER).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_a_plain_mismatch() {
        assert!(!verify_password("anything", PEPPER, "not-a-valid-hash"));
    }
}
