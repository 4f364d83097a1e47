//! Password verification capability.
//!
//! The orchestrator only ever asks "does this plaintext match this
//! stored hash"; which algorithm answers is chosen at startup.

use argon2::password_hash::{self, PasswordHash};
use argon2::{Argon2, PasswordVerifier as _};

use crate::error::AuthError;

pub trait PasswordVerifier: Send + Sync {
    fn matches(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id verification against PHC-format hashes.
#[derive(Debug, Clone, Default)]
pub struct Argon2Verifier {
    pepper: Option<String>,
}

impl Argon2Verifier {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    /// Bytes fed to Argon2: the pepper, if any, followed by the password.
    fn input(&self, password: &str) -> Vec<u8> {
        let pepper = self.pepper.as_deref().unwrap_or_default();
        [pepper.as_bytes(), password.as_bytes()].concat()
    }
}

impl PasswordVerifier for Argon2Verifier {
    /// A stored value that is not a PHC string is a [`AuthError::Crypto`],
    /// never a plain mismatch.
    fn matches(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(hash)
            .map_err(|e| AuthError::Crypto(format!("stored hash unreadable: {e}")))?;

        match Argon2::default().verify_password(&self.input(password), &stored) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Crypto(format!("argon2 verification: {e}"))),
        }
    }
}

/// Compares the stored value verbatim. Only for the in-memory demo
/// store, whose fixed account is provisioned without hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl PasswordVerifier for PlaintextVerifier {
    fn matches(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let (a, b) = (password.as_bytes(), hash.as_bytes());
        if a.len() != b.len() {
            return Ok(false);
        }
        Ok(a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0)
    }
}

#[cfg(test)]
mod tests {
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;

    use super::*;

    fn hash_for(verifier: &Argon2Verifier, password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(&verifier.input(password), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn argon2_accepts_only_the_right_password() {
        let verifier = Argon2Verifier::default();
        let hash = hash_for(&verifier, "admin123");
        assert!(verifier.matches("admin123", &hash).unwrap());
        assert!(!verifier.matches("admin124", &hash).unwrap());
    }

    #[test]
    fn pepper_must_match_the_one_used_for_hashing() {
        let peppered = Argon2Verifier::new(Some("pepper!".into()));
        let hash = hash_for(&peppered, "op123");
        assert!(peppered.matches("op123", &hash).unwrap());
        assert!(!Argon2Verifier::default().matches("op123", &hash).unwrap());
    }

    #[test]
    fn unreadable_hash_is_a_crypto_error() {
        let result = Argon2Verifier::default().matches("pw", "plain-text");
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }

    #[test]
    fn plaintext_verifier_compares_exactly() {
        let verifier = PlaintextVerifier;
        assert!(verifier.matches("demo", "demo").unwrap());
        assert!(!verifier.matches("demo", "Demo").unwrap());
        assert!(!verifier.matches("demo", "demo ").unwrap());
    }
}
