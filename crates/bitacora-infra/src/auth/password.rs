//! Argon2 password hashing implementation.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use bitacora_core::ports::{AuthError, PasswordService};

/// Argon2-based password service. Every hash carries its own random salt,
/// so equal passwords never produce equal hashes.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects_wrong_password() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("Abc123").unwrap();

        assert!(service.verify("Abc123", &hash).unwrap());
        assert!(!service.verify("Abc124", &hash).unwrap());
    }

    #[test]
    fn salts_are_random_per_hash() {
        let service = Argon2PasswordService::new();

        let first = service.hash("Abc123").unwrap();
        let second = service.hash("Abc123").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("Abc123", &second).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let service = Argon2PasswordService::new();

        assert!(matches!(
            service.verify("Abc123", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
    }
}
