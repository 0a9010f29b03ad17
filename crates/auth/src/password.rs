use crate::error::{AuthError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Argon2 hashing for human-chosen login credentials. Unlike token
/// fingerprints, these are low-entropy and get the slow adaptive hash.
pub struct CredentialHasher;

impl CredentialHasher {
    pub fn hash(credential: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("credential hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    pub fn verify(credential: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("stored credential hash is malformed: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(credential.as_bytes(), &parsed)
            .is_ok())
    }
}
