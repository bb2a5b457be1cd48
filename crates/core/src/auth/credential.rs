//! Credential verification capability.

use super::password::{PasswordError, hash_password, verify_password};

/// Hashes and checks account passwords.
pub trait CredentialVerifier: Send + Sync {
    /// Produces a storable credential for `password`.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Returns true if `password` matches the stored credential.
    fn verify(&self, password: &str, credential: &str) -> Result<bool, PasswordError>;
}

/// Argon2id credentials in PHC string format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash_password(password)
    }

    fn verify(&self, password: &str, credential: &str) -> Result<bool, PasswordError> {
        verify_password(password, credential)
    }
}
