//! Argon2id hashing for stored credentials.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as Argon2Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("Failed to hash or verify password: {0}")]
    Hash(Argon2Error),
}

impl From<Argon2Error> for HashingError {
    fn from(err: Argon2Error) -> Self {
        HashingError::Hash(err)
    }
}

pub trait Hasher: Send + Sync {
    /// PHC string (`$argon2id$v=19$...`) for `plain`
    fn hash(&self, plain: &str) -> Result<String, HashingError>;

    /// `Ok(false)` on mismatch, `Err` when `hash` is not a PHC string
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashingError>;
}

pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self.argon2.hash_password(plain.as_bytes(), &salt)?.to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(hash)?;

        Ok(self.argon2.verify_password(plain.as_bytes(), &parsed).is_ok())
    }
}
