//! Password service - credential hashing, checking and strength rules

use std::sync::Arc;

use crate::adapters::{Argon2Params, Argon2PasswordHasher};
use crate::domain::result::{Error, Result};
use crate::ports::PasswordHasher;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes, verifies and strength-checks credentials
///
/// Plaintext passwords pass through this service and are never stored.
#[derive(Clone)]
pub struct PasswordService {
    hasher: Arc<dyn PasswordHasher>,
}

impl PasswordService {
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { hasher }
    }

    /// Service backed by Argon2id with the given cost parameters
    pub fn argon2(params: Argon2Params) -> Result<Self> {
        Ok(Self::new(Arc::new(Argon2PasswordHasher::new(params)?)))
    }

    /// Hash a raw password; every call uses a fresh salt
    pub fn hash_password(&self, raw: &str) -> Result<String> {
        self.hasher.hash(raw.as_bytes())
    }

    /// True iff `raw` matches the stored `hashed` credential
    pub fn check_password(&self, raw: &str, hashed: &str) -> bool {
        self.hasher.verify(raw.as_bytes(), hashed)
    }

    /// Check a password against the strength rules
    ///
    /// Rules are checked in order and the first failure is reported: at
    /// least 8 characters, an uppercase letter, a lowercase letter, a digit,
    /// a special character, and no whitespace.
    pub fn validate_password(raw: &str) -> Result<()> {
        if raw.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::invalid_password(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if !raw.chars().any(char::is_uppercase) {
            return Err(Error::invalid_password(
                "Password must contain at least one uppercase letter",
            ));
        }
        if !raw.chars().any(char::is_lowercase) {
            return Err(Error::invalid_password(
                "Password must contain at least one lowercase letter",
            ));
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_password(
                "Password must contain at least one number",
            ));
        }
        if !raw
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            return Err(Error::invalid_password(
                "Password must contain at least one special character",
            ));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(Error::invalid_password("Password cannot contain spaces"));
        }
        Ok(())
    }

    /// Validate, then hash
    pub fn validate_and_hash(&self, raw: &str) -> Result<String> {
        Self::validate_password(raw)?;
        self.hash_password(raw)
    }
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService").finish_non_exhaustive()
    }
}
