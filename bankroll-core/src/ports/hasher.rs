//! Password hashing port

use crate::domain::result::Result;

/// Salted, slow, one-way password hashing
///
/// `hash` must embed everything `verify` needs (algorithm, cost and salt)
/// in the returned string, and must produce a different string on every
/// call for the same input.
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw credential into an opaque, self-describing string
    fn hash(&self, raw: &[u8]) -> Result<String>;

    /// Check a raw credential against a string produced by [`PasswordHasher::hash`]
    ///
    /// Malformed hashes never verify.
    fn verify(&self, raw: &[u8], hashed: &str) -> bool;
}
