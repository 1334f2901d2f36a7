//! Email format port

use crate::domain::result::Result;

/// Syntax-only email address validation
pub trait EmailValidator: Send + Sync {
    /// Validate the address and return its normalized form
    ///
    /// Fails with [`crate::Error::Input`] when the address is not shaped
    /// like a valid address. Deliverability is never checked.
    fn normalize(&self, email: &str) -> Result<String>;
}
