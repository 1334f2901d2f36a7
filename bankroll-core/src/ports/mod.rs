//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The domain
//! depends only on these traits, not on concrete implementations.

mod email;
mod hasher;

pub use email::EmailValidator;
pub use hasher::PasswordHasher;
