//! Adapter implementations of the collaborator ports

pub mod argon2_hasher;
pub mod email;

pub use argon2_hasher::{Argon2Params, Argon2PasswordHasher};
pub use email::RegexEmailValidator;
