//! Service layer
//!
//! Services wrap the collaborator ports with the business rules that sit
//! on top of them.

pub mod password;

pub use password::PasswordService;
