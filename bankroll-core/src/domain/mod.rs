//! Core domain entities
//!
//! All business entities are defined here. These are validated in-memory
//! records; collaborators are reached only through the traits in `ports`.

mod account;
pub mod result;
mod transaction;
mod user;
pub mod validation;

pub use account::{Account, AccountStatus, MAX_ACCOUNT_ID_LEN};
pub use transaction::{
    derive_transaction_id, DepositMethod, Transaction, TransactionKind, TransactionOptions,
    TransactionType, WithdrawalMethod,
};
pub use user::{Customer, NewUser, Role, User};
