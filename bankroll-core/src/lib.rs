//! Bankroll Core - domain model for a simulated bank
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Core entities (User, Customer, Account, Transaction) and validators
//! - **ports**: Trait definitions for external collaborators (PasswordHasher, EmailValidator)
//! - **services**: Business rules on top of the ports (PasswordService)
//! - **adapters**: Concrete collaborators (Argon2id, regex email syntax)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::{Argon2PasswordHasher, RegexEmailValidator};
use config::Config;
use ports::EmailValidator;
use services::PasswordService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind, Result};
pub use domain::{
    Account, AccountStatus, Customer, DepositMethod, NewUser, Role, Transaction, TransactionKind,
    TransactionOptions, TransactionType, User, WithdrawalMethod,
};

/// Main context for Bankroll operations
///
/// Holds the configuration and the collaborators every user operation
/// needs, so callers don't have to wire adapters by hand.
#[derive(Clone)]
pub struct BankContext {
    pub config: Config,
    pub passwords: PasswordService,
    pub emails: Arc<dyn EmailValidator>,
}

impl BankContext {
    /// Create a context from an already loaded config
    pub fn new(config: Config) -> Result<Self> {
        let hasher = Argon2PasswordHasher::new(config.argon2)?;
        Ok(Self {
            config,
            passwords: PasswordService::new(Arc::new(hasher)),
            emails: Arc::new(RegexEmailValidator::new()),
        })
    }

    /// Load config from `config_dir` and create a context
    pub fn load(config_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(config_dir)?;
        Ok(Self::new(config)?)
    }

    /// Install the global tracing subscriber using the configured filter
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_logging(&self) -> bool {
        logging::init(&self.config.log_filter)
    }

    /// Register a user with any role
    pub fn register_user(&self, new_user: NewUser<'_>) -> Result<User> {
        User::new(&self.passwords, self.emails.as_ref(), new_user)
    }

    /// Register a user with the customer role, ready to own accounts
    ///
    /// `new_user.role` must be [`Role::Customer`]; any other role is an
    /// input error raised before the password is hashed.
    pub fn register_customer(&self, new_user: NewUser<'_>) -> Result<Customer> {
        if new_user.role != Role::Customer {
            return Err(Error::input(format!(
                "Only users with the customer role can own accounts, got {}",
                new_user.role
            )));
        }
        Customer::new(self.register_user(new_user)?)
    }

    pub fn check_password(&self, user: &User, raw: &str) -> bool {
        user.check_password(&self.passwords, raw)
    }

    pub fn change_password(&self, user: &mut User, old_password: &str, new_password: &str) -> Result<()> {
        user.change_password(&self.passwords, old_password, new_password)
    }

    pub fn set_email(&self, user: &mut User, email: &str) -> Result<()> {
        user.set_email(self.emails.as_ref(), email)
    }
}

impl std::fmt::Debug for BankContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
