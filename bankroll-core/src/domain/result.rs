//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Flat taxonomy: each variant belongs to exactly one validation domain.
/// Validators raise immediately and callers either propagate the error or
/// re-label it into their own domain with [`Error::wrap_as`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Generic string/number shape failure
    #[error("Input error: {0}")]
    Input(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid date of birth: {0}")]
    InvalidDob(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Deposit error: {0}")]
    Deposit(String),

    #[error("Withdrawal error: {0}")]
    Withdrawal(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Account error: {0}")]
    Account(String),

    /// The hashing collaborator failed to produce a hash
    #[error("Hashing error: {0}")]
    Hashing(String),
}

/// Discriminant of [`Error`], used to re-label errors between domains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    InvalidPassword,
    InvalidDob,
    Transaction,
    Deposit,
    Withdrawal,
    Transfer,
    Account,
    Hashing,
}

impl Error {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create an invalid password error
    pub fn invalid_password(msg: impl Into<String>) -> Self {
        Self::InvalidPassword(msg.into())
    }

    /// Create an invalid date of birth error
    pub fn invalid_dob(msg: impl Into<String>) -> Self {
        Self::InvalidDob(msg.into())
    }

    /// Create a transaction error
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create a deposit error
    pub fn deposit(msg: impl Into<String>) -> Self {
        Self::Deposit(msg.into())
    }

    /// Create a withdrawal error
    pub fn withdrawal(msg: impl Into<String>) -> Self {
        Self::Withdrawal(msg.into())
    }

    /// Create a transfer error
    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::Transfer(msg.into())
    }

    /// Create an account error
    pub fn account(msg: impl Into<String>) -> Self {
        Self::Account(msg.into())
    }

    /// Create a hashing error
    pub fn hashing(msg: impl Into<String>) -> Self {
        Self::Hashing(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::InvalidPassword(_) => ErrorKind::InvalidPassword,
            Self::InvalidDob(_) => ErrorKind::InvalidDob,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::Deposit(_) => ErrorKind::Deposit,
            Self::Withdrawal(_) => ErrorKind::Withdrawal,
            Self::Transfer(_) => ErrorKind::Transfer,
            Self::Account(_) => ErrorKind::Account,
            Self::Hashing(_) => ErrorKind::Hashing,
        }
    }

    /// The bare message, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Input(m)
            | Self::InvalidPassword(m)
            | Self::InvalidDob(m)
            | Self::Transaction(m)
            | Self::Deposit(m)
            | Self::Withdrawal(m)
            | Self::Transfer(m)
            | Self::Account(m)
            | Self::Hashing(m) => m,
        }
    }

    /// Re-label an error into another domain, keeping its message
    ///
    /// Used by entity validators to turn a generic [`Error::Input`] into
    /// the entity's own error kind.
    pub fn wrap_as(self, kind: ErrorKind) -> Self {
        let msg = self.message().to_string();
        match kind {
            ErrorKind::Input => Self::Input(msg),
            ErrorKind::InvalidPassword => Self::InvalidPassword(msg),
            ErrorKind::InvalidDob => Self::InvalidDob(msg),
            ErrorKind::Transaction => Self::Transaction(msg),
            ErrorKind::Deposit => Self::Deposit(msg),
            ErrorKind::Withdrawal => Self::Withdrawal(msg),
            ErrorKind::Transfer => Self::Transfer(msg),
            ErrorKind::Account => Self::Account(msg),
            ErrorKind::Hashing => Self::Hashing(msg),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
