//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::result::{Error, ErrorKind, Result};
use super::validation::{
    validate_alnum_string, validate_non_negative_amount, validate_positive_amount,
    validate_string,
};

/// Maximum length of the free-form origin field
pub const MAX_ORIGIN_LEN: usize = 50;
/// Maximum length of the free-form description field
pub const MAX_DESCRIPTION_LEN: usize = 100;
/// Maximum length of account ids and bank names referenced by transfers
pub const MAX_DESTINATION_LEN: usize = 50;
/// Routing numbers are exactly this many ASCII digits
pub const ROUTING_NUMBER_LEN: usize = 9;

const MAX_TYPE_NAME_LEN: usize = 50;

fn one_of(names: &[&str]) -> String {
    names.join(", ")
}

// =============================================================================
// Enumerations
// =============================================================================

/// The kind of a transaction, spelled the way it is shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    #[serde(rename = "Intra-Transfer")]
    IntraTransfer,
    #[serde(rename = "External-Transfer")]
    ExternalTransfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::IntraTransfer,
        TransactionType::ExternalTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::IntraTransfer => "Intra-Transfer",
            TransactionType::ExternalTransfer => "External-Transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_string(s, "Transaction type", MAX_TYPE_NAME_LEN, false)
            .map_err(|e| e.wrap_as(ErrorKind::Transaction))?;
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|t| t.as_str()).collect();
                Error::transaction(format!("Transaction type must be one of: {}", one_of(&names)))
            })
    }
}

/// How money arrived in a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositMethod {
    Cash,
    Check,
    Wire,
    Transfer,
    #[serde(rename = "Direct-Deposit")]
    DirectDeposit,
    #[serde(rename = "Mobile-Deposit")]
    MobileDeposit,
}

impl DepositMethod {
    pub const ALL: [DepositMethod; 6] = [
        DepositMethod::Cash,
        DepositMethod::Check,
        DepositMethod::Wire,
        DepositMethod::Transfer,
        DepositMethod::DirectDeposit,
        DepositMethod::MobileDeposit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DepositMethod::Cash => "Cash",
            DepositMethod::Check => "Check",
            DepositMethod::Wire => "Wire",
            DepositMethod::Transfer => "Transfer",
            DepositMethod::DirectDeposit => "Direct-Deposit",
            DepositMethod::MobileDeposit => "Mobile-Deposit",
        }
    }
}

impl fmt::Display for DepositMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|m| m.as_str()).collect();
            Error::deposit(format!("Deposit method must be one of: {}", one_of(&names)))
        })
    }
}

/// How money left the account in a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalMethod {
    Cash,
    Check,
    Wire,
    Transfer,
}

impl WithdrawalMethod {
    pub const ALL: [WithdrawalMethod; 4] = [
        WithdrawalMethod::Cash,
        WithdrawalMethod::Check,
        WithdrawalMethod::Wire,
        WithdrawalMethod::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalMethod::Cash => "Cash",
            WithdrawalMethod::Check => "Check",
            WithdrawalMethod::Wire => "Wire",
            WithdrawalMethod::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for WithdrawalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s).ok_or_else(|| {
            let names: Vec<_> = Self::ALL.iter().map(|m| m.as_str()).collect();
            Error::withdrawal(format!("Withdrawal method must be one of: {}", one_of(&names)))
        })
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Optional fields shared by every transaction kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionOptions {
    pub fee: Decimal,
    pub origin: Option<String>,
    pub description: Option<String>,
}

impl TransactionOptions {
    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Variant-specific payload of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TransactionKind {
    #[serde(rename = "Deposit")]
    Deposit { method: DepositMethod },
    #[serde(rename = "Withdrawal")]
    Withdrawal { method: WithdrawalMethod },
    #[serde(rename = "Intra-Transfer")]
    InternalTransfer { destination_account_id: String },
    #[serde(rename = "External-Transfer")]
    ExternalTransfer {
        destination_account_id: String,
        routing_number: String,
        bank: String,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Deposit { .. } => TransactionType::Deposit,
            TransactionKind::Withdrawal { .. } => TransactionType::Withdrawal,
            TransactionKind::InternalTransfer { .. } => TransactionType::IntraTransfer,
            TransactionKind::ExternalTransfer { .. } => TransactionType::ExternalTransfer,
        }
    }
}

/// A single immutable transaction record belonging to an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: String,
    user_id: String,
    account_id: String,
    amount: Decimal,
    fee: Decimal,
    origin: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    kind: TransactionKind,
}

/// Base fields after validation, before the variant payload is attached
struct Base {
    id: String,
    amount: Decimal,
    fee: Decimal,
    origin: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a deposit record
    pub fn deposit(
        user_id: &str,
        account_id: &str,
        amount: Decimal,
        method: DepositMethod,
        options: TransactionOptions,
    ) -> Result<Self> {
        let base = Self::validate_base(user_id, amount, TransactionType::Deposit, options)?;
        Ok(Self::assemble(base, user_id, account_id, TransactionKind::Deposit { method }))
    }

    /// Create a withdrawal record
    pub fn withdrawal(
        user_id: &str,
        account_id: &str,
        amount: Decimal,
        method: WithdrawalMethod,
        options: TransactionOptions,
    ) -> Result<Self> {
        let base = Self::validate_base(user_id, amount, TransactionType::Withdrawal, options)?;
        Ok(Self::assemble(base, user_id, account_id, TransactionKind::Withdrawal { method }))
    }

    /// Create a transfer record between two accounts of this bank
    pub fn internal_transfer(
        user_id: &str,
        account_id: &str,
        amount: Decimal,
        destination_account_id: &str,
        options: TransactionOptions,
    ) -> Result<Self> {
        let base = Self::validate_base(user_id, amount, TransactionType::IntraTransfer, options)?;
        let destination_account_id = validate_destination(destination_account_id, account_id)?;
        Ok(Self::assemble(
            base,
            user_id,
            account_id,
            TransactionKind::InternalTransfer { destination_account_id },
        ))
    }

    /// Create a transfer record to an account held at another bank
    pub fn external_transfer(
        user_id: &str,
        account_id: &str,
        amount: Decimal,
        destination_account_id: &str,
        routing_number: &str,
        bank: &str,
        options: TransactionOptions,
    ) -> Result<Self> {
        let base =
            Self::validate_base(user_id, amount, TransactionType::ExternalTransfer, options)?;
        let destination_account_id = validate_destination(destination_account_id, account_id)?;
        let routing_number = validate_routing_number(routing_number)?;
        let bank = validate_string(bank, "Destination bank", MAX_DESTINATION_LEN, false)
            .map_err(|e| e.wrap_as(ErrorKind::Transfer))?
            .to_string();
        Ok(Self::assemble(
            base,
            user_id,
            account_id,
            TransactionKind::ExternalTransfer {
                destination_account_id,
                routing_number,
                bank,
            },
        ))
    }

    /// Validate the shared fields in order: amount, fee, origin,
    /// description, then derive the identifier
    ///
    /// The type is already a closed enum here; unknown type names are
    /// rejected earlier by `TransactionType::from_str`.
    fn validate_base(
        user_id: &str,
        amount: Decimal,
        transaction_type: TransactionType,
        options: TransactionOptions,
    ) -> Result<Base> {
        let amount = validate_positive_amount(amount, "Amount")
            .map_err(|e| e.wrap_as(ErrorKind::Transaction))?;
        let fee = validate_non_negative_amount(options.fee, "Fee")
            .map_err(|e| e.wrap_as(ErrorKind::Transaction))?;
        let origin = validate_optional(options.origin, "Origin", MAX_ORIGIN_LEN)?;
        let description =
            validate_optional(options.description, "Description", MAX_DESCRIPTION_LEN)?;

        let created_at = Utc::now();
        let id = derive_transaction_id(user_id, transaction_type, Some(&created_at))?;

        Ok(Base {
            id,
            amount,
            fee,
            origin,
            description,
            created_at,
        })
    }

    fn assemble(base: Base, user_id: &str, account_id: &str, kind: TransactionKind) -> Self {
        Self {
            id: base.id,
            user_id: user_id.to_string(),
            account_id: account_id.to_string(),
            amount: base.amount,
            fee: base.fee,
            origin: base.origin,
            description: base.description,
            created_at: base.created_at,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The account this transaction was recorded against
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn fee(&self) -> Decimal {
        self.fee
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Effect of this transaction on its account's balance
    ///
    /// Deposits credit the account; withdrawals and transfers debit it.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Deposit { .. } => self.amount,
            _ => -self.amount,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction ID: {}", self.id)?;
        writeln!(f, "User ID: {}", self.user_id)?;
        writeln!(f, "Account ID: {}", self.account_id)?;
        writeln!(f, "Amount: {:.2}", self.amount)?;
        writeln!(f, "Fee: {:.2}", self.fee)?;
        write!(f, "Transaction Type: {}", self.transaction_type())?;
        match &self.kind {
            TransactionKind::Deposit { method } => write!(f, "\nDeposit Method: {}", method)?,
            TransactionKind::Withdrawal { method } => {
                write!(f, "\nWithdrawal Method: {}", method)?
            }
            TransactionKind::InternalTransfer {
                destination_account_id,
            } => write!(f, "\nDestination Account ID: {}", destination_account_id)?,
            TransactionKind::ExternalTransfer {
                destination_account_id,
                routing_number,
                bank,
            } => {
                write!(f, "\nDestination Account ID: {}", destination_account_id)?;
                write!(f, "\nDestination Routing Number: {}", routing_number)?;
                write!(f, "\nDestination Bank: {}", bank)?;
            }
        }
        if let Some(origin) = &self.origin {
            write!(f, "\nOrigin: {}", origin)?;
        }
        if let Some(description) = &self.description {
            write!(f, "\nDescription: {}", description)?;
        }
        write!(f, "\nDate: {}", self.created_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Derive a transaction identifier from who acted, what kind, and when
///
/// SHA-256 of `"{user_id}-{type}-{timestamp}"` with the timestamp in
/// RFC 3339 at nanosecond precision, hex encoded. One-way and practically
/// unique; two records by the same user of the same kind in the same
/// nanosecond would collide.
pub fn derive_transaction_id(
    user_id: &str,
    transaction_type: TransactionType,
    timestamp: Option<&DateTime<Utc>>,
) -> Result<String> {
    if user_id.trim().is_empty() {
        return Err(Error::transaction(
            "User ID is required to generate a transaction ID",
        ));
    }
    let timestamp = timestamp.ok_or_else(|| {
        Error::transaction("Timestamp is required to generate a transaction ID")
    })?;

    let seed = format!(
        "{}-{}-{}",
        user_id,
        transaction_type,
        timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Optional free-form field; an empty value is stored as absent
fn validate_optional(value: Option<String>, name: &str, max_length: usize) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => {
            validate_string(&v, name, max_length, true)
                .map_err(|e| e.wrap_as(ErrorKind::Transaction))?;
            Ok(Some(v).filter(|v| !v.is_empty()))
        }
    }
}

fn validate_destination(destination: &str, source: &str) -> Result<String> {
    let destination =
        validate_alnum_string(destination, "Destination account ID", MAX_DESTINATION_LEN, false)
            .map_err(|e| e.wrap_as(ErrorKind::Transfer))?;
    if destination == source {
        return Err(Error::transfer(
            "Destination account cannot be the same as the source account",
        ));
    }
    Ok(destination.to_string())
}

fn validate_routing_number(routing_number: &str) -> Result<String> {
    if routing_number.len() != ROUTING_NUMBER_LEN
        || !routing_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::transfer(format!(
            "Routing number must be exactly {} digits",
            ROUTING_NUMBER_LEN
        )));
    }
    Ok(routing_number.to_string())
}
