//! Account domain model

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::result::{Error, ErrorKind, Result};
use super::transaction::{
    DepositMethod, Transaction, TransactionOptions, TransactionType, WithdrawalMethod,
};
use super::validation::{validate_alnum_string, validate_non_negative_amount};

/// Maximum length of an account identifier
pub const MAX_ACCOUNT_ID_LEN: usize = 50;

/// Lifecycle state of an account
///
/// Any state may move to any other; only `Active` accounts accept
/// mutating operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    #[default]
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 3] = [
        AccountStatus::Active,
        AccountStatus::Frozen,
        AccountStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Frozen => "Frozen",
            AccountStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::account("Status cannot be empty"));
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::account("Status must be one of: Active, Frozen, Closed"))
    }
}

/// A validated transaction and the balance it leaves behind
#[derive(Debug)]
pub(crate) struct PendingTransaction {
    tx: Transaction,
    balance: Decimal,
}

/// A balance-holding account owned by a single user
///
/// The account owns its transaction history exclusively. Every mutating
/// operation validates fully before touching state, so a failed call leaves
/// the balance and history untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    id: String,
    user_id: String,
    opening_balance: Decimal,
    balance: Decimal,
    transactions: Vec<Transaction>,
    created_on: NaiveDate,
    status: AccountStatus,
}

impl Account {
    /// Open a new active account funded with `initial_deposit`
    pub fn new(account_id: &str, user_id: &str, initial_deposit: Decimal) -> Result<Self> {
        let id = validate_alnum_string(account_id, "Account ID", MAX_ACCOUNT_ID_LEN, false)
            .map_err(|e| e.wrap_as(ErrorKind::Account))?;
        if user_id.trim().is_empty() {
            return Err(Error::account("Account owner cannot be empty"));
        }
        let opening_balance = validate_non_negative_amount(initial_deposit, "Initial deposit")
            .map_err(|e| e.wrap_as(ErrorKind::Deposit))?;

        info!(account_id = %id, "account opened");

        Ok(Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            opening_balance,
            balance: opening_balance,
            transactions: Vec::new(),
            created_on: Local::now().date_naive(),
            status: AccountStatus::Active,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owning user
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance
    }

    /// Transactions in the order they were recorded
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Move the account to another status; every transition is allowed
    pub fn set_status(&mut self, status: AccountStatus) {
        if self.status != status {
            info!(account_id = %self.id, from = %self.status, to = %status, "account status changed");
        }
        self.status = status;
    }

    /// Credit the account
    pub fn make_deposit(
        &mut self,
        user_id: &str,
        amount: Decimal,
        method: DepositMethod,
        options: TransactionOptions,
    ) -> Result<&Transaction> {
        let pending = self.prepare_deposit(user_id, amount, method, options)?;
        Ok(self.apply(pending))
    }

    /// Debit the account; the balance may not go below zero
    pub fn make_withdrawal(
        &mut self,
        user_id: &str,
        amount: Decimal,
        method: WithdrawalMethod,
        options: TransactionOptions,
    ) -> Result<&Transaction> {
        self.ensure_active("withdraw from")?;
        if amount > self.balance {
            warn!(account_id = %self.id, "withdrawal rejected: insufficient funds");
            return Err(Error::withdrawal("Insufficient funds for withdrawal"));
        }
        let tx = Transaction::withdrawal(user_id, &self.id, amount, method, options)?;
        let pending = self.pending(tx)?;
        Ok(self.apply(pending))
    }

    /// Debit the account and record a transfer to another account of this bank
    ///
    /// Only the source side is recorded here. Crediting the destination is
    /// up to the caller; `Customer::transfer_between_accounts` does both
    /// sides atomically when one customer owns both accounts.
    pub fn make_internal_transfer(
        &mut self,
        user_id: &str,
        amount: Decimal,
        destination_account_id: &str,
        options: TransactionOptions,
    ) -> Result<&Transaction> {
        let pending =
            self.prepare_internal_transfer(user_id, amount, destination_account_id, options)?;
        Ok(self.apply(pending))
    }

    /// Debit the account and record a transfer to another bank
    pub fn make_external_transfer(
        &mut self,
        user_id: &str,
        amount: Decimal,
        destination_account_id: &str,
        routing_number: &str,
        bank: &str,
        options: TransactionOptions,
    ) -> Result<&Transaction> {
        self.ensure_active("transfer from")?;
        self.ensure_funds_for_transfer(amount)?;
        let tx = Transaction::external_transfer(
            user_id,
            &self.id,
            amount,
            destination_account_id,
            routing_number,
            bank,
            options,
        )?;
        let pending = self.pending(tx)?;
        Ok(self.apply(pending))
    }

    /// Opening balance plus the signed effect of every recorded transaction
    ///
    /// Always equal to [`Account::balance`]. Every intermediate sum is a
    /// balance the account once held, so the fold stays in range.
    pub fn recomputed_balance(&self) -> Decimal {
        self.transactions
            .iter()
            .fold(self.opening_balance, |acc, tx| acc + tx.signed_amount())
    }

    pub(crate) fn prepare_deposit(
        &self,
        user_id: &str,
        amount: Decimal,
        method: DepositMethod,
        options: TransactionOptions,
    ) -> Result<PendingTransaction> {
        self.ensure_active("deposit to")?;
        let tx = Transaction::deposit(user_id, &self.id, amount, method, options)?;
        self.pending(tx)
    }

    pub(crate) fn prepare_internal_transfer(
        &self,
        user_id: &str,
        amount: Decimal,
        destination_account_id: &str,
        options: TransactionOptions,
    ) -> Result<PendingTransaction> {
        self.ensure_active("transfer from")?;
        self.ensure_funds_for_transfer(amount)?;
        let tx = Transaction::internal_transfer(
            user_id,
            &self.id,
            amount,
            destination_account_id,
            options,
        )?;
        self.pending(tx)
    }

    /// Pair `tx` with the balance it leaves, failing if that balance is
    /// not representable
    fn pending(&self, tx: Transaction) -> Result<PendingTransaction> {
        let Some(balance) = self.balance.checked_add(tx.signed_amount()) else {
            warn!(account_id = %self.id, kind = %tx.transaction_type(), "transaction rejected: balance overflow");
            return Err(match tx.transaction_type() {
                TransactionType::Deposit => {
                    Error::deposit("Deposit would overflow the account balance")
                }
                TransactionType::Withdrawal => {
                    Error::withdrawal("Withdrawal would overflow the account balance")
                }
                _ => Error::transfer("Transfer would overflow the account balance"),
            });
        };
        Ok(PendingTransaction { tx, balance })
    }

    /// Record a prepared transaction
    ///
    /// `pending` must have been prepared against the current balance, with
    /// no other mutation of this account in between.
    pub(crate) fn apply(&mut self, pending: PendingTransaction) -> &Transaction {
        let PendingTransaction { tx, balance } = pending;
        debug!(
            account_id = %self.id,
            transaction_id = %tx.id(),
            kind = %tx.transaction_type(),
            "transaction recorded"
        );
        self.balance = balance;
        self.transactions.push(tx);
        &self.transactions[self.transactions.len() - 1]
    }

    fn ensure_active(&self, action: &str) -> Result<()> {
        if self.status != AccountStatus::Active {
            warn!(account_id = %self.id, status = %self.status, "mutation rejected on inactive account");
            return Err(Error::account(format!(
                "Cannot {} a {} account",
                action,
                self.status.as_str().to_lowercase()
            )));
        }
        Ok(())
    }

    fn ensure_funds_for_transfer(&self, amount: Decimal) -> Result<()> {
        if amount > self.balance {
            warn!(account_id = %self.id, "transfer rejected: insufficient funds");
            return Err(Error::transfer("Insufficient funds for transfer"));
        }
        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account ID: {}", self.id)?;
        writeln!(f, "User ID: {}", self.user_id)?;
        writeln!(f, "Balance: {:.2}", self.balance)?;
        writeln!(f, "Date Created: {}", self.created_on)?;
        writeln!(f, "Status: {}", self.status)?;
        write!(f, "Transactions: {}", self.transactions.len())
    }
}
