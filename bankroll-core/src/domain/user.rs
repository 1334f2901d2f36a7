//! User and customer domain models

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::account::Account;
use super::result::{Error, Result};
use super::transaction::{DepositMethod, TransactionOptions};
use super::validation::{parse_date_of_birth, validate_alpha_string, DOB_FORMAT};
use crate::ports::EmailValidator;
use crate::services::PasswordService;

/// Maximum length of first and last names
pub const MAX_NAME_LEN: usize = 50;

/// What a user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            "" => Err(Error::input("Role cannot be empty")),
            _ => Err(Error::input("Invalid role")),
        }
    }
}

/// Raw registration input for a [`User`]
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    /// MM/DD/YYYY
    pub date_of_birth: &'a str,
    pub email: &'a str,
    pub role: Role,
}

/// A registered user of the bank
///
/// Only the hash of the credential is kept. The id, date of birth and role
/// are fixed at registration; names and email change through validated
/// setters, the credential only through [`User::change_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: String,
    #[serde(skip_serializing)]
    password_hash: String,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    email: String,
    role: Role,
}

impl User {
    /// Validate and register a user, checking age against today's date
    pub fn new(
        passwords: &PasswordService,
        emails: &dyn EmailValidator,
        new_user: NewUser<'_>,
    ) -> Result<Self> {
        Self::new_as_of(passwords, emails, new_user, Local::now().date_naive())
    }

    /// Validate and register a user, checking age against `today`
    ///
    /// Fields are validated in order (id, password, email, role, first
    /// name, last name, date of birth) and the first failure is returned.
    pub fn new_as_of(
        passwords: &PasswordService,
        emails: &dyn EmailValidator,
        new_user: NewUser<'_>,
        today: NaiveDate,
    ) -> Result<Self> {
        if new_user.user_id.trim().is_empty() {
            return Err(Error::input("User ID cannot be empty"));
        }
        let password_hash = passwords.validate_and_hash(new_user.password)?;
        let email = emails.normalize(new_user.email)?;
        let role = new_user.role;
        let first_name = validate_name(new_user.first_name, "First name")?;
        let last_name = validate_name(new_user.last_name, "Last name")?;
        let date_of_birth = parse_date_of_birth(new_user.date_of_birth, today)?;

        info!(user_id = %new_user.user_id, role = %role, "user registered");

        Ok(Self {
            id: new_user.user_id.to_string(),
            password_hash,
            first_name,
            last_name,
            date_of_birth,
            email,
            role,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    /// Date of birth in the MM/DD/YYYY registration format
    pub fn date_of_birth_string(&self) -> String {
        self.date_of_birth.format(DOB_FORMAT).to_string()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The opaque stored credential hash
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn set_first_name(&mut self, first_name: &str) -> Result<()> {
        self.first_name = validate_name(first_name, "First name")?;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: &str) -> Result<()> {
        self.last_name = validate_name(last_name, "Last name")?;
        Ok(())
    }

    /// Replace the email with the normalized form of `email`
    pub fn set_email(&mut self, emails: &dyn EmailValidator, email: &str) -> Result<()> {
        self.email = emails.normalize(email)?;
        info!(user_id = %self.id, "email changed");
        Ok(())
    }

    pub fn check_password(&self, passwords: &PasswordService, raw: &str) -> bool {
        passwords.check_password(raw, &self.password_hash)
    }

    /// Replace the credential after proving knowledge of the current one
    ///
    /// The stored hash is only replaced once the new password has been
    /// validated and hashed.
    pub fn change_password(
        &mut self,
        passwords: &PasswordService,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if !self.check_password(passwords, old_password) {
            warn!(user_id = %self.id, "password change rejected: current password mismatch");
            return Err(Error::invalid_password("Incorrect password"));
        }
        let new_hash = passwords.validate_and_hash(new_password)?;
        self.password_hash = new_hash;
        info!(user_id = %self.id, "password changed");
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User ID: {}", self.id)?;
        writeln!(f, "Name: {} {}", self.first_name, self.last_name)?;
        writeln!(f, "Email: {}", self.email)?;
        writeln!(f, "DOB: {}", self.date_of_birth_string())?;
        write!(f, "Role: {}", self.role)
    }
}

fn validate_name(name: &str, field: &str) -> Result<String> {
    validate_alpha_string(name, field, MAX_NAME_LEN, false).map(str::to_string)
}

// =============================================================================
// Customer
// =============================================================================

/// A user with the customer role and the accounts they own
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    #[serde(flatten)]
    user: User,
    accounts: BTreeMap<String, Account>,
}

impl Customer {
    /// Wrap a registered user; the user must have the customer role
    pub fn new(user: User) -> Result<Self> {
        if user.role() != Role::Customer {
            return Err(Error::input(format!(
                "Only users with the customer role can own accounts, got {}",
                user.role()
            )));
        }
        Ok(Self {
            user,
            accounts: BTreeMap::new(),
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }

    pub fn id(&self) -> &str {
        self.user.id()
    }

    /// Open a new account owned by this customer
    pub fn open_account(&mut self, account_id: &str, initial_deposit: Decimal) -> Result<&mut Account> {
        if self.accounts.contains_key(account_id) {
            return Err(Error::account(format!("Account {} already exists", account_id)));
        }
        let account = Account::new(account_id, self.user.id(), initial_deposit)?;
        Ok(self.accounts.entry(account_id.to_string()).or_insert(account))
    }

    /// Take ownership of an existing account
    pub fn add_account(&mut self, account: Account) -> Result<&mut Account> {
        if account.user_id() != self.user.id() {
            return Err(Error::account(format!(
                "Account {} is not owned by user {}",
                account.id(),
                self.user.id()
            )));
        }
        match self.accounts.entry(account.id().to_string()) {
            Entry::Occupied(entry) => Err(Error::account(format!(
                "Account {} already exists",
                entry.key()
            ))),
            Entry::Vacant(entry) => Ok(entry.insert(account)),
        }
    }

    pub fn account(&self, account_id: &str) -> Result<&Account> {
        self.accounts
            .get(account_id)
            .ok_or_else(|| Error::account(format!("Account {} not found", account_id)))
    }

    pub fn account_mut(&mut self, account_id: &str) -> Result<&mut Account> {
        self.accounts
            .get_mut(account_id)
            .ok_or_else(|| Error::account(format!("Account {} not found", account_id)))
    }

    /// Accounts ordered by id
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of the balances of every owned account
    ///
    /// Fails with an account error if the sum is not representable.
    pub fn total_balance(&self) -> Result<Decimal> {
        self.accounts
            .values()
            .try_fold(Decimal::ZERO, |total, account| total.checked_add(account.balance()))
            .ok_or_else(|| Error::account("Total balance overflows"))
    }

    /// Move funds between two of this customer's accounts
    ///
    /// The source records an intra-transfer and the destination a deposit
    /// with the `Transfer` method. Both records and both resulting balances
    /// are checked before either account changes, so the move is
    /// all-or-nothing.
    pub fn transfer_between_accounts(
        &mut self,
        source_id: &str,
        destination_id: &str,
        amount: Decimal,
        options: TransactionOptions,
    ) -> Result<()> {
        let user_id = self.user.id().to_string();

        let source = self.account(source_id)?;
        let destination = self.account(destination_id)?;

        let debit = source.prepare_internal_transfer(&user_id, amount, destination_id, options.clone())?;
        let mut credit_options = TransactionOptions::default().with_origin(source_id);
        if let Some(description) = options.description {
            credit_options = credit_options.with_description(description);
        }
        let credit = destination.prepare_deposit(&user_id, amount, DepositMethod::Transfer, credit_options)?;

        self.account_mut(source_id)?.apply(debit);
        self.account_mut(destination_id)?.apply(credit);

        info!(
            user_id = %user_id,
            source_account_id = %source_id,
            destination_account_id = %destination_id,
            "internal transfer completed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Argon2Params, RegexEmailValidator};
    use crate::domain::result::ErrorKind;
    use chrono::{Days, Months};

    fn passwords() -> PasswordService {
        PasswordService::argon2(Argon2Params::minimal()).unwrap()
    }

    fn jack() -> NewUser<'static> {
        NewUser {
            user_id: "Timmons001",
            password: "J@cksPassword1234",
            first_name: "Jack",
            last_name: "Timmons",
            date_of_birth: "03/27/1996",
            email: "jacktimmonsemail@gmail.com",
            role: Role::Customer,
        }
    }

    fn register(new_user: NewUser<'_>) -> Result<User> {
        User::new(&passwords(), &RegexEmailValidator, new_user)
    }

    fn dollars(units: i64) -> Decimal {
        Decimal::new(units * 100, 2)
    }

    #[test]
    fn test_user_creation() {
        let passwords = passwords();
        let user = User::new(&passwords, &RegexEmailValidator, jack()).unwrap();

        assert_eq!(user.id(), "Timmons001");
        assert!(user.check_password(&passwords, "J@cksPassword1234"));
        assert_eq!(user.email(), "jacktimmonsemail@gmail.com");
        assert_eq!(user.role(), Role::Customer);
        assert_eq!(user.first_name(), "Jack");
        assert_eq!(user.last_name(), "Timmons");
        assert_eq!(user.date_of_birth_string(), "03/27/1996");
        assert_ne!(user.password_hash(), "J@cksPassword1234");
    }

    #[test]
    fn test_empty_user_id() {
        let err = register(NewUser { user_id: "", ..jack() }).unwrap_err();
        assert_eq!(err, Error::input("User ID cannot be empty"));
    }

    #[test]
    fn test_weak_passwords() {
        for password in ["pass", "password", "PASSWORD", "passworD", "Password1", "P@ssw ord1"] {
            let err = register(NewUser { password, ..jack() }).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPassword, "password {:?}", password);
        }
    }

    #[test]
    fn test_invalid_names() {
        for first_name in ["", "Jac k", "Jack1"] {
            let err = register(NewUser { first_name, ..jack() }).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Input);
        }
        for last_name in ["", "Ti mmons"] {
            let err = register(NewUser { last_name, ..jack() }).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Input);
        }
    }

    #[test]
    fn test_invalid_dob() {
        for date_of_birth in ["", "1996-03-27", "12345"] {
            let err = register(NewUser { date_of_birth, ..jack() }).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDob);
        }
    }

    #[test]
    fn test_invalid_email() {
        let err = register(NewUser { email: "not-an-email", ..jack() }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_validation_is_fail_fast_in_order() {
        // Bad password, email and DOB at once: the password is checked first
        let err = register(NewUser {
            password: "pass",
            email: "nope",
            date_of_birth: "nope",
            ..jack()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPassword);

        // Bad email and name: email comes before names
        let err = register(NewUser { email: "nope", first_name: "", ..jack() }).unwrap_err();
        assert!(err.message().starts_with("Invalid email address"));
    }

    #[test]
    fn test_minimum_age_boundary() {
        let passwords = passwords();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let eighteen = today.checked_sub_months(Months::new(18 * 12)).unwrap();

        let exact = eighteen.format(DOB_FORMAT).to_string();
        let user = User::new_as_of(
            &passwords,
            &RegexEmailValidator,
            NewUser { date_of_birth: &exact, ..jack() },
            today,
        );
        assert!(user.is_ok());

        let short = (eighteen + Days::new(1)).format(DOB_FORMAT).to_string();
        let err = User::new_as_of(
            &passwords,
            &RegexEmailValidator,
            NewUser { date_of_birth: &short, ..jack() },
            today,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDob);
    }

    #[test]
    fn test_setters_validate() {
        let mut user = register(jack()).unwrap();

        user.set_first_name("John").unwrap();
        assert_eq!(user.first_name(), "John");

        assert!(user.set_last_name("Tim mons").is_err());
        assert_eq!(user.last_name(), "Timmons");

        user.set_email(&RegexEmailValidator, "John@EXAMPLE.com").unwrap();
        assert_eq!(user.email(), "John@example.com");

        assert!(user.set_email(&RegexEmailValidator, "").is_err());
        assert_eq!(user.email(), "John@example.com");
    }

    #[test]
    fn test_change_password() {
        let passwords = passwords();
        let mut user = User::new(&passwords, &RegexEmailValidator, jack()).unwrap();

        user.change_password(&passwords, "J@cksPassword1234", "N3w!Password")
            .unwrap();
        assert!(user.check_password(&passwords, "N3w!Password"));
        assert!(!user.check_password(&passwords, "J@cksPassword1234"));
    }

    #[test]
    fn test_change_password_wrong_old_password() {
        let passwords = passwords();
        let mut user = User::new(&passwords, &RegexEmailValidator, jack()).unwrap();
        let before = user.password_hash().to_string();

        let err = user
            .change_password(&passwords, "WrongPassword1!", "N3w!Password")
            .unwrap_err();
        assert_eq!(err, Error::invalid_password("Incorrect password"));
        assert_eq!(user.password_hash(), before);
    }

    #[test]
    fn test_change_password_weak_new_password_keeps_old() {
        let passwords = passwords();
        let mut user = User::new(&passwords, &RegexEmailValidator, jack()).unwrap();

        let err = user
            .change_password(&passwords, "J@cksPassword1234", "weak")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPassword);
        assert!(user.check_password(&passwords, "J@cksPassword1234"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = register(jack()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        for role in ["moderator", "user", "", "Admin"] {
            assert_eq!(role.parse::<Role>().unwrap_err().kind(), ErrorKind::Input);
        }
    }

    #[test]
    fn test_customer_requires_customer_role() {
        let admin = register(NewUser { role: Role::Admin, ..jack() }).unwrap();
        assert_eq!(Customer::new(admin).unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_customer_accounts() {
        let mut customer = Customer::new(register(jack()).unwrap()).unwrap();

        customer.open_account("Timm0001", dollars(1000)).unwrap();
        customer.open_account("Timm0002", dollars(50)).unwrap();
        assert_eq!(customer.account_count(), 2);
        assert_eq!(customer.total_balance().unwrap(), dollars(1050));

        let err = customer.open_account("Timm0001", dollars(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Account);

        let ids: Vec<_> = customer.accounts().map(Account::id).collect();
        assert_eq!(ids, ["Timm0001", "Timm0002"]);

        assert_eq!(customer.account("Nope0001").unwrap_err().kind(), ErrorKind::Account);
    }

    #[test]
    fn test_add_account_checks_owner() {
        let mut customer = Customer::new(register(jack()).unwrap()).unwrap();

        let foreign = Account::new("Other0001", "SomeoneElse", dollars(10)).unwrap();
        assert_eq!(customer.add_account(foreign).unwrap_err().kind(), ErrorKind::Account);

        let own = Account::new("Timm0003", "Timmons001", dollars(10)).unwrap();
        customer.add_account(own.clone()).unwrap();
        assert_eq!(customer.add_account(own).unwrap_err().kind(), ErrorKind::Account);
    }

    #[test]
    fn test_transfer_between_accounts() {
        let mut customer = Customer::new(register(jack()).unwrap()).unwrap();
        customer.open_account("Timm0001", dollars(1000)).unwrap();
        customer.open_account("Timm0002", dollars(0)).unwrap();

        customer
            .transfer_between_accounts(
                "Timm0001",
                "Timm0002",
                dollars(250),
                TransactionOptions::default().with_description("Savings"),
            )
            .unwrap();

        let source = customer.account("Timm0001").unwrap();
        let destination = customer.account("Timm0002").unwrap();
        assert_eq!(source.balance(), dollars(750));
        assert_eq!(destination.balance(), dollars(250));
        assert_eq!(destination.transactions()[0].origin(), Some("Timm0001"));
        assert_eq!(destination.transactions()[0].description(), Some("Savings"));
        assert_eq!(customer.total_balance().unwrap(), dollars(1000));
    }

    #[test]
    fn test_failed_transfer_changes_nothing() {
        let mut customer = Customer::new(register(jack()).unwrap()).unwrap();
        customer.open_account("Timm0001", dollars(100)).unwrap();
        customer.open_account("Timm0002", dollars(0)).unwrap();
        let before = customer.clone();

        // Insufficient funds
        let err = customer
            .transfer_between_accounts("Timm0001", "Timm0002", dollars(101), TransactionOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);

        // Same account on both sides
        let err = customer
            .transfer_between_accounts("Timm0001", "Timm0001", dollars(1), TransactionOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);

        // Unknown destination
        let err = customer
            .transfer_between_accounts("Timm0001", "Timm0009", dollars(1), TransactionOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Account);

        // Frozen destination: the debit was valid but must not be applied
        customer
            .account_mut("Timm0002")
            .unwrap()
            .set_status(crate::domain::AccountStatus::Frozen);
        let frozen = customer.clone();
        let err = customer
            .transfer_between_accounts("Timm0001", "Timm0002", dollars(1), TransactionOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Account);
        assert_eq!(customer, frozen);

        assert_eq!(
            customer.account("Timm0001").unwrap(),
            before.account("Timm0001").unwrap()
        );
    }

    #[test]
    fn test_transfer_credit_overflow_changes_nothing() {
        let mut customer = Customer::new(register(jack()).unwrap()).unwrap();
        customer.open_account("Timm0001", dollars(100)).unwrap();
        customer.open_account("Timm0002", Decimal::MAX).unwrap();
        let before = customer.clone();

        let err = customer
            .transfer_between_accounts("Timm0001", "Timm0002", dollars(1), TransactionOptions::default())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Deposit);
        assert_eq!(customer, before);
        assert_eq!(customer.total_balance().unwrap_err().kind(), ErrorKind::Account);
    }
}
