//! Regex-based email syntax adapter

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::result::{Error, Result};
use crate::ports::EmailValidator;

const MAX_LOCAL_LEN: usize = 64;
const MAX_ADDRESS_LEN: usize = 254;

/// RFC 5322 dot-atom: atext runs separated by single dots
static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("local part pattern is valid")
});

/// Hostname labels followed by an alphabetic top-level domain
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("domain pattern is valid")
});

/// [`EmailValidator`] checking address syntax only
///
/// The local part is kept as written; the domain is lowercased.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexEmailValidator;

impl RegexEmailValidator {
    pub fn new() -> Self {
        Self
    }
}

fn invalid(reason: impl std::fmt::Display) -> Error {
    Error::input(format!("Invalid email address: {}", reason))
}

impl EmailValidator for RegexEmailValidator {
    fn normalize(&self, email: &str) -> Result<String> {
        if email.trim().is_empty() {
            return Err(Error::input("Email cannot be empty"));
        }
        let (local, domain) = email
            .rsplit_once('@')
            .ok_or_else(|| invalid("An email address must have an @-sign"))?;

        if local.is_empty() {
            return Err(invalid("There must be something before the @-sign"));
        }
        if local.chars().count() > MAX_LOCAL_LEN {
            return Err(invalid("The email address is too long before the @-sign"));
        }
        if !LOCAL_PART.is_match(local) {
            return Err(invalid("The email address contains invalid characters before the @-sign"));
        }
        if domain.is_empty() {
            return Err(invalid("There must be something after the @-sign"));
        }
        if !DOMAIN.is_match(domain) {
            return Err(invalid(format!("The domain name {} is not valid", domain)));
        }

        let normalized = format!("{}@{}", local, domain.to_ascii_lowercase());
        if normalized.len() > MAX_ADDRESS_LEN {
            return Err(invalid("The email address is too long"));
        }
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::ErrorKind;

    #[test]
    fn test_valid_addresses() {
        let validator = RegexEmailValidator::new();
        for email in [
            "jacktimmonsemail@gmail.com",
            "first.last+tag@example.co.uk",
            "o'brien@mail-server.example.org",
        ] {
            assert_eq!(validator.normalize(email).unwrap(), email);
        }
    }

    #[test]
    fn test_domain_is_lowercased() {
        let validator = RegexEmailValidator::new();
        assert_eq!(validator.normalize("Jack.T@GMAIL.COM").unwrap(), "Jack.T@gmail.com");
    }

    #[test]
    fn test_invalid_addresses() {
        let validator = RegexEmailValidator::new();
        for email in [
            "",
            "   ",
            "plainaddress",
            "@example.com",
            "user@",
            "user@localhost",
            "user@exa mple.com",
            "us er@example.com",
            "user..name@example.com",
            ".user@example.com",
            "user@-example.com",
            "user@example.c0m",
        ] {
            let err = validator.normalize(email).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Input, "email {:?}", email);
        }
    }

    #[test]
    fn test_length_limits() {
        let validator = RegexEmailValidator::new();
        let local = "a".repeat(MAX_LOCAL_LEN + 1);
        assert!(validator.normalize(&format!("{}@example.com", local)).is_err());

        let label = "d".repeat(60);
        let domain = format!("{0}.{0}.{0}.{0}.{0}.com", label);
        assert!(validator.normalize(&format!("user@{}", domain)).is_err());
    }
}
