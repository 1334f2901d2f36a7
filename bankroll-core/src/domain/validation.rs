//! Reusable field validators
//!
//! Every entity validates its fields through these helpers so the shape
//! rules (emptiness, length, character classes, sign) live in one place.
//! All failures are [`Error::Input`]; entities re-label them into their own
//! error kind where the domain calls for it.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Date format accepted for dates of birth
pub const DOB_FORMAT: &str = "%m/%d/%Y";

/// Minimum age, in whole years, for a registered user
pub const MINIMUM_AGE: i32 = 18;

/// Validate a string field
///
/// Fails if the value is empty (unless `optional`) or longer than
/// `max_length` characters. An empty optional value is returned as-is
/// without further checks.
pub fn validate_string<'a>(
    value: &'a str,
    name: &str,
    max_length: usize,
    optional: bool,
) -> Result<&'a str> {
    if value.is_empty() {
        if optional {
            return Ok(value);
        }
        return Err(Error::input(format!("{} cannot be empty", name)));
    }
    if value.chars().count() > max_length {
        return Err(Error::input(format!(
            "{} cannot exceed {} characters",
            name, max_length
        )));
    }
    Ok(value)
}

/// Validate a string field that may only contain letters and digits
pub fn validate_alnum_string<'a>(
    value: &'a str,
    name: &str,
    max_length: usize,
    optional: bool,
) -> Result<&'a str> {
    let value = validate_string(value, name, max_length, optional)?;
    if !value.chars().all(char::is_alphanumeric) {
        return Err(Error::input(format!("{} must be alphanumeric", name)));
    }
    Ok(value)
}

/// Validate a string field that may only contain letters
pub fn validate_alpha_string<'a>(
    value: &'a str,
    name: &str,
    max_length: usize,
    optional: bool,
) -> Result<&'a str> {
    let value = validate_string(value, name, max_length, optional)?;
    if !value.chars().all(char::is_alphabetic) {
        return Err(Error::input(format!("{} must contain only letters", name)));
    }
    Ok(value)
}

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(value: Decimal, name: &str) -> Result<Decimal> {
    if value <= Decimal::ZERO {
        return Err(Error::input(format!("{} must be greater than 0", name)));
    }
    Ok(value)
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(value: Decimal, name: &str) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(Error::input(format!(
            "{} must be greater than or equal to 0",
            name
        )));
    }
    Ok(value)
}

/// Whole years between `born` and `today`
pub fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (born.month(), born.day());
    today.year() - born.year() - i32::from(before_birthday)
}

/// Parse a MM/DD/YYYY date of birth and require [`MINIMUM_AGE`] on `today`
pub fn parse_date_of_birth(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let born = NaiveDate::parse_from_str(raw.trim(), DOB_FORMAT)
        .map_err(|_| Error::invalid_dob("DOB must be a string in the format MM/DD/YYYY"))?;
    if age_on(born, today) < MINIMUM_AGE {
        return Err(Error::invalid_dob(format!(
            "User must be at least {} years old",
            MINIMUM_AGE
        )));
    }
    Ok(born)
}
