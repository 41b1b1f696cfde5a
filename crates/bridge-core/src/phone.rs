//! E.164 phone number validation and normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Country code assumed for bare national numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// Minimum number of digits after the `+`.
const MIN_DIGITS: usize = 8;

/// Maximum number of digits after the `+` (ITU-T E.164).
const MAX_DIGITS: usize = 15;

/// A phone number in canonical E.164 form (`+` followed by 8-15 digits).
///
/// Only constructible through [`validate_phone_number`] or
/// [`normalize_to_e164`], so holding one means the check already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct E164(String);

impl E164 {
    /// The canonical string, including the leading `+`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for E164 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for E164 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for E164 {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_phone_number(&value)
    }
}

impl From<E164> for String {
    fn from(value: E164) -> Self {
        value.0
    }
}

/// Validate a strict E.164 number: `+[1-9]` followed by 7-14 more digits.
pub fn validate_phone_number(raw: &str) -> Result<E164, ValidationError> {
    let Some(digits) = raw.strip_prefix('+') else {
        return Err(ValidationError::InvalidPhone(format!(
            "{raw:?} must start with '+'"
        )));
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone(format!(
            "{raw:?} may only contain digits after '+'"
        )));
    }

    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
        return Err(ValidationError::InvalidPhone(format!(
            "{raw:?} must have {MIN_DIGITS}-{MAX_DIGITS} digits, found {}",
            digits.len()
        )));
    }

    if digits.starts_with('0') {
        return Err(ValidationError::InvalidPhone(format!(
            "{raw:?} country code cannot start with 0"
        )));
    }

    Ok(E164(raw.to_string()))
}

/// Normalize user input to E.164.
///
/// Accepted shapes, tried in order:
/// 1. Already valid E.164 (surrounding whitespace ignored)
/// 2. International form with formatting, e.g. `+44 20 7946 0958`
/// 3. Bare 10-digit national number, prefixed with `default_country_code`
/// 4. 11 digits starting with `1`, prefixed with `+`
/// 5. Anything else: non-digits stripped, `default_country_code` prefixed
///
/// The result always goes back through [`validate_phone_number`].
pub fn normalize_to_e164(raw: &str, default_country_code: &str) -> Result<E164, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("phone number"));
    }

    if let Ok(phone) = validate_phone_number(trimmed) {
        return Ok(phone);
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ValidationError::InvalidPhone(format!(
            "{trimmed:?} contains no digits"
        )));
    }

    let candidate = if trimmed.starts_with('+') {
        format!("+{digits}")
    } else if digits.len() == 10 {
        format!("+{default_country_code}{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        format!("+{digits}")
    } else {
        format!("+{default_country_code}{digits}")
    };

    validate_phone_number(&candidate)
}
