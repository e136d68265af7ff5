//! validated contact phone number type.
//!
//! accepted numbers must:
//! - optionally start with `+`
//! - Start with a nonzero digit
//! - Contain at most 15 further digits and nothing else
//!
//! erased records store a fixed sentinel instead of a number; the sentinel is
//! representable via [`PhoneNumber::erased`] but never accepted as input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// the value stored in place of a phone number after pii erasure.
pub const ERASED_PHONE_SENTINEL: &str = "erased";

/// maximum number of digits after the leading one.
const MAX_TRAILING_DIGITS: usize = 15;

/// a validated contact phone number (or the erasure sentinel).
///
/// # Example
/// ```
/// use givestream_types::PhoneNumber;
///
/// let phone: PhoneNumber = "+1234567890".parse().unwrap();
/// assert_eq!(phone.as_str(), "+1234567890");
/// assert!(!phone.is_erased());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// create a new phone number, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, PhoneNumberError> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// the sentinel value standing in for an erased number.
    pub fn erased() -> Self {
        Self(ERASED_PHONE_SENTINEL.to_string())
    }

    /// whether this value is the erasure sentinel rather than a real number.
    pub fn is_erased(&self) -> bool {
        self.0 == ERASED_PHONE_SENTINEL
    }

    /// get the phone number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// consume the phone number and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(s: &str) -> Result<(), PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let digits = s.strip_prefix('+').unwrap_or(s);

        let mut chars = digits.chars();
        match chars.next() {
            None => return Err(PhoneNumberError::Empty),
            Some('0') => return Err(PhoneNumberError::LeadingZero),
            Some(c) if c.is_ascii_digit() => {}
            Some(_) => return Err(PhoneNumberError::InvalidCharacters),
        }

        let trailing = chars.as_str();
        if !trailing.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacters);
        }
        if trailing.len() > MAX_TRAILING_DIGITS {
            return Err(PhoneNumberError::TooLong(digits.len()));
        }

        Ok(())
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// serde: deserialize with validation
impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// error type for phone number validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneNumberError {
    /// phone number cannot be empty.
    #[error("phone number cannot be empty")]
    Empty,

    /// phone number has too many digits.
    #[error("phone number too long ({0} digits, max {max})", max = MAX_TRAILING_DIGITS + 1)]
    TooLong(usize),

    /// phone number cannot start with zero.
    #[error("phone number cannot start with zero")]
    LeadingZero,

    /// phone number contains characters other than digits.
    #[error("phone number must be an optional '+' followed by digits only")]
    InvalidCharacters,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn valid_pattern_accepted(s in "[+]?[1-9][0-9]{0,15}") {
            let phone = PhoneNumber::new(&s);
            prop_assert!(phone.is_ok(), "{} should be accepted", s);

            let phone = phone.unwrap();
            prop_assert!(!phone.is_erased());

            // roundtrip through serde
            let json = serde_json::to_string(&phone).unwrap();
            let parsed: PhoneNumber = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed, phone);
        }

        #[test]
        fn arbitrary_string_never_panics(s in ".*") {
            let _ = PhoneNumber::new(&s);
        }

        #[test]
        fn leading_zero_rejected(s in "[+]?0[0-9]{0,14}") {
            prop_assert!(PhoneNumber::new(&s).is_err());
        }

        #[test]
        fn too_many_digits_rejected(s in "[1-9][0-9]{16,30}") {
            prop_assert!(matches!(
                PhoneNumber::new(&s).unwrap_err(),
                PhoneNumberError::TooLong(_)
            ));
        }

        #[test]
        fn non_digit_tail_rejected(head in "[1-9][0-9]{0,5}", tail in "[a-zA-Z !.-]{1,5}") {
            let input = format!("{}{}", head, tail);
            prop_assert!(PhoneNumber::new(&input).is_err());
        }
    }
}
