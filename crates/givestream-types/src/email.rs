//! validated email address type for donor contacts and admin accounts.
//!
//! uses the `email_address` crate for RFC-compliant validation.

use std::fmt;
use std::str::FromStr;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

/// a validated email address.
///
/// wraps `email_address::EmailAddress` so that malformed addresses are
/// rejected at parse time, including during deserialisation. admin account
/// emails are additionally lowercased before storage via [`Email::lowercased`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(EmailAddress);

impl Email {
    /// create a new email, validating the format.
    pub fn new(s: &str) -> Result<Self, EmailError> {
        let addr = EmailAddress::from_str(s).map_err(|_| EmailError::Invalid)?;
        Ok(Self(addr))
    }

    /// get the email as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// the address lowercased, as stored for admin accounts.
    pub fn lowercased(&self) -> String {
        self.0.as_str().to_lowercase()
    }

    /// consume the email and return the inner string.
    pub fn into_inner(self) -> String {
        self.0.to_string()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// serde: deserialize with validation
impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Email::new(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Email {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

/// error type for email validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    /// email format is invalid.
    #[error("invalid email format")]
    Invalid,
}
