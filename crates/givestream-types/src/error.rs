//! shared error type for givestream domain operations.

use crate::{DisplayNameError, EmailError, PhoneNumberError};

/// errors arising from domain-level validation and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// phone number failed validation.
    #[error(transparent)]
    Phone(#[from] PhoneNumberError),

    /// display name failed validation.
    #[error(transparent)]
    DisplayName(#[from] DisplayNameError),

    /// email failed validation.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// an enumeration value was not recognised.
    #[error("unknown {kind} value: {value}")]
    UnknownVariant {
        /// which enumeration was being parsed.
        kind: &'static str,
        /// the rejected input.
        value: String,
    },

    /// a monetary amount was below the minimum.
    #[error("amount must be at least 1, got {0}")]
    AmountTooSmall(i64),

    /// a free-text field exceeded its limit.
    #[error("{field} exceeds {max} characters")]
    TooLong {
        /// the offending field.
        field: &'static str,
        /// the configured maximum.
        max: usize,
    },
}
