//! validated donor display name.
//!
//! names are 2-100 characters after trimming surrounding whitespace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// minimum length for a display name, in characters.
pub const MIN_DISPLAY_NAME_CHARS: usize = 2;

/// maximum length for a display name, in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 100;

/// a validated donor display name.
///
/// guaranteed to be 2-100 unicode characters with no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// create a new display name, trimming and validating the input.
    pub fn new(s: impl Into<String>) -> Result<Self, DisplayNameError> {
        let s = s.into();
        let trimmed = s.trim();

        let chars = trimmed.chars().count();
        if chars < MIN_DISPLAY_NAME_CHARS {
            return Err(DisplayNameError::TooShort(chars));
        }
        if chars > MAX_DISPLAY_NAME_CHARS {
            return Err(DisplayNameError::TooLong(chars));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// consume the name and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DisplayName {
    type Err = DisplayNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// serde: deserialize with validation
impl<'de> Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DisplayName::new(s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for DisplayName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// error type for display name validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayNameError {
    /// name is shorter than the minimum after trimming.
    #[error("name too short ({0} chars, min {min})", min = MIN_DISPLAY_NAME_CHARS)]
    TooShort(usize),

    /// name exceeds the maximum length.
    #[error("name too long ({0} chars, max {max})", max = MAX_DISPLAY_NAME_CHARS)]
    TooLong(usize),
}
