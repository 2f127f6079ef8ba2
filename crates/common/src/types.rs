//! User identity types.
//!
//! A chat user is identified by an opaque numeric [`UserId`] that never changes,
//! and optionally carries a [`Handle`] (the `@username`) that the user can change
//! at any time. Roster membership is keyed by `UserId`; admin privilege is keyed
//! by the normalized `Handle`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum handle length accepted by [`Handle::parse`].
pub const MAX_HANDLE_LEN: usize = 32;

/// Opaque platform user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// Why a raw string is not a valid handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("handle is empty")]
    Empty,

    #[error("handle is {0} characters, maximum is {max}", max = MAX_HANDLE_LEN)]
    TooLong(usize),

    #[error("handle contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Normalized user handle.
///
/// Parsing strips surrounding whitespace and one leading `@`, then lowercases
/// the remainder. Only ASCII letters, digits and `_` are accepted, so two
/// spellings of the same handle (`@Alice`, `alice`) compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse and normalize a raw handle.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let trimmed = raw.trim();
        let bare = trimmed.strip_prefix('@').unwrap_or(trimmed);

        if bare.is_empty() {
            return Err(HandleError::Empty);
        }

        if let Some(bad) = bare
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(HandleError::InvalidCharacter(bad));
        }

        // All characters are ASCII here, so byte length == char count.
        if bare.len() > MAX_HANDLE_LEN {
            return Err(HandleError::TooLong(bare.len()));
        }

        Ok(Self(bare.to_ascii_lowercase()))
    }

    /// The normalized handle without the `@` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}
