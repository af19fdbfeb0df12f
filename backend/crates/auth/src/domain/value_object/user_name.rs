//! User Name Value Object
//!
//! The user name is a public handle: used for login pages, profile URLs
//! and display. Uppercase input is accepted but the canonical form is
//! lowercase; the canonical form backs the unique index.
//!
//! ## Invariants
//! - 3 to 50 characters after NFKC normalization
//! - ASCII letters, digits and `_ . -` only
//! - Starts and ends with a letter, digit or `_`
//! - No consecutive dots

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// User name validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name must be at least {USER_NAME_MIN_LENGTH} characters")]
    TooShort,

    #[error("User name must be at most {USER_NAME_MAX_LENGTH} characters")]
    TooLong,

    #[error("User name contains invalid characters")]
    InvalidCharacter,

    #[error("User name must start and end with a letter, digit or underscore")]
    InvalidBoundary,
}

/// User name value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new user name with validation
    pub fn new(raw: impl Into<String>) -> Result<Self, UserNameError> {
        let original: String = raw.into().trim().nfkc().collect();
        let char_count = original.chars().count();

        if char_count < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort);
        }
        if char_count > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong);
        }

        if !original
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
        {
            return Err(UserNameError::InvalidCharacter);
        }

        if original.contains("..") {
            return Err(UserNameError::InvalidCharacter);
        }

        let first = original.chars().next().expect("length checked");
        let last = original.chars().next_back().expect("length checked");
        let boundary_ok = |c: char| c.is_ascii_alphanumeric() || c == '_';
        if !boundary_ok(first) || !boundary_ok(last) {
            return Err(UserNameError::InvalidBoundary);
        }

        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Restore from a trusted source (database row)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// As-entered form for display
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Lowercase form backing the unique index
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
