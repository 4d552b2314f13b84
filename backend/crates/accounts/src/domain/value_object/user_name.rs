//! User Name Value Object
//!
//! The handle a user signs in with.
//!
//! ## Rules
//! - 1 to 150 characters after NFKC normalization and trimming
//! - Letters, digits and `@ . + - _` only (letters may be non-ASCII)
//! - Uniqueness is decided on the canonical form (NFKC, lowercase), so
//!   `Ana` and `ana` cannot both exist

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 1;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['@', '.', '+', '-', '_'];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains invalid character
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only letters, digits and @/./+/-/_ are allowed"
                )
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized user name
///
/// # Storage
/// - `original`: trimmed, NFKC normalized, case preserved (displayed)
/// - `canonical`: lowercase form used for lookups and uniqueness
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Normalize and validate raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize_original(input.as_ref());
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from database values (assumed already validated)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// Canonical form of arbitrary input, for lookups during sign-in
    pub fn canonicalize(input: &str) -> String {
        Self::normalize_original(input).to_lowercase()
    }

    fn normalize_original(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(original: &str) -> Result<(), UserNameError> {
        let length = original.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::Empty);
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in original.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter { char: ch, position });
            }
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod normalization {
        use super::*;

        #[test]
        fn test_trim_and_case() {
            let name = UserName::new("  Laura.Gomez  ").unwrap();
            assert_eq!(name.original(), "Laura.Gomez");
            assert_eq!(name.canonical(), "laura.gomez");
        }

        #[test]
        fn test_nfkc_normalization() {
            // Fullwidth letters fold to ASCII
            let name = UserName::new("ＡＢＣ").unwrap();
            assert_eq!(name.original(), "ABC");
            assert_eq!(name.canonical(), "abc");
        }

        #[test]
        fn test_canonicalize_matches_new() {
            let name = UserName::new("Dr.Ruiz").unwrap();
            assert_eq!(UserName::canonicalize(" DR.RUIZ "), name.canonical());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_allowed_characters() {
            assert!(UserName::new("a").is_ok());
            assert!(UserName::new("user@clinic").is_ok());
            assert!(UserName::new("first.last+tag-1_x").is_ok());
            assert!(UserName::new("José").is_ok());
        }

        #[test]
        fn test_empty_fails() {
            assert_eq!(UserName::new(""), Err(UserNameError::Empty));
            assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        }

        #[test]
        fn test_length_limit() {
            assert!(UserName::new("a".repeat(150)).is_ok());
            assert!(matches!(
                UserName::new("a".repeat(151)),
                Err(UserNameError::TooLong { length: 151, .. })
            ));
        }

        #[test]
        fn test_invalid_characters() {
            assert!(matches!(
                UserName::new("has space"),
                Err(UserNameError::InvalidCharacter { char: ' ', position: 3 })
            ));
            assert!(UserName::new("semi;colon").is_err());
            assert!(UserName::new("slash/name").is_err());
        }
    }

    #[test]
    fn test_serde() {
        let name: UserName = serde_json::from_str("\"Ana\"").unwrap();
        assert_eq!(name.canonical(), "ana");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Ana\"");
        assert!(serde_json::from_str::<UserName>("\"bad name\"").is_err());
    }
}
