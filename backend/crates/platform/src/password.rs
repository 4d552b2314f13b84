//! Password Policy and Hashing
//!
//! - Composition policy for new passwords (length, character classes, no
//!   ascending digit or letter runs)
//! - Argon2id hashing with optional pepper
//! - Zeroization of clear text on drop
//!
//! Verification of an existing password never applies the policy, so users
//! created under older rules can still sign in.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Length of a forbidden ascending run ("123", "abc")
const SEQUENCE_RUN: usize = 3;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violations, checked in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one special character")]
    MissingSpecial,

    #[error("Password must not contain consecutive numbers")]
    ConsecutiveDigits,

    #[error("Password must not contain consecutive letters")]
    ConsecutiveLetters,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, erased from memory when dropped
///
/// Not `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate a new password against the composition policy
    ///
    /// Input is NFKC-normalized first; lengths count Unicode code points.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::normalized(raw);
        check_policy(&candidate.0)?;
        Ok(candidate)
    }

    /// Wrap a password for verification only (no policy checks)
    pub fn for_verification(raw: String) -> Self {
        Self::normalized(raw)
    }

    fn normalized(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash with Argon2id (default OWASP parameters: m=19 MiB, t=2, p=1)
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let mut password_bytes = self.peppered(pepper);
        let salt = SaltString::generate(&mut OsRng);

        let result = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        password_bytes.zeroize();
        result
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a PHC string (e.g. from the database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash (constant time inside argon2)
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        let mut password_bytes = password.peppered(pepper);
        let valid = Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok();
        password_bytes.zeroize();
        valid
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Policy
// ============================================================================

fn check_policy(password: &str) -> Result<(), PasswordPolicyError> {
    if password.trim().is_empty() {
        return Err(PasswordPolicyError::EmptyOrWhitespace);
    }

    let char_count = password.chars().count();
    if char_count < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: char_count,
        });
    }
    if char_count > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: char_count,
        });
    }

    if password
        .chars()
        .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
    {
        return Err(PasswordPolicyError::InvalidCharacter);
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PasswordPolicyError::MissingSpecial);
    }

    if has_ascending_run(password, |c| c.is_ascii_digit(), true) {
        return Err(PasswordPolicyError::ConsecutiveDigits);
    }
    if has_ascending_run(&password.to_ascii_lowercase(), |c| c.is_ascii_lowercase(), false) {
        return Err(PasswordPolicyError::ConsecutiveLetters);
    }

    Ok(())
}

/// Detect `SEQUENCE_RUN` adjacent characters of one class, each one code
/// point above the previous. With `wraps`, `9` is followed by `0` ("890").
fn has_ascending_run(s: &str, class: impl Fn(char) -> bool, wraps: bool) -> bool {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(SEQUENCE_RUN).any(|w| {
        w.iter().all(|&c| class(c))
            && w.windows(2).all(|pair| {
                let (a, b) = (pair[0] as u32, pair[1] as u32);
                b == a + 1 || (wraps && pair[0] == '9' && pair[1] == '0')
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(pw: &str) -> Result<(), PasswordPolicyError> {
        ClearTextPassword::new(pw.to_string()).map(|_| ())
    }

    #[test]
    fn test_valid_password() {
        assert!(policy("Segura#2024!").is_ok());
        assert!(policy("Mi.Clave-Fuerte9").is_ok());
    }

    #[test]
    fn test_length_rules() {
        assert!(matches!(
            policy("Ab#1"),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 4 })
        ));
        let long = format!("Aa#{}", "x".repeat(MAX_PASSWORD_LENGTH));
        assert!(matches!(policy(&long), Err(PasswordPolicyError::TooLong { .. })));
        assert_eq!(policy("        "), Err(PasswordPolicyError::EmptyOrWhitespace));
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(policy("segura#2024!"), Err(PasswordPolicyError::MissingUppercase));
        assert_eq!(policy("SEGURA#2024!"), Err(PasswordPolicyError::MissingLowercase));
        assert_eq!(policy("Segura2024x"), Err(PasswordPolicyError::MissingSpecial));
        assert_eq!(policy("Seg\u{7}ura#20!"), Err(PasswordPolicyError::InvalidCharacter));
    }

    #[test]
    fn test_consecutive_digits() {
        assert_eq!(policy("Clave#123x"), Err(PasswordPolicyError::ConsecutiveDigits));
        assert_eq!(policy("Clave#890x"), Err(PasswordPolicyError::ConsecutiveDigits));
        // descending runs are allowed
        assert!(policy("Clave#321x").is_ok());
    }

    #[test]
    fn test_consecutive_letters_case_insensitive() {
        assert_eq!(policy("xAbC#2024!"), Err(PasswordPolicyError::ConsecutiveLetters));
        assert_eq!(policy("Seguro#xyz9"), Err(PasswordPolicyError::ConsecutiveLetters));
        assert!(policy("Seguro#2024").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("Segura#2024!".to_string()).unwrap();
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None));
        let wrong = ClearTextPassword::for_verification("Segura#2025!".to_string());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::for_verification("Segura#2024!".to_string());
        let hashed = password.hash(Some(b"pepper")).unwrap();

        assert!(hashed.verify(&password, Some(b"pepper")));
        assert!(!hashed.verify(&password, None));
    }

    #[test]
    fn test_phc_string() {
        let password = ClearTextPassword::for_verification("Segura#2024!".to_string());
        let hashed = password.hash(None).unwrap();
        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));

        assert!(HashedPassword::from_phc_string("plaintext").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
