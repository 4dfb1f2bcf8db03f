//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (normalized/validated email,
//! E.164 phone numbers, sanitized rich text) so that once a value reaches
//! the domain layer it can be treated as trusted.

use std::fmt::{Display, Formatter};

use phonenumber::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = email.into().trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(TypeConstraintError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone number normalized to E.164.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Result<Self, TypeConstraintError> {
        let parsed =
            phonenumber::parse(None, raw).map_err(|_| TypeConstraintError::InvalidPhone)?;
        if !phonenumber::is_valid(&parsed) {
            return Err(TypeConstraintError::InvalidPhone);
        }
        Ok(Self(parsed.format().mode(Mode::E164).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Trimmed, non-empty free text with HTML stripped down to a safe subset.
///
/// Used for user-supplied rich text (chat messages, invoice notes) that is
/// later rendered verbatim by clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanitizedText(String);

impl SanitizedText {
    pub fn new<S: AsRef<str>>(raw: S) -> Result<Self, TypeConstraintError> {
        let cleaned = ammonia::clean(raw.as_ref()).trim().to_string();
        if cleaned.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SanitizedText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  USER@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn bad_email_is_rejected() {
        assert_eq!(Email::new("not-an-email"), Err(TypeConstraintError::InvalidEmail));
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        let phone = PhoneNumber::new("+1 650 253 0000").unwrap();
        assert_eq!(phone.as_str(), "+16502530000");
    }

    #[test]
    fn garbage_phone_is_rejected() {
        assert!(PhoneNumber::new("call me maybe").is_err());
    }

    #[test]
    fn text_is_sanitized() {
        let text = SanitizedText::new("hello <script>alert(1)</script>world").unwrap();
        assert!(!text.as_str().contains("script"));
        assert!(text.as_str().contains("hello"));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(
            SanitizedText::new("   "),
            Err(TypeConstraintError::EmptyString)
        );
    }
}
