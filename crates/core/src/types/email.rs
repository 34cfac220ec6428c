//! Email address type.
//!
//! Accounts are keyed by email on the backend. The client only checks the
//! shape of the address: the server remains the authority on deliverability.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty or only whitespace.
    #[error("email cannot be empty")]
    Empty,
    /// The input is longer than [`Email::MAX_LENGTH`].
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not split into exactly one local part and one domain.
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    /// The local part or domain is empty.
    #[error("email must have text on both sides of the @ symbol")]
    MissingPart,
}

/// A syntactically valid email address.
///
/// Deserialization validates too, so a corrupt persisted user record with a
/// mangled email fails to parse instead of producing a half-valid `User`.
///
/// ```
/// use atelier_core::Email;
///
/// let email = Email::parse("  shopper@atelier.test ").unwrap();
/// assert_eq!(email.as_str(), "shopper@atelier.test");
/// assert_eq!(email.domain(), "atelier.test");
///
/// assert!(Email::parse("shopper.atelier.test").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or is not of
    /// the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::AtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let email = Email::parse("\tnia@atelier.test\n").unwrap();
        assert_eq!(email.as_str(), "nia@atelier.test");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_overlong() {
        let long = format!("{}@atelier.test", "x".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(Email::parse("no-at"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("two@at@signs"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("@atelier.test"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("nia@"), Err(EmailError::MissingPart));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Email = serde_json::from_str("\"nia@atelier.test\"").unwrap();
        assert_eq!(ok.domain(), "atelier.test");

        let bad: Result<Email, _> = serde_json::from_str("\"not-an-email\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("nia@atelier.test").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"nia@atelier.test\""
        );
    }
}
