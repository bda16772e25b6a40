//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string exceeds the RFC 5321 length limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is missing an @ symbol, local part, or domain.
    #[error("email must have the form local@domain")]
    Malformed,
}

/// A validated email address.
///
/// Emails identify principals throughout the admin panel, and they double as
/// Firestore document ids in the legacy `admins` collection (see
/// [`Email::legacy_doc_id`] for the escaped historical scheme).
///
/// ## Examples
///
/// ```
/// use gita_admin_core::Email;
///
/// assert!(Email::parse("admin@gitagita.com").is_ok());
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@gitagita.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or does not have a non-empty local part and domain around an @ symbol.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::Malformed)?;
        if at_pos == 0 || at_pos == s.len() - 1 {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Derive the escaped admin-document id used by the older key scheme.
    ///
    /// Historical admin records were stored under ids that could not contain
    /// `.` or `@`, so the email was escaped: every `.` becomes `,` and `@`
    /// becomes `_at_`. Newer records use the raw email string as the id, and
    /// lookups must try both forms.
    ///
    /// ```
    /// use gita_admin_core::Email;
    ///
    /// let email = Email::parse("a.b@x.com").unwrap();
    /// assert_eq!(email.legacy_doc_id(), "a,b_at_x,com");
    /// ```
    #[must_use]
    pub fn legacy_doc_id(&self) -> String {
        self.0.replace('.', ",").replace('@', "_at_")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
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
    fn test_parse_valid_emails() {
        assert!(Email::parse("admin@gitagita.com").is_ok());
        assert!(Email::parse("user.name+tag@example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Email::parse("no-at-symbol"),
            Err(EmailError::Malformed)
        ));
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::Malformed)
        ));
        assert!(matches!(Email::parse("user@"), Err(EmailError::Malformed)));
    }

    #[test]
    fn test_legacy_doc_id() {
        let email = Email::parse("a.b@x.com").unwrap();
        assert_eq!(email.legacy_doc_id(), "a,b_at_x,com");

        // No dots in the local part: only the @ is escaped.
        let email = Email::parse("admin@gitagita.com").unwrap();
        assert_eq!(email.legacy_doc_id(), "admin_at_gitagita,com");
    }

    #[test]
    fn test_serde_roundtrip() {
        let email = Email::parse("admin@gitagita.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"admin@gitagita.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "admin@gitagita.com".parse().unwrap();
        assert_eq!(email.as_str(), "admin@gitagita.com");
    }
}
