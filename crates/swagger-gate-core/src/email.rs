//! Email address handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address as reported by the identity provider.
///
/// No syntax validation is performed on construction: authorization decisions
/// must fail closed on malformed values rather than reject them up front, so
/// the raw string is kept and `domain` returns `None` when it is ambiguous.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Wrap a raw email string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the part after the `@`.
    ///
    /// Returns `None` unless the address contains exactly one `@`.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        let mut parts = self.0.split('@');
        let _local = parts.next()?;
        let domain = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(domain)
    }
}

impl fmt::Debug for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmailAddress({})", self.0)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EmailAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EmailAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_simple_address() {
        let email = EmailAddress::new("a@x.com");
        assert_eq!(email.domain(), Some("x.com"));
    }

    #[test]
    fn domain_requires_exactly_one_at() {
        assert_eq!(EmailAddress::new("bad-email").domain(), None);
        assert_eq!(EmailAddress::new("a@b@x.com").domain(), None);
        assert_eq!(EmailAddress::new("").domain(), None);
    }

    #[test]
    fn empty_domain_is_returned_as_empty() {
        assert_eq!(EmailAddress::new("a@").domain(), Some(""));
    }

    #[test]
    fn serializes_as_plain_string() {
        let email = EmailAddress::new("a@x.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@x.com\"");
    }
}
