//! Email allow-list authorization.

use std::collections::HashSet;

use swagger_gate_core::EmailAddress;

use crate::error::{AuthError, Result};

/// Exact addresses and whole domains permitted to use the service.
///
/// Loaded once at startup and read-only afterwards. Matching is exact; the
/// provider reports canonical addresses, so no case folding is applied.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    emails: HashSet<String>,
    domains: HashSet<String>,
}

impl AllowList {
    /// Build an allow-list from configured addresses and domains.
    ///
    /// Entries are trimmed and empty entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a domain entry contains `@`.
    pub fn new<E, D>(emails: E, domains: D) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let emails = normalize(emails);
        let domains = normalize(domains);

        if let Some(bad) = domains.iter().find(|d| d.contains('@')) {
            return Err(AuthError::Config(format!(
                "allowed domain {bad:?} must not contain '@'"
            )));
        }

        Ok(Self { emails, domains })
    }

    /// Whether `email` may use the service.
    ///
    /// True if the address is listed exactly, or if it has exactly one `@`
    /// and the part after it is a listed domain.
    #[must_use]
    pub fn is_permitted(&self, email: &str) -> bool {
        if self.emails.contains(email) {
            return true;
        }

        EmailAddress::new(email)
            .domain()
            .is_some_and(|domain| self.domains.contains(domain))
    }

    /// Whether nobody at all could be permitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.domains.is_empty()
    }

    /// Number of exact addresses.
    #[must_use]
    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    /// Number of domains.
    #[must_use]
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

fn normalize<I>(items: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
