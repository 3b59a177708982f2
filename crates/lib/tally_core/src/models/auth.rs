//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request and
//! response shapes in `tally_api::models`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected email input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid email address")]
pub struct InvalidEmail;

/// A validated, normalised email address (trimmed and lower-cased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and normalise raw input.
    pub fn parse(raw: &str) -> Result<Self, InvalidEmail> {
        let normalised = raw.trim().to_lowercase();
        let (local, domain) = normalised.split_once('@').ok_or(InvalidEmail)?;
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Wrap an email read back from storage, which was validated on write.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Email,
    /// bcrypt hash; `None` for federation-only accounts.
    pub password_hash: Option<String>,
    /// Identity-provider subject; `None` until a federated login links one.
    pub federated_subject: Option<String>,
}

/// A user about to be created.
///
/// Only constructible with at least one credential, so a stored user can
/// always sign in some way.
#[derive(Debug, Clone)]
pub struct NewUser {
    email: Email,
    password_hash: Option<String>,
    federated_subject: Option<String>,
}

impl NewUser {
    /// Local-auth user with a pre-computed password hash.
    pub fn local(email: Email, password_hash: String) -> Self {
        Self {
            email,
            password_hash: Some(password_hash),
            federated_subject: None,
        }
    }

    /// Federation-only user provisioned on first login.
    pub fn federated(email: Email, subject: String) -> Self {
        Self {
            email,
            password_hash: None,
            federated_subject: Some(subject),
        }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn federated_subject(&self) -> Option<&str> {
        self.federated_subject.as_deref()
    }

    /// Attach a store-assigned id.
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            federated_subject: self.federated_subject,
        }
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Claims taken from a verified identity-provider assertion.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalised() {
        let email = Email::parse("  A@B.com ").unwrap();
        assert_eq!(email.as_str(), "a@b.com");
    }

    #[test]
    fn email_rejects_malformed_input() {
        for raw in ["", "no-at-sign", "@b.com", "a@", "a@b@c", "a b@c.com"] {
            assert_eq!(Email::parse(raw), Err(InvalidEmail), "accepted {raw:?}");
        }
    }

    #[test]
    fn new_user_keeps_its_credential() {
        let email = Email::parse("a@b.com").unwrap();
        let local = NewUser::local(email.clone(), "hash".into()).into_user("u1".into());
        assert_eq!(local.password_hash.as_deref(), Some("hash"));
        assert!(local.federated_subject.is_none());

        let fed = NewUser::federated(email, "sub-1".into()).into_user("u2".into());
        assert!(fed.password_hash.is_none());
        assert_eq!(fed.federated_subject.as_deref(), Some("sub-1"));
    }
}
