//! User Entity
//!
//! The signed-in identity as reported by the identity service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session token issued by the identity service
///
/// Never inspected by this crate and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for handing back to the identity service
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Standard attributes collected at sign up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub given_name: String,
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserAttributes {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Build from `(name, value)` attribute pairs, ignoring unknown names
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut attributes = Self::default();
        for (name, value) in pairs {
            match name {
                "given_name" => attributes.given_name = value.to_string(),
                "family_name" => attributes.family_name = value.to_string(),
                "email" => attributes.email = Some(value.to_string()),
                _ => {}
            }
        }
        attributes
    }

    /// "Given Family"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    /// First character of the given name followed by the first character of
    /// the family name, case preserved
    pub fn initials(&self) -> String {
        self.given_name
            .chars()
            .next()
            .into_iter()
            .chain(self.family_name.chars().next())
            .collect()
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User name as known to the identity service
    pub username: String,
    pub attributes: UserAttributes,
    /// Access token of the current session, when the service issued one
    pub token: Option<SessionToken>,
}

impl User {
    pub fn new(username: impl Into<String>, attributes: UserAttributes) -> Self {
        Self {
            username: username.into(),
            attributes,
            token: None,
        }
    }

    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    #[inline]
    pub fn display_name(&self) -> String {
        self.attributes.display_name()
    }

    #[inline]
    pub fn initials(&self) -> String {
        self.attributes.initials()
    }
}
