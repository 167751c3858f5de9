//! Session Entity
//!
//! Whether a user is logged in, as far as the client knows.

use crate::domain::entity::user::User;

/// Client-side session state
///
/// Starts `Unknown` while the initial session query is in flight; there is no
/// terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

impl Session {
    /// Whether the initial session query has resolved
    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, Session::Unknown)
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Session::Unknown => "unknown",
            Session::Anonymous => "anonymous",
            Session::Authenticated(_) => "authenticated",
        }
    }
}
