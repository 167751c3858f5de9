//! Raw Password Value Object
//!
//! Password as typed by the user. It is only ever forwarded to the identity
//! service; memory is zeroized when dropped.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw password from user input
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RawPassword(String);

impl RawPassword {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Clear text, for the request body only
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword(***)")
    }
}

impl From<&str> for RawPassword {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
