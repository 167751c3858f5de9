//! Request Scopes
//!
//! Asynchronous calls are never cancelled at the transport level. Instead every
//! call is issued a [`Ticket`] from a [`RequestScope`], and the completion is only
//! applied while the scope still accepts that ticket. Cancelling a scope (for
//! example when the form that issued the call is unmounted) makes every
//! outstanding ticket stale.

use std::fmt;

/// Generation counter issuing tickets for in-flight requests
#[derive(Debug, Default)]
pub struct RequestScope {
    generation: u64,
    issued: u64,
}

/// Identifies one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    seq: u64,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request in the current generation
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket {
            generation: self.generation,
            seq: self.issued,
        }
    }

    /// Whether a completion carrying `ticket` may still be applied
    #[inline]
    pub fn accepts(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Invalidate every ticket issued so far
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.generation, self.seq)
    }
}
