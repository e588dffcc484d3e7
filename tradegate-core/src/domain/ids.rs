//! Ticket identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A ticket that failed the fixed-width check.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("ticket {0} is not a 9-digit number")]
pub struct TicketError(pub u64);

/// Venue-assigned position/order identifier.
///
/// Tickets are always exactly 9 decimal digits. This is a correctness
/// invariant of the lookup path, not a cosmetic check: a ticket of any other
/// width cannot belong to the venue, so it is rejected before any round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(u64);

impl Ticket {
    pub const MIN: u64 = 100_000_000;
    pub const MAX: u64 = 999_999_999;

    /// Validate a raw identifier as a 9-digit ticket.
    pub fn new(raw: u64) -> Result<Self, TicketError> {
        if (Self::MIN..=Self::MAX).contains(&raw) {
            Ok(Ticket(raw))
        } else {
            Err(TicketError(raw))
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Ticket> for u64 {
    fn from(t: Ticket) -> u64 {
        t.0
    }
}
