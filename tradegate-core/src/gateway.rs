//! Venue gateway boundary.
//!
//! The gateway is the single opaque collaborator the engine talks to. It is
//! always passed in explicitly (dependency injection) — there is no global
//! connection handle — so production adapters and test doubles implement the
//! same trait. See [`crate::sim::SimVenue`] for the in-memory double.

use crate::domain::{PendingOrder, Position, SymbolInfo, Tick};
use crate::request::OrderRequest;
use serde::{Deserialize, Serialize};

/// The last-error code that means "accepted, no error". Any other code after
/// a submit is a dispatch failure, even if a result record was also returned.
pub const VENUE_OK: i64 = 1;

/// Native result record returned by the venue for a submitted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueResult {
    /// Venue return code for the operation itself.
    pub retcode: i64,
    /// Deal ticket, if a deal was performed.
    pub deal: u64,
    /// Order ticket, if an order was placed.
    pub order: u64,
    pub volume: f64,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
    /// Broker commentary on the result.
    pub comment: String,
    pub request_id: u64,
    pub retcode_external: i64,
}

/// Opaque interface to the remote trading venue.
///
/// Reads return `None` when the venue has nothing (or the call failed
/// venue-side); the engine decides which of those is an error. `submit`
/// must be followed by a `last_error` read — success is signalled by the
/// [`VENUE_OK`] sentinel, not by the presence of a result record.
pub trait VenueGateway {
    /// Resolve symbol metadata, `None` when the symbol is unknown.
    fn resolve_symbol(&self, name: &str) -> Option<SymbolInfo>;

    /// Make the symbol visible/selected venue-side. `false` on failure.
    fn select_symbol(&self, name: &str) -> bool;

    /// Current best bid/ask for the symbol.
    fn tick(&self, name: &str) -> Option<Tick>;

    /// All instrument names known to the venue.
    fn list_symbol_names(&self) -> Option<Vec<String>>;

    /// Open positions; narrowed to one ticket when given.
    fn positions(&self, ticket: Option<u64>) -> Option<Vec<Position>>;

    /// Resting pending orders; narrowed to one ticket when given.
    fn orders(&self, ticket: Option<u64>) -> Option<Vec<PendingOrder>>;

    /// Submit one trade request. At most one write per engine operation.
    fn submit(&self, request: &OrderRequest) -> Option<VenueResult>;

    /// The venue's `(code, description)` signal for the most recent call.
    fn last_error(&self) -> (i64, String);
}
