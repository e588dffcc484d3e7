//! TradeGate Core — order action dispatch and validation over a venue gateway.
//!
//! This crate contains the whole dispatch engine:
//! - Code mapper for every venue-coded identifier (actions, order types,
//!   states, filling and lifetime policies)
//! - Venue gateway trait plus an in-memory simulator
//! - Query layer with ordered filter narrowing and wildcard masks
//! - Directional price/SL/TP validation rule table
//! - Per-action request builders and the single-submit dispatch pipeline
//! - Fail-fast bulk cancel/close operators
//!
//! Every public operation returns the [`envelope::OrderResult`] envelope;
//! nothing here panics on caller input or venue misbehavior.

pub mod codes;
pub mod config;
pub mod domain;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod query;
pub mod request;
pub mod sim;
pub mod validation;

pub use codes::{CodeSpec, FillingPolicy, LifetimePolicy, OrderState, OrderType, TradeAction};
pub use config::EngineConfig;
pub use engine::{Engine, SendOrderParams};
pub use envelope::{OrderResult, Status};
pub use error::EngineError;
pub use gateway::{VenueGateway, VenueResult, VENUE_OK};
pub use query::{OrderQuery, PositionQuery};
pub use request::OrderRequest;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses a thread boundary is
    /// Send + Sync, so an engine can sit behind an Arc in a server loop.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::PendingOrder>();
        require_sync::<domain::PendingOrder>();
        require_send::<OrderRequest>();
        require_sync::<OrderRequest>();
        require_send::<OrderResult>();
        require_sync::<OrderResult>();
        require_send::<EngineError>();
        require_sync::<EngineError>();
        require_send::<sim::SimVenue>();
        require_sync::<sim::SimVenue>();
        require_send::<Engine<sim::SimVenue>>();
        require_sync::<Engine<sim::SimVenue>>();
    }
}
