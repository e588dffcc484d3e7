//! Engine error taxonomy.
//!
//! Every failure the engine can produce falls into one of five classes:
//! - `Input`: malformed or missing caller input, caught before any venue call
//! - `Lookup`: unknown symbol/ticket/currency, caught after a read-only call
//! - `Invariant`: a directional price/SL/TP rule failed; the message always
//!   carries the concrete numeric comparison
//! - `Gateway`: the venue reported a non-success code after a submit
//! - `Unexpected`: anything else (serialization faults, missing result
//!   records) — reported as an error envelope, never propagated as a panic

use thiserror::Error;

/// Classified engine failure. Converted into an error envelope at the
/// public boundary; internal code paths propagate it with `?`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Malformed or missing caller input. No venue round-trip happened.
    #[error("{0}")]
    Input(String),

    /// A symbol, ticket, or currency did not resolve against the venue.
    #[error("{0}")]
    Lookup(String),

    /// A directional price/SL/TP rule was violated. The message names the
    /// inequality and the concrete values compared.
    #[error("{0}")]
    Invariant(String),

    /// The venue's last-error code was not the success sentinel after a
    /// submit. The description is venue-supplied.
    #[error("venue error {code}: {description}")]
    Gateway { code: i64, description: String },

    /// Any other fault during processing.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl EngineError {
    /// True for failures detected before the request reached the venue.
    pub fn is_pre_dispatch(&self) -> bool {
        !matches!(self, EngineError::Gateway { .. })
    }
}
