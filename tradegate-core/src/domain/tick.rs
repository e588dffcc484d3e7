//! Best bid/ask snapshot.

use serde::{Deserialize, Serialize};

/// Current top-of-book quote for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub bid: f64,
    pub ask: f64,
}

impl Tick {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    /// Midpoint reference used by the limit-order rules.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// The side-relative "current" reference used by the stop and
    /// stop-limit rules: ask for buy-side kinds, bid for sell-side.
    pub fn current_for(&self, buy_side: bool) -> f64 {
        if buy_side {
            self.ask
        } else {
            self.bid
        }
    }
}
