//! Open position snapshots.

use crate::codes::OrderType;
use serde::{Deserialize, Serialize};

/// An open position as reported by the venue.
///
/// Mutated only venue-side (by Deal, ModifySltp, or CloseBy requests) and
/// destroyed when fully closed. The `side` field uses venue numbering:
/// Buy = 0, Sell = 1 — the same codes as the market order types, which is
/// what lets the query layer filter positions by an order-type code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticket: u64,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderType,
    pub volume: f64,
    pub price_open: f64,
    pub price_current: f64,
    pub sl: f64,
    pub tp: f64,
    pub profit: f64,
}

impl Position {
    /// True when the position is long.
    pub fn is_long(&self) -> bool {
        self.side == OrderType::Buy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_side_under_the_venue_key() {
        let pos = Position {
            ticket: 123_456_789,
            symbol: "EURUSD".into(),
            side: OrderType::Sell,
            volume: 0.5,
            price_open: 1.0850,
            price_current: 1.0840,
            sl: 1.0900,
            tp: 1.0800,
            profit: 50.0,
        };
        let value = serde_json::to_value(&pos).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["ticket"], 123_456_789);
    }
}
