//! Instrument metadata at the gateway boundary.

use serde::{Deserialize, Serialize};

/// The slice of venue symbol metadata the engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    /// Price increment, e.g. 0.00001 for a 5-digit FX quote.
    pub point: f64,
    pub digits: u32,
    pub volume_min: f64,
    pub volume_max: f64,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            point: 0.00001,
            digits: 5,
            volume_min: 0.01,
            volume_max: 100.0,
        }
    }
}
