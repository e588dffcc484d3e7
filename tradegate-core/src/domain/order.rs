//! Resting pending order snapshots.

use crate::codes::{FillingPolicy, LifetimePolicy, OrderState, OrderType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resting, unfilled order as reported by the venue.
///
/// Created by a Pending request, mutated by ModifyPending, destroyed by
/// Remove or by filling into a [`Position`](super::Position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub ticket: u64,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub state: OrderState,
    /// Trigger price.
    pub price_open: f64,
    pub sl: f64,
    pub tp: f64,
    pub volume_current: f64,
    pub type_filling: FillingPolicy,
    pub type_time: LifetimePolicy,
    pub expiration: Option<DateTime<Utc>>,
}
