//! Outbound request payload.

use crate::codes::{FillingPolicy, LifetimePolicy, OrderType, TradeAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload submitted to the venue.
///
/// The populated-field subset is determined entirely by `action`; every
/// unrelated field stays `None` and is omitted from the serialized payload —
/// absent, not null. Enum fields serialize as venue integer codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub action: TradeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp: Option<f64>,
    /// Maximum slippage in points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_by: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_filling: Option<FillingPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_time: Option<LifetimePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl OrderRequest {
    /// A bare request for the given action; builders fill the rest.
    pub fn new(action: TradeAction) -> Self {
        Self {
            action,
            symbol: None,
            volume: None,
            order_type: None,
            price: None,
            sl: None,
            tp: None,
            deviation: None,
            magic: None,
            comment: None,
            position: None,
            position_by: None,
            order: None,
            type_filling: None,
            type_time: None,
            expiration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_the_payload() {
        let mut req = OrderRequest::new(TradeAction::Remove);
        req.order = Some(123_456_789);

        let value = serde_json::to_value(&req).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["action"], 8);
        assert_eq!(obj["order"], 123_456_789);
    }

    #[test]
    fn populated_fields_serialize_with_venue_keys_and_codes() {
        let mut req = OrderRequest::new(TradeAction::Pending);
        req.symbol = Some("EURUSD".into());
        req.volume = Some(0.1);
        req.order_type = Some(OrderType::BuyLimit);
        req.price = Some(1.0800);
        req.type_time = Some(LifetimePolicy::Gtc);

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["action"], 5);
        assert_eq!(value["type"], 2);
        assert_eq!(value["type_time"], 0);
        assert!(value.get("sl").is_none());
        assert!(value.get("position").is_none());
    }
}
