//! The dispatch engine: public operations over a [`VenueGateway`].
//!
//! Every public operation is total — it returns an [`OrderResult`] envelope,
//! never an `Err` and never a panic. Internally the pipeline is
//! decode → build → dispatch → normalize, with classified [`EngineError`]s
//! propagated by `?` and collapsed at the boundary.

mod build;
mod bulk;
mod dispatch;

use crate::codes::{
    CodeSpec, FillingPolicy, LifetimePolicy, OrderType, TradeAction,
};
use crate::config::EngineConfig;
use crate::domain::{Position, Ticket};
use crate::envelope::{respond, OrderResult};
use crate::error::EngineError;
use crate::gateway::VenueGateway;
use crate::query::{self, OrderQuery, PositionQuery};
use crate::request::OrderRequest;
use build::ActionInputs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-facing inputs for [`Engine::send_order`] and the dispatch
/// convenience operations. Everything is optional; each action kind enforces
/// its own required subset. Enumerated fields accept names or venue codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendOrderParams {
    pub action: Option<CodeSpec>,
    pub symbol: Option<String>,
    pub volume: Option<f64>,
    pub order_type: Option<CodeSpec>,
    pub price: Option<f64>,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
    pub position: Option<u64>,
    pub position_by: Option<u64>,
    pub order: Option<u64>,
    pub type_filling: Option<CodeSpec>,
    pub type_time: Option<CodeSpec>,
    pub expiration: Option<DateTime<Utc>>,
    /// Per-call overrides for the config defaults.
    pub deviation: Option<i64>,
    pub magic: Option<i64>,
    pub comment: Option<String>,
}

/// Order action dispatch and validation engine.
///
/// Owns a gateway and a config; holds no venue state of its own. Cheap to
/// construct, and every operation is a single validated round-trip (plus
/// read-only lookups).
pub struct Engine<G> {
    gateway: G,
    config: EngineConfig,
}

impl<G: VenueGateway> Engine<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, EngineConfig::default())
    }

    pub fn with_config(gateway: G, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Universal dispatch ──────────────────────────────────────────────

    /// Dispatch any of the six trade actions from loosely-typed params.
    pub fn send_order(&self, params: SendOrderParams) -> OrderResult {
        respond(self.send_order_inner(params))
    }

    fn send_order_inner(
        &self,
        params: SendOrderParams,
    ) -> Result<OrderResult, EngineError> {
        let action = match &params.action {
            Some(spec) => decode::<TradeAction>(spec)?,
            None => return Err(EngineError::Input("Action is required".to_string())),
        };
        self.run(action, params, "Order sent successfully!")
    }

    /// Decode params, prepare the symbol if the action trades one, build,
    /// dispatch, and wrap with the given success message.
    fn run(
        &self,
        action: TradeAction,
        params: SendOrderParams,
        message: &str,
    ) -> Result<OrderResult, EngineError> {
        let inputs = self.decode_inputs(&params)?;
        if matches!(action, TradeAction::Deal | TradeAction::Pending) {
            if let Some(symbol) = &inputs.symbol {
                self.prepare_symbol(symbol)?;
            }
        }
        let request = build::build_request(&self.gateway, action, inputs)?;
        let data = dispatch::dispatch(&self.gateway, &request)?;
        Ok(OrderResult::success(message, Some(data)))
    }

    /// Resolve every `CodeSpec`, failing closed, and merge config defaults.
    fn decode_inputs(&self, params: &SendOrderParams) -> Result<ActionInputs, EngineError> {
        let order_type = params
            .order_type
            .as_ref()
            .map(decode::<OrderType>)
            .transpose()?;
        let type_filling = params
            .type_filling
            .as_ref()
            .map(decode::<FillingPolicy>)
            .transpose()?;
        let type_time = params
            .type_time
            .as_ref()
            .map(decode::<LifetimePolicy>)
            .transpose()?;

        Ok(ActionInputs {
            symbol: params.symbol.clone(),
            volume: params.volume,
            order_type,
            price: params.price,
            sl: params.sl,
            tp: params.tp,
            position: params.position,
            position_by: params.position_by,
            order: params.order,
            type_filling,
            type_time,
            expiration: params.expiration,
            deviation: params.deviation.unwrap_or(self.config.deviation),
            magic: params.magic.unwrap_or(self.config.magic),
            comment: params
                .comment
                .clone()
                .unwrap_or_else(|| self.config.comment.clone()),
        })
    }

    /// Make the symbol tradeable venue-side before a Deal/Pending build.
    fn prepare_symbol(&self, symbol: &str) -> Result<(), EngineError> {
        if !self.gateway.select_symbol(symbol) {
            return Err(EngineError::Lookup(format!(
                "Cannot select symbol '{symbol}'"
            )));
        }
        if self.gateway.resolve_symbol(symbol).is_none() {
            return Err(EngineError::Lookup(format!("No symbol info for '{symbol}'")));
        }
        Ok(())
    }

    // ── Dispatch convenience operations ─────────────────────────────────

    /// Immediate execution at the current side-relative quote.
    pub fn place_market_order(&self, params: SendOrderParams) -> OrderResult {
        respond(self.run(
            TradeAction::Deal,
            params,
            "Market order placed successfully!",
        ))
    }

    /// Rest an order at a trigger price.
    pub fn place_pending_order(&self, params: SendOrderParams) -> OrderResult {
        respond(self.run(TradeAction::Pending, params, "Order sent successfully!"))
    }

    /// Replace the protective levels on an open position.
    pub fn modify_position_sltp(
        &self,
        ticket: u64,
        sl: Option<f64>,
        tp: Option<f64>,
    ) -> OrderResult {
        let params = SendOrderParams {
            position: Some(ticket),
            sl,
            tp,
            ..Default::default()
        };
        respond(self.run(
            TradeAction::ModifySltp,
            params,
            "Updated SLTP successfully!",
        ))
    }

    /// Re-price a resting order and/or replace its levels.
    pub fn modify_pending_order(
        &self,
        ticket: u64,
        price: Option<f64>,
        sl: Option<f64>,
        tp: Option<f64>,
    ) -> OrderResult {
        let params = SendOrderParams {
            order: Some(ticket),
            price,
            sl,
            tp,
            ..Default::default()
        };
        respond(self.run(
            TradeAction::ModifyPending,
            params,
            "Order modified successfully!",
        ))
    }

    /// Cancel one resting order by ticket.
    pub fn cancel_order(&self, ticket: u64) -> OrderResult {
        let params = SendOrderParams {
            order: Some(ticket),
            ..Default::default()
        };
        respond(self.run(
            TradeAction::Remove,
            params,
            &format!("Order {ticket} cancelled successfully!"),
        ))
    }

    /// Alias for [`Engine::cancel_order`].
    pub fn cancel_pending_order_by_id(&self, ticket: u64) -> OrderResult {
        self.cancel_order(ticket)
    }

    /// Net two opposing positions on the same symbol against each other.
    pub fn close_by(&self, position: u64, position_by: u64) -> OrderResult {
        let params = SendOrderParams {
            position: Some(position),
            position_by: Some(position_by),
            ..Default::default()
        };
        respond(self.run(
            TradeAction::CloseBy,
            params,
            "Close by executed successfully!",
        ))
    }

    /// Flatten one open position with an opposite-side Deal.
    pub fn close_position_by_id(&self, ticket: u64) -> OrderResult {
        respond(self.close_position_inner(ticket))
    }

    fn close_position_inner(&self, ticket: u64) -> Result<OrderResult, EngineError> {
        let ticket = Ticket::new(ticket)
            .map(Ticket::get)
            .map_err(|_| {
                EngineError::Input("Position ticket must be a 9-digit number".to_string())
            })?;
        let position = self.fetch_position(ticket)?;

        // A closing deal references the position and trades the opposite
        // side at market; no price or levels are sent.
        let mut request = OrderRequest::new(TradeAction::Deal);
        request.position = Some(position.ticket);
        request.symbol = Some(position.symbol.clone());
        request.volume = Some(position.volume);
        request.order_type = Some(position.side.opposite_market());

        let data = dispatch::dispatch(&self.gateway, &request)?;
        Ok(OrderResult::success(
            format!("Position {ticket} closed successfully!"),
            Some(data),
        ))
    }

    fn fetch_position(&self, ticket: u64) -> Result<Position, EngineError> {
        let mut found = self.gateway.positions(Some(ticket)).unwrap_or_default();
        found.retain(|p| p.ticket == ticket);
        if found.len() == 1 {
            Ok(found.remove(0))
        } else {
            Err(EngineError::Lookup(format!(
                "Failed to retrieve position with ticket {ticket}"
            )))
        }
    }

    // ── Query operations ────────────────────────────────────────────────

    /// Fetch open positions narrowed by the query's filters.
    pub fn get_positions(&self, query: &PositionQuery) -> OrderResult {
        respond(self.get_positions_inner(query))
    }

    fn get_positions_inner(&self, query: &PositionQuery) -> Result<OrderResult, EngineError> {
        let snap = query::select_positions(&self.gateway, query)?;
        let message = if snap.venue_empty {
            "No open positions found on Terminal"
        } else if snap.items.is_empty() {
            "No positions found with the given filters"
        } else {
            "Positions fetched successfully"
        };
        Ok(OrderResult::success(message, Some(keyed("positions", &snap.items)?)))
    }

    /// Fetch open positions on one symbol.
    pub fn get_positions_by_symbol(&self, symbol: &str) -> OrderResult {
        self.get_positions(&PositionQuery::by_symbol(symbol))
    }

    /// Fetch exactly one open position by ticket.
    pub fn get_position_by_id(&self, ticket: u64) -> OrderResult {
        respond(self.get_position_by_id_inner(ticket))
    }

    fn get_position_by_id_inner(&self, ticket: u64) -> Result<OrderResult, EngineError> {
        if Ticket::new(ticket).is_err() {
            return Err(EngineError::Input(format!("Invalid position_id: {ticket}")));
        }
        let snap = query::select_positions(&self.gateway, &PositionQuery::by_ticket(ticket))?;
        let Some(position) = snap.items.first() else {
            return Err(EngineError::Lookup(format!(
                "No position found with ticket {ticket}"
            )));
        };
        Ok(OrderResult::success(
            format!("Position {ticket} fetched successfully"),
            Some(keyed("position", position)?),
        ))
    }

    /// Fetch open positions whose symbol contains the currency substring.
    pub fn get_positions_by_currency(&self, currency: &str) -> OrderResult {
        respond(self.get_positions_by_currency_inner(currency))
    }

    fn get_positions_by_currency_inner(
        &self,
        currency: &str,
    ) -> Result<OrderResult, EngineError> {
        let mask = query::currency_mask(&self.gateway, currency)?;
        let cleaned = mask.trim_matches('*').to_string();
        let snap = query::select_positions(
            &self.gateway,
            &PositionQuery {
                group: Some(mask),
                ..Default::default()
            },
        )?;
        let message = if snap.venue_empty {
            "No open positions found on Terminal".to_string()
        } else if snap.items.is_empty() {
            format!("No positions found for currency '{cleaned}'")
        } else {
            format!("Positions for '{cleaned}' fetched successfully")
        };
        Ok(OrderResult::success(message, Some(keyed("positions", &snap.items)?)))
    }

    /// Fetch pending orders narrowed by the query's filters.
    pub fn get_orders(&self, query: &OrderQuery) -> OrderResult {
        respond(self.get_orders_inner(query))
    }

    fn get_orders_inner(&self, query: &OrderQuery) -> Result<OrderResult, EngineError> {
        let snap = query::select_orders(&self.gateway, query)?;
        let message = if snap.venue_empty {
            "No pending orders found on Terminal"
        } else if snap.items.is_empty() {
            "No pending orders found with the given filters"
        } else {
            "Pending orders fetched successfully"
        };
        Ok(OrderResult::success(
            message,
            Some(keyed("pending_orders", &snap.items)?),
        ))
    }

    /// Fetch pending orders on one symbol.
    pub fn get_orders_by_symbol(&self, symbol: &str) -> OrderResult {
        self.get_orders(&OrderQuery::by_symbol(symbol))
    }

    /// Fetch exactly one pending order by ticket.
    pub fn get_order_by_id(&self, ticket: u64) -> OrderResult {
        respond(self.get_order_by_id_inner(ticket))
    }

    fn get_order_by_id_inner(&self, ticket: u64) -> Result<OrderResult, EngineError> {
        if Ticket::new(ticket).is_err() {
            return Err(EngineError::Input(format!("Invalid order_id: {ticket}")));
        }
        let snap = query::select_orders(&self.gateway, &OrderQuery::by_ticket(ticket))?;
        let Some(order) = snap.items.first() else {
            return Err(EngineError::Lookup(format!(
                "No pending order found with ticket {ticket}"
            )));
        };
        Ok(OrderResult::success(
            format!("Order {ticket} fetched successfully"),
            Some(keyed("order", order)?),
        ))
    }

    /// Fetch pending orders whose symbol contains the currency substring.
    pub fn get_orders_by_currency(&self, currency: &str) -> OrderResult {
        respond(self.get_orders_by_currency_inner(currency))
    }

    fn get_orders_by_currency_inner(
        &self,
        currency: &str,
    ) -> Result<OrderResult, EngineError> {
        let mask = query::currency_mask(&self.gateway, currency)?;
        let cleaned = mask.trim_matches('*').to_string();
        let snap = query::select_orders(
            &self.gateway,
            &OrderQuery {
                group: Some(mask),
                ..Default::default()
            },
        )?;
        let message = if snap.venue_empty {
            "No pending orders found on Terminal".to_string()
        } else if snap.items.is_empty() {
            format!("No pending orders found for currency '{cleaned}'")
        } else {
            format!("Pending orders for '{cleaned}' fetched successfully")
        };
        Ok(OrderResult::success(
            message,
            Some(keyed("pending_orders", &snap.items)?),
        ))
    }
}

/// Query results always nest under an entity key, never as a bare array.
fn keyed<T: serde::Serialize>(key: &str, items: &T) -> Result<serde_json::Value, EngineError> {
    let value =
        serde_json::to_value(items).map_err(|e| EngineError::Unexpected(e.to_string()))?;
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), value);
    Ok(serde_json::Value::Object(map))
}

/// Resolve a caller-supplied name-or-code, mapping failure to an input error.
fn decode<T>(spec: &CodeSpec) -> Result<T, EngineError>
where
    T: TryFrom<CodeSpec, Error = crate::codes::CodeError>,
{
    T::try_from(spec.clone())
        .map_err(|e| EngineError::Input(format!("Unknown {} '{}'", e.kind, e.value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Status;
    use crate::sim::SimVenue;

    fn engine() -> Engine<SimVenue> {
        Engine::new(SimVenue::new().with_symbol("EURUSD", 1.0840, 1.0860))
    }

    #[test]
    fn send_order_requires_an_action() {
        let result = engine().send_order(SendOrderParams::default());
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "Action is required");
    }

    #[test]
    fn send_order_fails_closed_on_unknown_codes() {
        let result = engine().send_order(SendOrderParams {
            action: Some("TELEPORT".into()),
            ..Default::default()
        });
        assert_eq!(result.message, "Unknown action 'TELEPORT'");

        let result = engine().send_order(SendOrderParams {
            action: Some("DEAL".into()),
            symbol: Some("EURUSD".into()),
            volume: Some(0.1),
            order_type: Some(99.into()),
            ..Default::default()
        });
        assert_eq!(result.message, "Unknown order_type '99'");
    }

    #[test]
    fn market_order_round_trip() {
        let eng = engine();
        let result = eng.place_market_order(SendOrderParams {
            symbol: Some("EURUSD".into()),
            volume: Some(0.1),
            order_type: Some("BUY".into()),
            ..Default::default()
        });
        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.message, "Market order placed successfully!");

        let data = result.data.unwrap();
        assert_eq!(data["request"]["action"], 1);
        assert_eq!(data["request"]["type"], 0);
        assert_eq!(data["request"]["price"], 1.0860);
        assert_eq!(data["request"]["deviation"], 20);
        assert_eq!(data["request"]["comment"], "via tradegate");
    }

    #[test]
    fn config_overrides_flow_into_the_request() {
        let eng = Engine::with_config(
            SimVenue::new().with_symbol("EURUSD", 1.0840, 1.0860),
            EngineConfig::new().with_deviation(5).with_magic(777),
        );
        let result = eng.place_market_order(SendOrderParams {
            symbol: Some("EURUSD".into()),
            volume: Some(0.1),
            order_type: Some("SELL".into()),
            comment: Some("manual".into()),
            ..Default::default()
        });
        let data = result.data.unwrap();
        assert_eq!(data["request"]["deviation"], 5);
        assert_eq!(data["request"]["magic"], 777);
        assert_eq!(data["request"]["comment"], "manual");
    }

    #[test]
    fn unknown_symbol_is_rejected_before_any_submit() {
        let eng = engine();
        let result = eng.place_market_order(SendOrderParams {
            symbol: Some("XAUUSD".into()),
            volume: Some(0.1),
            order_type: Some("BUY".into()),
            ..Default::default()
        });
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "Cannot select symbol 'XAUUSD'");
        assert!(eng.gateway().last_request().is_none());
    }

    #[test]
    fn close_position_by_id_sends_the_opposite_side() {
        let eng = Engine::new(
            SimVenue::new()
                .with_symbol("EURUSD", 1.0840, 1.0860)
                .with_position("EURUSD", 123_456_789, OrderType::Buy, 0.3, 12.0),
        );
        let result = eng.close_position_by_id(123_456_789);
        assert!(result.is_success(), "{}", result.message);
        assert_eq!(result.message, "Position 123456789 closed successfully!");

        let data = result.data.unwrap();
        assert_eq!(data["request"]["action"], 1);
        assert_eq!(data["request"]["type"], 1); // opposite of the long
        assert_eq!(data["request"]["position"], 123_456_789);
        assert_eq!(data["request"]["volume"], 0.3);
        assert!(data["request"].get("price").is_none());
    }

    #[test]
    fn close_position_by_id_validates_the_width_first() {
        let result = engine().close_position_by_id(42);
        assert_eq!(result.message, "Position ticket must be a 9-digit number");
    }

    #[test]
    fn get_position_by_id_rejects_bad_widths() {
        let result = engine().get_position_by_id(42);
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "Invalid position_id: 42");
    }

    #[test]
    fn get_position_by_id_misses_are_errors() {
        let result = engine().get_position_by_id(123_456_789);
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "No position found with ticket 123456789");
    }

    #[test]
    fn query_zero_cases_are_success() {
        let eng = engine();
        let result = eng.get_positions(&PositionQuery::default());
        assert!(result.is_success());
        assert_eq!(result.message, "No open positions found on Terminal");
        assert_eq!(result.data, Some(serde_json::json!({ "positions": [] })));
    }

    #[test]
    fn filtered_to_nothing_is_distinct_from_venue_empty() {
        let eng = Engine::new(
            SimVenue::new()
                .with_symbol("EURUSD", 1.0840, 1.0860)
                .with_position("EURUSD", 123_456_789, OrderType::Buy, 0.1, 1.0),
        );
        let result = eng.get_positions(&PositionQuery {
            order_type: Some("SELL".into()),
            ..Default::default()
        });
        assert!(result.is_success());
        assert_eq!(result.message, "No positions found with the given filters");
    }

    #[test]
    fn gateway_rejection_surfaces_code_and_description() {
        let eng = Engine::new(
            SimVenue::new()
                .with_symbol("EURUSD", 1.0840, 1.0860)
                .with_order("EURUSD", 234_567_891, OrderType::BuyLimit, 1.0800, 0.1),
        );
        eng.gateway().fail_next(10006, "Request rejected");
        let result = eng.cancel_order(234_567_891);
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.message, "venue error 10006: Request rejected");
        assert!(result.data.is_none());
    }
}
