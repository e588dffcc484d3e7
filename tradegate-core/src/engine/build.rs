//! Per-action request construction.
//!
//! One arm per trade action kind. Each arm owns the full precondition chain
//! for its action — required fields, ticket width, entity lookups, rule
//! checks — and emits an [`OrderRequest`] whose populated-field subset is
//! exactly what the action needs. Order within an arm is fixed: input
//! checks, then lookups, then rule checks, then assembly.

use crate::codes::{LifetimePolicy, OrderType, TradeAction};
use crate::domain::{PendingOrder, Position, Ticket};
use crate::error::EngineError;
use crate::gateway::VenueGateway;
use crate::request::OrderRequest;
use crate::validation;
use chrono::{DateTime, Utc};

/// Typed, decoded inputs for one build. The engine front door resolves all
/// caller-supplied `CodeSpec`s and merges config defaults before this point.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActionInputs {
    pub symbol: Option<String>,
    pub volume: Option<f64>,
    pub order_type: Option<OrderType>,
    pub price: Option<f64>,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
    pub position: Option<u64>,
    pub position_by: Option<u64>,
    pub order: Option<u64>,
    pub type_filling: Option<crate::codes::FillingPolicy>,
    pub type_time: Option<LifetimePolicy>,
    pub expiration: Option<DateTime<Utc>>,
    pub deviation: i64,
    pub magic: i64,
    pub comment: String,
}

/// Build the request for one action, running every pre-dispatch check.
pub(crate) fn build_request<G: VenueGateway>(
    gateway: &G,
    action: TradeAction,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    match action {
        TradeAction::Deal => build_deal(gateway, inputs),
        TradeAction::Pending => build_pending(gateway, inputs),
        TradeAction::ModifySltp => build_sltp(gateway, inputs),
        TradeAction::ModifyPending => build_modify(gateway, inputs),
        TradeAction::Remove => build_remove(gateway, inputs),
        TradeAction::CloseBy => build_close_by(gateway, inputs),
    }
}

// ── Shared preconditions ────────────────────────────────────────────────────

fn require_symbol(inputs: &ActionInputs) -> Result<String, EngineError> {
    inputs
        .symbol
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::Input("Symbol is required".to_string()))
}

fn require_volume(inputs: &ActionInputs) -> Result<f64, EngineError> {
    let volume = inputs
        .volume
        .ok_or_else(|| EngineError::Input("Volume is required".to_string()))?;
    validation::check_volume(volume)?;
    Ok(volume)
}

fn require_ticket(raw: Option<u64>, entity: &str) -> Result<u64, EngineError> {
    let raw = raw.ok_or_else(|| EngineError::Input(format!("{entity} ticket is required")))?;
    Ticket::new(raw)
        .map(Ticket::get)
        .map_err(|_| EngineError::Input(format!("{entity} ticket must be a 9-digit number")))
}

fn require_tick<G: VenueGateway>(
    gateway: &G,
    symbol: &str,
) -> Result<crate::domain::Tick, EngineError> {
    gateway.tick(symbol).ok_or_else(|| {
        EngineError::Lookup(format!("Cannot retrieve market price for: {symbol}"))
    })
}

fn fetch_one_position<G: VenueGateway>(
    gateway: &G,
    ticket: u64,
) -> Result<Position, EngineError> {
    let mut found = gateway.positions(Some(ticket)).unwrap_or_default();
    found.retain(|p| p.ticket == ticket);
    if found.len() == 1 {
        Ok(found.remove(0))
    } else {
        Err(EngineError::Lookup(format!(
            "Failed to retrieve position with ticket {ticket}"
        )))
    }
}

// ── DEAL ────────────────────────────────────────────────────────────────────

fn build_deal<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let symbol = require_symbol(&inputs)?;
    let volume = require_volume(&inputs)?;

    let order_type = inputs
        .order_type
        .ok_or_else(|| EngineError::Input("Order type is required".to_string()))?;
    if !order_type.is_market() {
        return Err(EngineError::Input(format!(
            "DEAL requires BUY or SELL, got: {order_type}"
        )));
    }

    let tick = require_tick(gateway, &symbol)?;
    let price = tick.current_for(order_type == OrderType::Buy);
    validation::check_market_sltp(order_type, inputs.sl, inputs.tp, &tick)?;

    let mut req = OrderRequest::new(TradeAction::Deal);
    req.symbol = Some(symbol);
    req.volume = Some(volume);
    req.order_type = Some(order_type);
    req.price = Some(price);
    req.sl = inputs.sl;
    req.tp = inputs.tp;
    req.deviation = Some(inputs.deviation);
    req.magic = Some(inputs.magic);
    req.comment = Some(inputs.comment);
    req.type_filling = inputs.type_filling;
    Ok(req)
}

// ── PENDING ─────────────────────────────────────────────────────────────────

fn build_pending<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let symbol = require_symbol(&inputs)?;
    let volume = require_volume(&inputs)?;

    let order_type = inputs
        .order_type
        .ok_or_else(|| EngineError::Input("Order type is required".to_string()))?;
    if !order_type.is_pending() {
        return Err(EngineError::Input(format!(
            "Invalid PENDING order type: {order_type}"
        )));
    }

    let price = inputs
        .price
        .ok_or_else(|| EngineError::Input("PENDING orders require a price".to_string()))?;

    // Explicit lifetime wins; an expiration implies SPECIFIED; else GTC.
    let type_time = inputs.type_time.unwrap_or(if inputs.expiration.is_some() {
        LifetimePolicy::Specified
    } else {
        LifetimePolicy::Gtc
    });

    let tick = require_tick(gateway, &symbol)?;
    validation::check_pending(order_type, price, inputs.sl, inputs.tp, &tick)?;

    let mut req = OrderRequest::new(TradeAction::Pending);
    req.symbol = Some(symbol);
    req.volume = Some(volume);
    req.order_type = Some(order_type);
    req.price = Some(price);
    req.sl = inputs.sl;
    req.tp = inputs.tp;
    req.deviation = Some(inputs.deviation);
    req.magic = Some(inputs.magic);
    req.comment = Some(inputs.comment);
    req.type_time = Some(type_time);
    req.expiration = inputs.expiration;
    req.type_filling = inputs.type_filling;
    Ok(req)
}

// ── SLTP ────────────────────────────────────────────────────────────────────

fn build_sltp<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let ticket = require_ticket(inputs.position, "Position")?;
    let position = fetch_one_position(gateway, ticket)?;

    validation::check_position_sltp(
        position.is_long(),
        inputs.sl,
        inputs.tp,
        position.price_current,
    )?;

    // Levels not being changed carry over from the live position, so the
    // venue never interprets an absent level as "clear it".
    let mut req = OrderRequest::new(TradeAction::ModifySltp);
    req.position = Some(ticket);
    req.sl = inputs.sl.or(Some(position.sl));
    req.tp = inputs.tp.or(Some(position.tp));
    Ok(req)
}

// ── MODIFY ──────────────────────────────────────────────────────────────────

fn build_modify<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let ticket = require_ticket(inputs.order, "Order")?;

    let mut found = gateway.orders(Some(ticket)).unwrap_or_default();
    found.retain(|o| o.ticket == ticket);
    let order: PendingOrder = if found.len() == 1 {
        found.remove(0)
    } else {
        return Err(EngineError::Lookup(format!(
            "No pending order found with ticket {ticket}"
        )));
    };

    // An omitted price re-validates and re-sends the existing trigger.
    let price = inputs.price.unwrap_or(order.price_open);
    let tick = require_tick(gateway, &order.symbol)?;
    validation::check_pending(order.order_type, price, inputs.sl, inputs.tp, &tick)?;

    let mut req = OrderRequest::new(TradeAction::ModifyPending);
    req.order = Some(ticket);
    req.price = Some(price);
    req.sl = inputs.sl;
    req.tp = inputs.tp;
    Ok(req)
}

// ── REMOVE ──────────────────────────────────────────────────────────────────

fn build_remove<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let ticket = require_ticket(inputs.order, "Order")?;

    let mut found = gateway.orders(Some(ticket)).unwrap_or_default();
    found.retain(|o| o.ticket == ticket);
    if found.is_empty() {
        return Err(EngineError::Lookup(format!(
            "No pending orders found with ticket {ticket}"
        )));
    }
    if found.len() > 1 {
        return Err(EngineError::Unexpected(format!(
            "Expected 1 pending order, got {}",
            found.len()
        )));
    }

    let mut req = OrderRequest::new(TradeAction::Remove);
    req.order = Some(ticket);
    Ok(req)
}

// ── CLOSE_BY ────────────────────────────────────────────────────────────────

fn build_close_by<G: VenueGateway>(
    gateway: &G,
    inputs: ActionInputs,
) -> Result<OrderRequest, EngineError> {
    let ticket = require_ticket(inputs.position, "Position")?;
    let by_ticket = require_ticket(inputs.position_by, "Position")?;

    let position = fetch_one_position(gateway, ticket)?;
    let position_by = fetch_one_position(gateway, by_ticket)?;

    if position.symbol != position_by.symbol {
        return Err(EngineError::Input(
            "Position and position_by must be on the same symbol".to_string(),
        ));
    }

    // The venue nets the smaller position into the larger; swap so
    // `position` is always the larger leg.
    let (position, position_by) = if position_by.volume > position.volume {
        (position_by, position)
    } else {
        (position, position_by)
    };

    let mut req = OrderRequest::new(TradeAction::CloseBy);
    req.position = Some(position.ticket);
    req.position_by = Some(position_by.ticket);
    Ok(req)
}
