//! In-memory venue double.
//!
//! Implements [`VenueGateway`] over a scripted book of symbols, positions,
//! and pending orders. Submits apply the obvious side effect per action so
//! multi-step flows (bulk close, cancel-then-query) behave like a live
//! venue. One-shot failure injection via [`SimVenue::fail_next`] drives the
//! rejection paths.

use crate::codes::{FillingPolicy, LifetimePolicy, OrderState, OrderType, TradeAction};
use crate::domain::{PendingOrder, Position, SymbolInfo, Tick, Ticket};
use crate::gateway::{VenueGateway, VenueResult};
use crate::request::OrderRequest;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct SimState {
    symbols: BTreeMap<String, Tick>,
    positions: Vec<Position>,
    orders: Vec<PendingOrder>,
    fail_next: Option<(i64, String)>,
    drop_next_result: bool,
    last_error: (i64, String),
    last_request: Option<OrderRequest>,
    request_seq: u64,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            symbols: BTreeMap::new(),
            positions: Vec::new(),
            orders: Vec::new(),
            fail_next: None,
            drop_next_result: false,
            last_error: (1, "Success".to_string()),
            last_request: None,
            request_seq: 0,
        }
    }
}

/// Scriptable in-memory venue.
#[derive(Debug, Default)]
pub struct SimVenue {
    state: Mutex<SimState>,
}

impl SimVenue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Scripting ───────────────────────────────────────────────────────

    pub fn with_symbol(self, name: impl Into<String>, bid: f64, ask: f64) -> Self {
        self.state().symbols.insert(name.into(), Tick::new(bid, ask));
        self
    }

    pub fn with_position(
        self,
        symbol: impl Into<String>,
        ticket: u64,
        side: OrderType,
        volume: f64,
        profit: f64,
    ) -> Self {
        let symbol = symbol.into();
        let mark = self
            .state()
            .symbols
            .get(&symbol)
            .map(Tick::mid)
            .unwrap_or(0.0);
        self.with_position_full(symbol, ticket, side, volume, mark, 0.0, 0.0, profit)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_position_full(
        self,
        symbol: impl Into<String>,
        ticket: u64,
        side: OrderType,
        volume: f64,
        price_open: f64,
        sl: f64,
        tp: f64,
        profit: f64,
    ) -> Self {
        let symbol = symbol.into();
        let price_current = self
            .state()
            .symbols
            .get(&symbol)
            .map(Tick::mid)
            .unwrap_or(price_open);
        self.state().positions.push(Position {
            ticket,
            symbol,
            side,
            volume,
            price_open,
            price_current,
            sl,
            tp,
            profit,
        });
        self
    }

    pub fn with_order(
        self,
        symbol: impl Into<String>,
        ticket: u64,
        order_type: OrderType,
        price_open: f64,
        volume: f64,
    ) -> Self {
        self.state().orders.push(PendingOrder {
            ticket,
            symbol: symbol.into(),
            order_type,
            state: OrderState::Placed,
            price_open,
            sl: 0.0,
            tp: 0.0,
            volume_current: volume,
            type_filling: FillingPolicy::Return,
            type_time: LifetimePolicy::Gtc,
            expiration: None,
        });
        self
    }

    /// Make the next submit fail with the given last-error signal.
    pub fn fail_next(&self, code: i64, description: impl Into<String>) {
        self.state().fail_next = Some((code, description.into()));
    }

    /// Make the next submit succeed sentinel-wise but return no record.
    pub fn drop_next_result(&self) {
        self.state().drop_next_result = true;
    }

    /// The most recently submitted request, verbatim.
    pub fn last_request(&self) -> Option<OrderRequest> {
        self.state().last_request.clone()
    }

    // ── Submit side effects ─────────────────────────────────────────────

    /// A 9-digit ticket not already present anywhere in the book.
    fn fresh_ticket(state: &SimState) -> u64 {
        let mut rng = rand::thread_rng();
        loop {
            let ticket = rng.gen_range(Ticket::MIN..=Ticket::MAX);
            let taken = state.positions.iter().any(|p| p.ticket == ticket)
                || state.orders.iter().any(|o| o.ticket == ticket);
            if !taken {
                return ticket;
            }
        }
    }

    fn apply(state: &mut SimState, request: &OrderRequest) -> (u64, u64) {
        match request.action {
            TradeAction::Deal => {
                if let Some(ticket) = request.position {
                    // Closing deal: drop the referenced position.
                    state.positions.retain(|p| p.ticket != ticket);
                    (Self::fresh_ticket(state), ticket)
                } else {
                    let ticket = Self::fresh_ticket(state);
                    state.positions.push(Position {
                        ticket,
                        symbol: request.symbol.clone().unwrap_or_default(),
                        side: request.order_type.unwrap_or(OrderType::Buy),
                        volume: request.volume.unwrap_or(0.0),
                        price_open: request.price.unwrap_or(0.0),
                        price_current: request.price.unwrap_or(0.0),
                        sl: request.sl.unwrap_or(0.0),
                        tp: request.tp.unwrap_or(0.0),
                        profit: 0.0,
                    });
                    (Self::fresh_ticket(state), ticket)
                }
            }
            TradeAction::Pending => {
                let ticket = Self::fresh_ticket(state);
                state.orders.push(PendingOrder {
                    ticket,
                    symbol: request.symbol.clone().unwrap_or_default(),
                    order_type: request.order_type.unwrap_or(OrderType::BuyLimit),
                    state: OrderState::Placed,
                    price_open: request.price.unwrap_or(0.0),
                    sl: request.sl.unwrap_or(0.0),
                    tp: request.tp.unwrap_or(0.0),
                    volume_current: request.volume.unwrap_or(0.0),
                    type_filling: request.type_filling.unwrap_or(FillingPolicy::Return),
                    type_time: request.type_time.unwrap_or(LifetimePolicy::Gtc),
                    expiration: request.expiration,
                });
                (0, ticket)
            }
            TradeAction::ModifySltp => {
                if let Some(pos) = state
                    .positions
                    .iter_mut()
                    .find(|p| Some(p.ticket) == request.position)
                {
                    pos.sl = request.sl.unwrap_or(pos.sl);
                    pos.tp = request.tp.unwrap_or(pos.tp);
                }
                (0, request.position.unwrap_or(0))
            }
            TradeAction::ModifyPending => {
                if let Some(order) = state
                    .orders
                    .iter_mut()
                    .find(|o| Some(o.ticket) == request.order)
                {
                    order.price_open = request.price.unwrap_or(order.price_open);
                    order.sl = request.sl.unwrap_or(order.sl);
                    order.tp = request.tp.unwrap_or(order.tp);
                }
                (0, request.order.unwrap_or(0))
            }
            TradeAction::Remove => {
                if let Some(ticket) = request.order {
                    state.orders.retain(|o| o.ticket != ticket);
                }
                (0, request.order.unwrap_or(0))
            }
            TradeAction::CloseBy => {
                // Net the smaller leg out of the larger one.
                let by_volume = request
                    .position_by
                    .and_then(|t| state.positions.iter().find(|p| p.ticket == t))
                    .map(|p| p.volume)
                    .unwrap_or(0.0);
                if let Some(ticket) = request.position_by {
                    state.positions.retain(|p| p.ticket != ticket);
                }
                if let Some(ticket) = request.position {
                    if let Some(pos) =
                        state.positions.iter_mut().find(|p| p.ticket == ticket)
                    {
                        pos.volume -= by_volume;
                    }
                    state
                        .positions
                        .retain(|p| p.ticket != ticket || p.volume > 0.0);
                }
                (Self::fresh_ticket(state), request.position.unwrap_or(0))
            }
        }
    }
}

impl VenueGateway for SimVenue {
    fn resolve_symbol(&self, name: &str) -> Option<SymbolInfo> {
        self.state()
            .symbols
            .contains_key(name)
            .then(|| SymbolInfo::new(name))
    }

    fn select_symbol(&self, name: &str) -> bool {
        self.state().symbols.contains_key(name)
    }

    fn tick(&self, name: &str) -> Option<Tick> {
        self.state().symbols.get(name).copied()
    }

    fn list_symbol_names(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self.state().symbols.keys().cloned().collect();
        (!names.is_empty()).then_some(names)
    }

    fn positions(&self, ticket: Option<u64>) -> Option<Vec<Position>> {
        let state = self.state();
        let found: Vec<Position> = state
            .positions
            .iter()
            .filter(|p| ticket.map_or(true, |t| p.ticket == t))
            .cloned()
            .collect();
        (!found.is_empty()).then_some(found)
    }

    fn orders(&self, ticket: Option<u64>) -> Option<Vec<PendingOrder>> {
        let state = self.state();
        let found: Vec<PendingOrder> = state
            .orders
            .iter()
            .filter(|o| ticket.map_or(true, |t| o.ticket == t))
            .cloned()
            .collect();
        (!found.is_empty()).then_some(found)
    }

    fn submit(&self, request: &OrderRequest) -> Option<VenueResult> {
        let mut state = self.state();
        state.last_request = Some(request.clone());
        state.request_seq += 1;

        if let Some((code, description)) = state.fail_next.take() {
            state.last_error = (code, description);
            return None;
        }
        state.last_error = (1, "Success".to_string());

        let (deal, order) = Self::apply(&mut state, request);
        if std::mem::take(&mut state.drop_next_result) {
            return None;
        }

        let symbol = request.symbol.as_deref().unwrap_or_default();
        let tick = state.symbols.get(symbol).copied().unwrap_or(Tick::new(0.0, 0.0));
        Some(VenueResult {
            retcode: 10009, // venue "done" code
            deal,
            order,
            volume: request.volume.unwrap_or(0.0),
            price: request.price.unwrap_or(0.0),
            bid: tick.bid,
            ask: tick.ask,
            comment: "Request executed".to_string(),
            request_id: state.request_seq,
            retcode_external: 0,
        })
    }

    fn last_error(&self) -> (i64, String) {
        self.state().last_error.clone()
    }
}
