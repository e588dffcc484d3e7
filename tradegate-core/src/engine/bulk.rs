//! Bulk cancel/close operators.
//!
//! Each operator is a query followed by independent single dispatches, one
//! per ticket. Failure is fail-fast: the first failing item's envelope is
//! returned as-is and the remaining items are not attempted. Progress made
//! before the failure is not reported; callers re-query to see venue state.
//! Zero matching items is success with a count of zero.

use super::Engine;
use crate::envelope::OrderResult;
use crate::gateway::VenueGateway;
use crate::query::{self, OrderQuery, PositionQuery};
use tracing::info;

impl<G: VenueGateway> Engine<G> {
    /// Cancel every resting pending order.
    pub fn cancel_all_pending_orders(&self) -> OrderResult {
        self.cancel_orders(&OrderQuery::default(), "No pending orders found", |n| {
            format!("Cancelled {n} pending orders successfully!")
        })
    }

    /// Cancel every resting pending order on one symbol.
    pub fn cancel_pending_orders_by_symbol(&self, symbol: &str) -> OrderResult {
        self.cancel_orders(
            &OrderQuery::by_symbol(symbol),
            &format!("No pending orders found for {symbol}"),
            |n| format!("Cancelled {n} pending orders for {symbol} successfully!"),
        )
    }

    fn cancel_orders(
        &self,
        query: &OrderQuery,
        empty_message: &str,
        done_message: impl Fn(usize) -> String,
    ) -> OrderResult {
        let snap = match query::select_orders(&self.gateway, query) {
            Ok(snap) => snap,
            Err(err) => return err.into(),
        };
        if snap.items.is_empty() {
            return OrderResult::success(empty_message, None);
        }

        let mut cancelled = 0usize;
        for order in &snap.items {
            let result = self.cancel_order(order.ticket);
            if !result.is_success() {
                return result;
            }
            cancelled += 1;
        }
        info!(cancelled, "bulk cancel complete");
        OrderResult::success(done_message(cancelled), None)
    }

    /// Close every open position.
    pub fn close_all_positions(&self) -> OrderResult {
        self.close_positions(
            &PositionQuery::default(),
            "No open positions to close",
            |n| format!("Closed {n} positions successfully!"),
        )
    }

    /// Close every open position on one symbol.
    pub fn close_all_positions_by_symbol(&self, symbol: &str) -> OrderResult {
        self.close_positions(
            &PositionQuery::by_symbol(symbol),
            &format!("No open positions found for symbol {symbol}"),
            |n| format!("Closed {n} positions for {symbol} successfully!"),
        )
    }

    /// Close every open position currently in profit (profit ≥ 0).
    pub fn close_all_profitable_positions(&self) -> OrderResult {
        self.close_positions_where(
            &PositionQuery::default(),
            |p| p.profit >= 0.0,
            "No profitable positions to close",
            |n| format!("Closed {n} profitable positions successfully!"),
        )
    }

    /// Close every open position currently at a loss (profit < 0).
    pub fn close_all_losing_positions(&self) -> OrderResult {
        self.close_positions_where(
            &PositionQuery::default(),
            |p| p.profit < 0.0,
            "No losing positions to close",
            |n| format!("Closed {n} losing positions successfully!"),
        )
    }

    fn close_positions(
        &self,
        query: &PositionQuery,
        empty_message: &str,
        done_message: impl Fn(usize) -> String,
    ) -> OrderResult {
        self.close_positions_where(query, |_| true, empty_message, done_message)
    }

    fn close_positions_where(
        &self,
        query: &PositionQuery,
        keep: impl Fn(&crate::domain::Position) -> bool,
        empty_message: &str,
        done_message: impl Fn(usize) -> String,
    ) -> OrderResult {
        let snap = match query::select_positions(&self.gateway, query) {
            Ok(snap) => snap,
            Err(err) => return err.into(),
        };
        let targets: Vec<_> = snap.items.into_iter().filter(|p| keep(p)).collect();
        if targets.is_empty() {
            return OrderResult::success(empty_message, None);
        }

        let mut closed = 0usize;
        for position in &targets {
            let result = self.close_position_by_id(position.ticket);
            if !result.is_success() {
                return result;
            }
            closed += 1;
        }
        info!(closed, "bulk close complete");
        OrderResult::success(done_message(closed), None)
    }
}
