//! Directional price/SL/TP validation rules.
//!
//! One pure predicate per concern, invoked from exactly one place in the
//! request builder. Historically this table was duplicated across the market,
//! pending, modify-pending, and universal-dispatch paths; this module is the
//! single source of truth.
//!
//! Reference prices:
//! - limit kinds compare the trigger against the quote midpoint `mp`
//! - stop and stop-limit kinds compare against `current`: ask for buy-side,
//!   bid for sell-side
//!
//! Every violation message carries the concrete numeric comparison.

use crate::codes::OrderType;
use crate::domain::Tick;
use crate::error::EngineError;

/// Maximum accepted volume, in lots.
pub const MAX_VOLUME: f64 = 100.0;

fn violated(msg: String) -> Result<(), EngineError> {
    Err(EngineError::Invariant(msg))
}

/// Volume must satisfy `0 < v ≤ 100`.
pub fn check_volume(volume: f64) -> Result<(), EngineError> {
    if volume > 0.0 && volume <= MAX_VOLUME {
        Ok(())
    } else {
        Err(EngineError::Input(
            "Volume must be a number >0 and ≤100".to_string(),
        ))
    }
}

/// Market-order SL/TP sanity: applies only when both levels are supplied.
///
/// Buy requires `sl < ask < tp`; Sell requires `tp < ask < sl`.
pub fn check_market_sltp(
    order_type: OrderType,
    sl: Option<f64>,
    tp: Option<f64>,
    tick: &Tick,
) -> Result<(), EngineError> {
    let (Some(sl), Some(tp)) = (sl, tp) else {
        return Ok(());
    };
    match order_type {
        OrderType::Buy if !(sl < tick.ask && tick.ask < tp) => violated(
            "For BUY orders: stop_loss < entry_price < take_profit required".to_string(),
        ),
        OrderType::Sell if !(tp < tick.ask && tick.ask < sl) => violated(
            "For SELL orders: take_profit < entry_price < stop_loss required".to_string(),
        ),
        _ => Ok(()),
    }
}

/// The pending-order rule table.
///
/// `p` is the requested trigger price; absent `sl`/`tp` skip their rows.
/// Market kinds are not valid here; the builder rejects them first.
pub fn check_pending(
    kind: OrderType,
    p: f64,
    sl: Option<f64>,
    tp: Option<f64>,
    tick: &Tick,
) -> Result<(), EngineError> {
    let mp = tick.mid();
    let current = tick.current_for(kind.is_buy_side());

    match kind {
        OrderType::BuyLimit => {
            if !(p < mp) {
                return violated(format!(
                    "BUY_LIMIT requires price < market_price ({p} \u{2265} {mp})"
                ));
            }
            if let Some(sl) = sl {
                if !(sl < p) {
                    return violated(format!(
                        "BUY_LIMIT requires stop_loss < price ({sl} \u{2265} {p})"
                    ));
                }
            }
            if let Some(tp) = tp {
                if !(p < tp) {
                    return violated(format!(
                        "BUY_LIMIT requires price < take_profit ({p} \u{2265} {tp})"
                    ));
                }
            }
        }
        OrderType::SellLimit => {
            if !(p > mp) {
                return violated(format!(
                    "SELL_LIMIT requires price > market_price ({p} \u{2264} {mp})"
                ));
            }
            if let Some(tp) = tp {
                if !(tp < p) {
                    return violated(format!(
                        "SELL_LIMIT requires take_profit < price ({tp} \u{2265} {p})"
                    ));
                }
            }
            if let Some(sl) = sl {
                if !(p < sl) {
                    return violated(format!(
                        "SELL_LIMIT requires price < stop_loss ({p} \u{2265} {sl})"
                    ));
                }
            }
        }
        OrderType::BuyStop => {
            if !(p > mp) {
                return violated(format!(
                    "BUY_STOP requires price > market_price ({p} \u{2264} {mp})"
                ));
            }
            if let Some(sl) = sl {
                if !(sl < p) {
                    return violated(format!(
                        "BUY_STOP requires stop_loss < price ({sl} \u{2265} {p})"
                    ));
                }
            }
            if let Some(tp) = tp {
                if !(p < tp) {
                    return violated(format!(
                        "BUY_STOP requires price < take_profit ({p} \u{2265} {tp})"
                    ));
                }
            }
        }
        OrderType::SellStop => {
            if !(p < mp) {
                return violated(format!(
                    "SELL_STOP requires price < market_price ({p} \u{2265} {mp})"
                ));
            }
            if let Some(sl) = sl {
                if !(p < sl) {
                    return violated(format!(
                        "SELL_STOP requires price < stop_loss ({p} \u{2265} {sl})"
                    ));
                }
            }
            if let Some(tp) = tp {
                if !(tp < p) {
                    return violated(format!(
                        "SELL_STOP requires take_profit < price ({tp} \u{2265} {p})"
                    ));
                }
            }
        }
        OrderType::BuyStopLimit => {
            if !(current < p) {
                return violated(format!(
                    "BUY_STOP_LIMIT trigger price {p} must be above market {current}"
                ));
            }
            if let Some(sl) = sl {
                if !(current < sl) {
                    return violated(format!(
                        "BUY_STOP_LIMIT stop_loss {sl} must sit above market {current}"
                    ));
                }
            }
            if let Some(tp) = tp {
                // The TP floor is the stop-loss when given, else the trigger.
                let floor = sl.unwrap_or(p);
                if !(floor < tp) {
                    return violated(format!(
                        "BUY_STOP_LIMIT requires stop_loss {floor} < take_profit {tp}"
                    ));
                }
            }
        }
        OrderType::SellStopLimit => {
            if !(current > p) {
                return violated(format!(
                    "SELL_STOP_LIMIT trigger price {p} must be below market {current}"
                ));
            }
            if let Some(sl) = sl {
                if !(sl < current) {
                    return violated(format!(
                        "SELL_STOP_LIMIT stop_loss {sl} must sit below market {current}"
                    ));
                }
            }
            if let Some(tp) = tp {
                let ceiling = sl.unwrap_or(p);
                if !(tp < ceiling) {
                    return violated(format!(
                        "SELL_STOP_LIMIT requires take_profit {tp} < stop_loss {ceiling}"
                    ));
                }
            }
        }
        OrderType::Buy | OrderType::Sell => {}
    }
    Ok(())
}

/// Direction-aware SL/TP sanity for an open position (ModifySltp).
///
/// Only supplied levels are checked: long positions require
/// `sl ≤ price_current ≤ tp`, short positions the inverse.
pub fn check_position_sltp(
    is_long: bool,
    sl: Option<f64>,
    tp: Option<f64>,
    price_current: f64,
) -> Result<(), EngineError> {
    if is_long {
        if let Some(sl) = sl {
            if price_current < sl {
                return violated(format!(
                    "Update SLTP error: stop_loss {sl} must be less than current price {price_current}"
                ));
            }
        }
        if let Some(tp) = tp {
            if price_current > tp {
                return violated(format!(
                    "Update SLTP error: take_profit {tp} must be greater than current price {price_current}"
                ));
            }
        }
    } else {
        if let Some(sl) = sl {
            if price_current > sl {
                return violated(format!(
                    "Update SLTP error: stop_loss {sl} must be greater than current price {price_current}"
                ));
            }
        }
        if let Some(tp) = tp {
            if price_current < tp {
                return violated(format!(
                    "Update SLTP error: take_profit {tp} must be less than current price {price_current}"
                ));
            }
        }
    }
    Ok(())
}
