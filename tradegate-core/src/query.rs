//! Query & filter layer.
//!
//! One unfiltered fetch from the gateway per call, then ordered narrowing:
//! ticket → symbol → group mask → enumerated sub-fields. Every supplied
//! filter must independently validate or the whole call fails; an empty venue
//! set is success with an empty list, never an error.

use crate::codes::{CodeSpec, FillingPolicy, LifetimePolicy, OrderState, OrderType};
use crate::domain::{PendingOrder, Position};
use crate::error::EngineError;
use crate::gateway::VenueGateway;
use tracing::debug;

/// Filters for the open-position set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionQuery {
    pub ticket: Option<u64>,
    pub symbol: Option<String>,
    /// Shell-style wildcard mask matched against the entity symbol.
    pub group: Option<String>,
    pub order_type: Option<CodeSpec>,
}

/// Filters for the pending-order set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub ticket: Option<u64>,
    pub symbol: Option<String>,
    pub group: Option<String>,
    pub order_type: Option<CodeSpec>,
    pub order_state: Option<CodeSpec>,
    pub order_filling: Option<CodeSpec>,
    pub order_lifetime: Option<CodeSpec>,
}

impl PositionQuery {
    pub fn by_ticket(ticket: u64) -> Self {
        Self {
            ticket: Some(ticket),
            ..Self::default()
        }
    }

    pub fn by_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }
}

impl OrderQuery {
    pub fn by_ticket(ticket: u64) -> Self {
        Self {
            ticket: Some(ticket),
            ..Self::default()
        }
    }

    pub fn by_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }
}

/// A filtered point-in-time view of the venue's entity set.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot<T> {
    pub items: Vec<T>,
    /// The venue had nothing at all, before any filter applied.
    pub venue_empty: bool,
}

fn resolve_filter<T>(
    spec: &Option<CodeSpec>,
    field: &str,
    names: &'static [&'static str],
    resolve: impl Fn(&CodeSpec) -> Option<T>,
) -> Result<Option<T>, EngineError> {
    match spec {
        None => Ok(None),
        Some(spec) => resolve(spec).map(Some).ok_or_else(|| {
            EngineError::Input(format!("Invalid '{field}': must be one of {names:?}"))
        }),
    }
}

/// Fetch and narrow the open-position set.
pub(crate) fn select_positions<G: VenueGateway>(
    gateway: &G,
    query: &PositionQuery,
) -> Result<Snapshot<Position>, EngineError> {
    // Sub-field filters validate before the venue set is touched.
    let type_code = resolve_filter(&query.order_type, "order_type", OrderType::names(), |s| {
        OrderType::resolve(s).ok()
    })?;

    let Some(raw) = gateway.positions(None).filter(|v| !v.is_empty()) else {
        return Ok(Snapshot {
            items: Vec::new(),
            venue_empty: true,
        });
    };
    debug!(count = raw.len(), "fetched open positions");

    let mut items = raw;
    if let Some(ticket) = query.ticket {
        items.retain(|p| p.ticket == ticket);
    }
    if let Some(symbol) = &query.symbol {
        if gateway.resolve_symbol(symbol).is_none() {
            return Err(EngineError::Lookup("Invalid symbol name".to_string()));
        }
        items.retain(|p| &p.symbol == symbol);
    }
    if let Some(group) = &query.group {
        items.retain(|p| wildcard_match(group, &p.symbol));
    }
    if let Some(code) = type_code {
        items.retain(|p| p.side == code);
    }

    Ok(Snapshot {
        items,
        venue_empty: false,
    })
}

/// Fetch and narrow the pending-order set.
pub(crate) fn select_orders<G: VenueGateway>(
    gateway: &G,
    query: &OrderQuery,
) -> Result<Snapshot<PendingOrder>, EngineError> {
    let type_code = resolve_filter(&query.order_type, "order_type", OrderType::names(), |s| {
        OrderType::resolve(s).ok()
    })?;
    let state_code = resolve_filter(&query.order_state, "order_state", OrderState::names(), |s| {
        OrderState::resolve(s).ok()
    })?;
    let filling_code = resolve_filter(
        &query.order_filling,
        "order_filling",
        FillingPolicy::names(),
        |s| FillingPolicy::resolve(s).ok(),
    )?;
    let lifetime_code = resolve_filter(
        &query.order_lifetime,
        "order_lifetime",
        LifetimePolicy::names(),
        |s| LifetimePolicy::resolve(s).ok(),
    )?;

    let Some(raw) = gateway.orders(None).filter(|v| !v.is_empty()) else {
        return Ok(Snapshot {
            items: Vec::new(),
            venue_empty: true,
        });
    };
    debug!(count = raw.len(), "fetched pending orders");

    let mut items = raw;
    if let Some(ticket) = query.ticket {
        items.retain(|o| o.ticket == ticket);
    }
    if let Some(symbol) = &query.symbol {
        if gateway.resolve_symbol(symbol).is_none() {
            return Err(EngineError::Lookup("Invalid symbol".to_string()));
        }
        items.retain(|o| &o.symbol == symbol);
    }
    if let Some(group) = &query.group {
        items.retain(|o| wildcard_match(group, &o.symbol));
    }
    items.retain(|o| {
        type_code.map_or(true, |c| o.order_type == c)
            && state_code.map_or(true, |c| o.state == c)
            && filling_code.map_or(true, |c| o.type_filling == c)
            && lifetime_code.map_or(true, |c| o.type_time == c)
    });

    Ok(Snapshot {
        items,
        venue_empty: false,
    })
}

/// Derive the `*CUR*` group mask for a currency substring, confirming first
/// that at least one known instrument contains it (case-insensitive).
/// "Unknown currency" is an error, distinct from zero results after filtering.
pub(crate) fn currency_mask<G: VenueGateway>(
    gateway: &G,
    currency: &str,
) -> Result<String, EngineError> {
    let cleaned = currency.trim().to_ascii_uppercase();
    if cleaned.is_empty() {
        return Err(EngineError::Input(format!(
            "Invalid currency: '{currency}'"
        )));
    }

    let names = gateway
        .list_symbol_names()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::Lookup("Failed to fetch symbols from venue".to_string()))?;

    let any_match = names
        .iter()
        .any(|n| n.to_ascii_uppercase().contains(&cleaned));
    if !any_match {
        return Err(EngineError::Lookup(format!(
            "Invalid currency: No matching symbols found for '{cleaned}'"
        )));
    }

    Ok(format!("*{cleaned}*"))
}

/// Shell-style wildcard match: `*` matches any run, `?` any single
/// character, everything else is literal. Case-sensitive, like fnmatch on a
/// case-sensitive filesystem.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < txt.len() {
        if p < pat.len() && (pat[p] == '?' || pat[p] == txt[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            // Backtrack: let the last star absorb one more character.
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimVenue;

    #[test]
    fn wildcard_basics() {
        assert!(wildcard_match("*", "EURUSD"));
        assert!(wildcard_match("*USD", "EURUSD"));
        assert!(wildcard_match("EUR*", "EURUSD"));
        assert!(wildcard_match("*USD*", "USDJPY"));
        assert!(wildcard_match("E?RUSD", "EURUSD"));
        assert!(!wildcard_match("*JPY", "EURUSD"));
        assert!(!wildcard_match("E?USD", "EURUSD"));
        assert!(!wildcard_match("", "EURUSD"));
        assert!(wildcard_match("", ""));
        assert!(wildcard_match("***", ""));
    }

    #[test]
    fn wildcard_is_case_sensitive() {
        assert!(!wildcard_match("*usd", "EURUSD"));
    }

    #[test]
    fn empty_venue_is_success_with_empty_list() {
        let venue = SimVenue::new().with_symbol("EURUSD", 1.0840, 1.0860);
        let snap = select_positions(&venue, &PositionQuery::default()).unwrap();
        assert!(snap.items.is_empty());
        assert!(snap.venue_empty);
    }

    #[test]
    fn invalid_subfield_fails_before_fetch() {
        let venue = SimVenue::new();
        let query = PositionQuery {
            order_type: Some("TELEPORT".into()),
            ..Default::default()
        };
        let err = select_positions(&venue, &query).unwrap_err();
        assert!(err.to_string().starts_with("Invalid 'order_type'"));
    }

    #[test]
    fn unknown_symbol_is_a_lookup_error() {
        let venue = SimVenue::new()
            .with_symbol("EURUSD", 1.0840, 1.0860)
            .with_position("EURUSD", 111_111_111, crate::codes::OrderType::Buy, 0.1, 10.0);
        let err =
            select_positions(&venue, &PositionQuery::by_symbol("GBPUSD")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid symbol name");
    }

    #[test]
    fn filters_narrow_successively() {
        let venue = SimVenue::new()
            .with_symbol("EURUSD", 1.0840, 1.0860)
            .with_symbol("USDJPY", 155.10, 155.12)
            .with_position("EURUSD", 111_111_111, crate::codes::OrderType::Buy, 0.1, 10.0)
            .with_position("EURUSD", 222_222_222, crate::codes::OrderType::Sell, 0.2, -5.0)
            .with_position("USDJPY", 333_333_333, crate::codes::OrderType::Buy, 0.3, 1.0);

        let query = PositionQuery {
            group: Some("EUR*".into()),
            order_type: Some("BUY".into()),
            ..Default::default()
        };
        let snap = select_positions(&venue, &query).unwrap();
        assert_eq!(snap.items.len(), 1);
        assert_eq!(snap.items[0].ticket, 111_111_111);
        assert!(!snap.venue_empty);
    }

    #[test]
    fn currency_mask_requires_a_known_instrument() {
        let venue = SimVenue::new().with_symbol("EURUSD", 1.0840, 1.0860);
        assert_eq!(currency_mask(&venue, "usd").unwrap(), "*USD*");
        let err = currency_mask(&venue, "ZAR").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid currency: No matching symbols found for 'ZAR'"
        );
    }
}
