//! Code mapper — canonical enums for every venue-coded identifier.
//!
//! The venue speaks integer codes; callers speak names, codes, or both.
//! Each enum here decodes once at the boundary from a [`CodeSpec`]
//! (name-or-integer) and fails closed: anything that is not a member of the
//! enumerated set is rejected before further processing. Serialization always
//! emits the venue integer code.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A loosely-typed identifier as supplied by a caller: either a venue
/// integer code or a case-insensitive name like `"BUY_LIMIT"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeSpec {
    Code(i64),
    Name(String),
}

impl From<i64> for CodeSpec {
    fn from(code: i64) -> Self {
        CodeSpec::Code(code)
    }
}

impl From<&str> for CodeSpec {
    fn from(name: &str) -> Self {
        CodeSpec::Name(name.to_string())
    }
}

impl From<String> for CodeSpec {
    fn from(name: String) -> Self {
        CodeSpec::Name(name)
    }
}

impl fmt::Display for CodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeSpec::Code(c) => write!(f, "{c}"),
            CodeSpec::Name(n) => write!(f, "{n}"),
        }
    }
}

/// A spec that matched neither a known name nor a known code.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct CodeError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! venue_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, {
            $($variant:ident = ($code:literal, $str:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "i64", try_from = "CodeSpec")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Venue integer code.
            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Canonical upper-case name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $str),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Case-insensitive name lookup.
            pub fn from_name(name: &str) -> Option<Self> {
                match name.to_ascii_uppercase().as_str() {
                    $($str => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Decode a caller-supplied name-or-code, failing closed.
            pub fn resolve(spec: &CodeSpec) -> Result<Self, CodeError> {
                let decoded = match spec {
                    CodeSpec::Code(c) => Self::from_code(*c),
                    CodeSpec::Name(n) => Self::from_name(n),
                };
                decoded.ok_or_else(|| CodeError {
                    kind: $kind,
                    value: spec.to_string(),
                })
            }

            /// All member names, for "must be one of" error messages.
            pub fn names() -> &'static [&'static str] {
                &[$($str),+]
            }
        }

        impl From<$name> for i64 {
            fn from(v: $name) -> i64 {
                v.code()
            }
        }

        impl TryFrom<CodeSpec> for $name {
            type Error = CodeError;

            fn try_from(spec: CodeSpec) -> Result<Self, CodeError> {
                Self::resolve(&spec)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

venue_enum!(
    /// The six terminal, single-shot trade action kinds.
    TradeAction, "action", {
        Deal = (1, "DEAL"),
        Pending = (5, "PENDING"),
        ModifySltp = (6, "SLTP"),
        ModifyPending = (7, "MODIFY"),
        Remove = (8, "REMOVE"),
        CloseBy = (10, "CLOSE_BY"),
    }
);

venue_enum!(
    /// Market and pending order type taxonomy, in venue numbering.
    /// Position direction reuses `Buy`/`Sell` (0/1).
    OrderType, "order_type", {
        Buy = (0, "BUY"),
        Sell = (1, "SELL"),
        BuyLimit = (2, "BUY_LIMIT"),
        SellLimit = (3, "SELL_LIMIT"),
        BuyStop = (4, "BUY_STOP"),
        SellStop = (5, "SELL_STOP"),
        BuyStopLimit = (6, "BUY_STOP_LIMIT"),
        SellStopLimit = (7, "SELL_STOP_LIMIT"),
    }
);

venue_enum!(
    /// Pending order lifecycle states as reported by the venue.
    OrderState, "order_state", {
        Started = (0, "STARTED"),
        Placed = (1, "PLACED"),
        Canceled = (2, "CANCELED"),
        Partial = (3, "PARTIAL"),
        Filled = (4, "FILLED"),
        Rejected = (5, "REJECTED"),
        Expired = (6, "EXPIRED"),
        RequestAdd = (7, "REQUEST_ADD"),
        RequestModify = (8, "REQUEST_MODIFY"),
        RequestCancel = (9, "REQUEST_CANCEL"),
    }
);

venue_enum!(
    /// Order filling policy.
    FillingPolicy, "order_filling", {
        Fok = (0, "FOK"),
        Ioc = (1, "IOC"),
        Return = (2, "RETURN"),
        Boc = (3, "BOC"),
    }
);

venue_enum!(
    /// Order lifetime policy.
    LifetimePolicy, "order_lifetime", {
        Gtc = (0, "GTC"),
        Day = (1, "DAY"),
        Specified = (2, "SPECIFIED"),
        SpecifiedDay = (3, "SPECIFIED_DAY"),
    }
);

impl OrderType {
    /// True for the two market kinds.
    pub fn is_market(self) -> bool {
        matches!(self, OrderType::Buy | OrderType::Sell)
    }

    /// True for the six resting kinds.
    pub fn is_pending(self) -> bool {
        !self.is_market()
    }

    /// Buy-side kinds reference the ask; sell-side kinds the bid.
    pub fn is_buy_side(self) -> bool {
        matches!(
            self,
            OrderType::Buy | OrderType::BuyLimit | OrderType::BuyStop | OrderType::BuyStopLimit
        )
    }

    /// The market type that flattens a position of this direction.
    pub fn opposite_market(self) -> OrderType {
        if self.is_buy_side() {
            OrderType::Sell
        } else {
            OrderType::Buy
        }
    }
}
