//! Domain types: tickets, ticks, symbols, positions, pending orders.
//!
//! Positions and pending orders are venue-owned snapshots. The engine never
//! mutates them locally; every read reflects the venue's state at call time.

pub mod ids;
pub mod instrument;
pub mod order;
pub mod position;
pub mod tick;

pub use ids::{Ticket, TicketError};
pub use instrument::SymbolInfo;
pub use order::PendingOrder;
pub use position::Position;
pub use tick::Tick;
