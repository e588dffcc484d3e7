//! Canonical response envelope.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome marker for an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The normalized success/failure envelope every engine operation returns.
///
/// `data` carries the flattened venue result (with the literal request under
/// a `request` key) for dispatch operations, or an entity-keyed object
/// (`{"positions": [...]}`, `{"pending_orders": [...]}`) for queries; it is
/// `None` on error and for bulk summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OrderResult {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl From<EngineError> for OrderResult {
    fn from(err: EngineError) -> Self {
        OrderResult::error(err.to_string())
    }
}

/// Collapse an internal result into the envelope, logging failures.
pub(crate) fn respond(result: Result<OrderResult, EngineError>) -> OrderResult {
    match result {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::error!(error = %err, "operation failed");
            err.into()
        }
    }
}
