//! Submit, classify, normalize.
//!
//! Exactly one venue write per operation. The venue's last-error sentinel is
//! the sole success signal; the result record alone proves nothing. Every
//! successful dispatch yields a flat JSON map of the venue result with the
//! literal submitted request embedded under `request`, so callers can audit
//! precisely what was sent.

use crate::error::EngineError;
use crate::gateway::{VenueGateway, VenueResult, VENUE_OK};
use crate::request::OrderRequest;
use serde_json::Value;
use tracing::{info, warn};

/// Submit the request and classify the outcome via the last-error sentinel.
pub(crate) fn execute<G: VenueGateway>(
    gateway: &G,
    request: &OrderRequest,
) -> Result<VenueResult, EngineError> {
    info!(action = %request.action, "submitting trade request");
    let result = gateway.submit(request);

    let (code, description) = gateway.last_error();
    if code != VENUE_OK {
        warn!(code, %description, "venue rejected request");
        return Err(EngineError::Gateway { code, description });
    }

    // Success sentinel with no record is a venue contract violation.
    result.ok_or_else(|| EngineError::Unexpected("venue returned no result record".to_string()))
}

/// Flatten the venue result and embed the literal request under `request`.
pub(crate) fn normalize(
    result: &VenueResult,
    request: &OrderRequest,
) -> Result<Value, EngineError> {
    let mut value =
        serde_json::to_value(result).map_err(|e| EngineError::Unexpected(e.to_string()))?;
    let request_value =
        serde_json::to_value(request).map_err(|e| EngineError::Unexpected(e.to_string()))?;

    match value.as_object_mut() {
        Some(map) => {
            map.insert("request".to_string(), request_value);
            Ok(value)
        }
        None => Err(EngineError::Unexpected(
            "venue result did not flatten to a map".to_string(),
        )),
    }
}

/// Execute then normalize: the whole post-build pipeline.
pub(crate) fn dispatch<G: VenueGateway>(
    gateway: &G,
    request: &OrderRequest,
) -> Result<Value, EngineError> {
    let result = execute(gateway, request)?;
    normalize(&result, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::TradeAction;
    use crate::sim::SimVenue;

    fn remove_request() -> OrderRequest {
        let mut req = OrderRequest::new(TradeAction::Remove);
        req.order = Some(123_456_789);
        req
    }

    #[test]
    fn success_embeds_the_literal_request() {
        let venue = SimVenue::new();
        let req = remove_request();
        let data = dispatch(&venue, &req).unwrap();

        assert_eq!(data["retcode"], 10009);
        assert_eq!(data["request"]["action"], 8);
        assert_eq!(data["request"]["order"], 123_456_789);
        assert!(data["request"].get("symbol").is_none());
    }

    #[test]
    fn non_sentinel_last_error_is_a_gateway_error() {
        let venue = SimVenue::new();
        venue.fail_next(10013, "Invalid request");
        let err = dispatch(&venue, &remove_request()).unwrap_err();
        assert_eq!(
            err,
            EngineError::Gateway {
                code: 10013,
                description: "Invalid request".into(),
            }
        );
        assert!(!err.is_pre_dispatch());
    }

    #[test]
    fn sentinel_without_record_is_unexpected() {
        let venue = SimVenue::new();
        venue.drop_next_result();
        let err = dispatch(&venue, &remove_request()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected error: venue returned no result record"
        );
    }
}
