//! Query-layer scenarios: narrowing order, currency masks, idempotent reads.

use tradegate_core::sim::SimVenue;
use tradegate_core::{Engine, OrderQuery, OrderType, PositionQuery, Status};

fn seeded_engine() -> Engine<SimVenue> {
    Engine::new(
        SimVenue::new()
            .with_symbol("EURUSD", 1.0840, 1.0860)
            .with_symbol("GBPUSD", 1.2600, 1.2620)
            .with_symbol("USDJPY", 155.10, 155.12)
            .with_position("EURUSD", 111_111_111, OrderType::Buy, 0.1, 12.0)
            .with_position("GBPUSD", 222_222_222, OrderType::Sell, 0.2, -7.0)
            .with_position("USDJPY", 333_333_333, OrderType::Buy, 0.3, 3.0)
            .with_order("EURUSD", 444_444_444, OrderType::BuyLimit, 1.0800, 0.1)
            .with_order("USDJPY", 555_555_555, OrderType::SellStop, 154.00, 0.2),
    )
}

#[test]
fn unfiltered_fetch_returns_everything() {
    let eng = seeded_engine();
    let result = eng.get_positions(&PositionQuery::default());
    assert_eq!(result.status, Status::Success);
    assert_eq!(result.message, "Positions fetched successfully");
    assert_eq!(result.data.unwrap()["positions"].as_array().unwrap().len(), 3);

    let result = eng.get_orders(&OrderQuery::default());
    assert_eq!(result.message, "Pending orders fetched successfully");
    assert_eq!(
        result.data.unwrap()["pending_orders"].as_array().unwrap().len(),
        2
    );
}

#[test]
fn query_data_nests_under_an_entity_key() {
    let eng = seeded_engine();

    let data = eng.get_positions(&PositionQuery::default()).data.unwrap();
    assert!(data.is_object(), "data must be a keyed object, got {data}");
    assert!(data["positions"].is_array());

    let data = eng.get_orders(&OrderQuery::default()).data.unwrap();
    assert!(data.is_object(), "data must be a keyed object, got {data}");
    assert!(data["pending_orders"].is_array());

    let data = eng.get_position_by_id(111_111_111).data.unwrap();
    assert!(data["position"].is_object());

    let data = eng.get_order_by_id(444_444_444).data.unwrap();
    assert!(data["order"].is_object());
}

#[test]
fn symbol_filter_validates_the_symbol_first() {
    let eng = seeded_engine();
    let result = eng.get_positions(&PositionQuery::by_symbol("XAUUSD"));
    assert_eq!(result.status, Status::Error);
    assert_eq!(result.message, "Invalid symbol name");

    let result = eng.get_orders(&OrderQuery::by_symbol("XAUUSD"));
    assert_eq!(result.status, Status::Error);
    assert_eq!(result.message, "Invalid symbol");
}

#[test]
fn by_symbol_variants_narrow_to_that_symbol() {
    let eng = seeded_engine();
    let result = eng.get_positions_by_symbol("GBPUSD");
    let data = result.data.unwrap();
    let items = data["positions"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ticket"], 222_222_222);

    let result = eng.get_orders_by_symbol("USDJPY");
    let data = result.data.unwrap();
    let items = data["pending_orders"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ticket"], 555_555_555);
}

#[test]
fn group_mask_and_type_filter_compose() {
    let eng = seeded_engine();
    let result = eng.get_positions(&PositionQuery {
        group: Some("*USD".into()),
        order_type: Some("BUY".into()),
        ..Default::default()
    });
    let data = result.data.unwrap();
    let items = data["positions"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ticket"], 111_111_111);
}

#[test]
fn order_subfield_filters_accept_names_and_codes() {
    let eng = seeded_engine();
    let result = eng.get_orders(&OrderQuery {
        order_type: Some("SELL_STOP".into()),
        order_state: Some(1.into()), // PLACED
        ..Default::default()
    });
    let data = result.data.unwrap();
    let items = data["pending_orders"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ticket"], 555_555_555);
}

#[test]
fn invalid_subfield_names_the_valid_set() {
    let eng = seeded_engine();
    let result = eng.get_orders(&OrderQuery {
        order_lifetime: Some("FOREVER".into()),
        ..Default::default()
    });
    assert_eq!(result.status, Status::Error);
    assert_eq!(
        result.message,
        "Invalid 'order_lifetime': must be one of [\"GTC\", \"DAY\", \"SPECIFIED\", \"SPECIFIED_DAY\"]"
    );
}

#[test]
fn currency_queries_build_a_contains_mask() {
    let eng = seeded_engine();
    let result = eng.get_positions_by_currency("jpy");
    assert_eq!(result.message, "Positions for 'JPY' fetched successfully");
    let data = result.data.unwrap();
    let items = data["positions"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["symbol"], "USDJPY");

    let result = eng.get_positions_by_currency("ZAR");
    assert_eq!(result.status, Status::Error);
    assert_eq!(
        result.message,
        "Invalid currency: No matching symbols found for 'ZAR'"
    );
}

#[test]
fn orders_by_currency_mirror_the_position_path() {
    let eng = seeded_engine();
    let result = eng.get_orders_by_currency("EUR");
    assert_eq!(result.message, "Pending orders for 'EUR' fetched successfully");
    assert_eq!(
        result.data.unwrap()["pending_orders"].as_array().unwrap().len(),
        1
    );
}

#[test]
fn by_id_lookups_enforce_ticket_width_then_existence() {
    let eng = seeded_engine();

    let result = eng.get_position_by_id(123);
    assert_eq!(result.message, "Invalid position_id: 123");

    let result = eng.get_position_by_id(999_999_998);
    assert_eq!(result.message, "No position found with ticket 999999998");

    let result = eng.get_position_by_id(222_222_222);
    assert!(result.is_success());
    assert_eq!(result.message, "Position 222222222 fetched successfully");
    assert_eq!(result.data.unwrap()["position"]["symbol"], "GBPUSD");

    let result = eng.get_order_by_id(12);
    assert_eq!(result.message, "Invalid order_id: 12");

    let result = eng.get_order_by_id(444_444_444);
    assert!(result.is_success());
    assert_eq!(result.message, "Order 444444444 fetched successfully");
}

#[test]
fn queries_are_idempotent_reads() {
    let eng = seeded_engine();
    let first = eng.get_positions(&PositionQuery::default());
    let second = eng.get_positions(&PositionQuery::default());
    assert_eq!(first, second);
    // No dispatch happened.
    assert!(eng.gateway().last_request().is_none());
}

#[test]
fn snapshots_reflect_venue_state_at_call_time() {
    let eng = seeded_engine();
    let before = eng.get_orders(&OrderQuery::default());
    assert_eq!(
        before.data.unwrap()["pending_orders"].as_array().unwrap().len(),
        2
    );

    assert!(eng.cancel_order(444_444_444).is_success());

    let after = eng.get_orders(&OrderQuery::default());
    let data = after.data.unwrap();
    let items = data["pending_orders"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["ticket"], 555_555_555);
}
