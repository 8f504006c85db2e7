use bevy_ecs::prelude::World;
use chrono::{DateTime, Duration, Utc};

use delivery_core::availability::AvailabilityConfig;
use delivery_core::catalog::{CartLine, InMemoryCatalog};
use delivery_core::ecs::{DeliverySlot, Order, ScheduledStop};
use delivery_core::engine::{
    finalize_quote, list_priced_slots, price_checkout, CheckoutRequest, FinalizeOutcome,
    QuoteReceipt,
};
use delivery_core::error::PricingError;
use delivery_core::params::ScoringParams;
use delivery_core::store::{SlotIndex, StopTimeIndex};
use delivery_core::telemetry::PricingTelemetry;
use delivery_core::test_helpers::{
    create_test_world, spawn_test_slot, test_instant, TEST_LAT, TEST_LON,
};

/// World with one roomy slot and a six-unit cart priced into a quote.
fn finalized_fixture(capacity_total: u32, capacity_used: u32) -> (World, QuoteReceipt, DateTime<Utc>) {
    let mut world = create_test_world(7);
    let start = test_instant();
    spawn_test_slot(&mut world, "sl_1", start, capacity_total, capacity_used);

    let mut catalog = InMemoryCatalog::with_default_products();
    let mut cart_ids = delivery_core::util::IdSource::new(Some(100));
    let cart_id = catalog
        .create_cart(
            &mut cart_ids,
            vec![CartLine {
                product_id: "p_3".into(),
                qty: 1,
            }],
        )
        .expect("cart");

    let now = start - Duration::hours(2);
    let receipt = price_checkout(
        &mut world,
        &catalog,
        &ScoringParams::default(),
        &CheckoutRequest {
            cart_id,
            slot_id: "sl_1".into(),
            lat: TEST_LAT,
            lon: TEST_LON,
        },
        now,
    )
    .expect("receipt");
    (world, receipt, now)
}

fn slot_by_id(world: &mut World, id: &str) -> DeliverySlot {
    let entity = world.resource::<SlotIndex>().get(id).expect("slot entity");
    world.get::<DeliverySlot>(entity).expect("slot").clone()
}

#[test]
fn finalize_produces_one_order_one_stop_one_capacity_unit() {
    let (mut world, receipt, now) = finalized_fixture(10, 0);

    let outcome =
        finalize_quote(&mut world, &receipt.quote_id, now + Duration::minutes(5)).expect("finalize");
    let (order_id, stop_id) = match outcome {
        FinalizeOutcome::Finalized { order_id, stop_id } => (order_id, stop_id),
        other => panic!("expected Finalized, got {other:?}"),
    };

    let slot = slot_by_id(&mut world, "sl_1");
    assert_eq!(slot.capacity_used, 1);

    let orders: Vec<Order> = world.query::<&Order>().iter(&world).cloned().collect();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.id, order_id);
    assert_eq!(order.quote_id, receipt.quote_id);
    assert_eq!(order.total_cents, receipt.amounts.total_cents);
    assert_eq!(order.delivery_fee_cents, receipt.amounts.delivery_fee_cents);

    // Exactly one new stop, pinned to the slot start with weight 1.0.
    let stops: Vec<ScheduledStop> = world
        .query::<&ScheduledStop>()
        .iter(&world)
        .cloned()
        .collect();
    assert_eq!(stops.len(), 1);
    let stop = &stops[0];
    assert_eq!(stop.id, stop_id);
    assert_eq!(stop.scheduled_at, slot.start_at);
    assert_eq!(stop.weight, 1.0);
    assert_eq!(stop.lat, TEST_LAT);
    assert_eq!(world.resource::<StopTimeIndex>().len(), 1);

    let telemetry = world.resource::<PricingTelemetry>();
    assert_eq!(telemetry.finalized_orders.len(), 1);
    assert_eq!(telemetry.finalized_orders[0].order_id, order_id);
}

#[test]
fn finalizing_twice_increments_capacity_at_most_once() {
    let (mut world, receipt, now) = finalized_fixture(10, 0);
    let at = now + Duration::minutes(5);

    let first = finalize_quote(&mut world, &receipt.quote_id, at).expect("first");
    assert!(matches!(first, FinalizeOutcome::Finalized { .. }));

    let second = finalize_quote(&mut world, &receipt.quote_id, at).expect("second");
    assert_eq!(second, FinalizeOutcome::AlreadyFinalized);

    let slot = slot_by_id(&mut world, "sl_1");
    assert_eq!(slot.capacity_used, 1);
    let orders: Vec<&Order> = world.query::<&Order>().iter(&world).collect();
    assert_eq!(orders.len(), 1);
    assert_eq!(world.resource::<StopTimeIndex>().len(), 1);
    assert_eq!(world.resource::<PricingTelemetry>().finalize_replays, 1);
}

#[test]
fn expired_quotes_are_not_honorable() {
    let (mut world, receipt, now) = finalized_fixture(10, 0);

    let err = finalize_quote(&mut world, &receipt.quote_id, now + Duration::minutes(16))
        .expect_err("expired");
    assert_eq!(
        err,
        PricingError::QuoteExpired {
            quote_id: receipt.quote_id.clone(),
            locked_until: receipt.locked_until,
        }
    );

    let slot = slot_by_id(&mut world, "sl_1");
    assert_eq!(slot.capacity_used, 0);
    assert_eq!(world.resource::<StopTimeIndex>().len(), 0);
}

#[test]
fn capacity_never_exceeds_total() {
    // The slot is already full; checkout still works at full price.
    let (mut world, receipt, now) = finalized_fixture(1, 1);

    finalize_quote(&mut world, &receipt.quote_id, now + Duration::minutes(1)).expect("finalize");
    let slot = slot_by_id(&mut world, "sl_1");
    assert_eq!(slot.capacity_used, 1);
}

#[test]
fn unknown_quotes_are_rejected() {
    let mut world = create_test_world(7);
    let err = finalize_quote(&mut world, "q_missing", test_instant()).expect_err("unknown");
    assert_eq!(err, PricingError::QuoteNotFound("q_missing".into()));
}

#[test]
fn a_finalized_stop_feeds_the_next_listing() {
    let (mut world, receipt, now) = finalized_fixture(10, 0);
    let params = ScoringParams::default();
    let availability = AvailabilityConfig::always();

    let before = list_priced_slots(
        &mut world,
        &params,
        &availability,
        TEST_LAT,
        TEST_LON,
        &["sl_1".to_string()],
        now,
    )
    .expect("listing before");
    assert_eq!(before.slots[0].discount_cents, 0);
    assert!(before.slots[0].requires_solo_minimum);

    finalize_quote(&mut world, &receipt.quote_id, now + Duration::minutes(5)).expect("finalize");

    let after = list_priced_slots(
        &mut world,
        &params,
        &availability,
        TEST_LAT,
        TEST_LON,
        &["sl_1".to_string()],
        now,
    )
    .expect("listing after");
    let row = &after.slots[0];
    // The new stop sits at the slot start, 30 minutes from the midpoint:
    // its contribution clears the solo-minimum threshold and buys a discount.
    assert!(row.discount_cents > 0);
    assert!(row.final_fee_cents < 450);
    assert!(!row.requires_solo_minimum);
    assert_eq!(row.capacity.used, 1);
}
