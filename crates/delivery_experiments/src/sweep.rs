//! Sweep the pricing engine across delivery modes and stop densities.
//!
//! Every point builds its own seeded world, prices the whole horizon for a
//! user at the cluster center, then walks one quote through checkout and
//! finalization. Points are independent, so the sweep runs in parallel.

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use delivery_core::availability::AvailabilityConfig;
use delivery_core::catalog::{CartLine, InMemoryCatalog};
use delivery_core::decay::DeliveryMode;
use delivery_core::engine::{
    list_priced_slots, price_checkout, slots_in_horizon, CheckoutRequest,
};
use delivery_core::params::ScoringParams;
use delivery_core::payments::{create_payment_intent, handle_payment_webhook, PAYMENT_SUCCEEDED};
use delivery_core::scenario::{build_world, ScenarioParams, StopDensity};
use delivery_core::scoring::DealLabel;
use delivery_core::telemetry::PricingTelemetry;
use delivery_core::util::IdSource;

/// One sweep coordinate.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    pub mode: DeliveryMode,
    pub density: StopDensity,
    pub seed: u64,
}

/// Aggregates for one priced horizon.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub mode: DeliveryMode,
    pub density: StopDensity,
    pub seed: u64,
    pub slots_priced: usize,
    pub discounted_slots: usize,
    pub best_deals: usize,
    pub good_deals: usize,
    pub solo_required_slots: usize,
    pub avg_discount_cents: f64,
    pub min_final_fee_cents: i64,
    pub finalized_orders: usize,
}

/// The full mode × density grid.
pub fn parameter_grid(seed: u64) -> Vec<SweepPoint> {
    let modes = [
        DeliveryMode::Car,
        DeliveryMode::Motorcycle,
        DeliveryMode::Bicycle,
    ];
    let densities = [StopDensity::Low, StopDensity::Medium, StopDensity::High];

    let mut points = Vec::with_capacity(modes.len() * densities.len());
    for mode in modes {
        for density in densities {
            points.push(SweepPoint {
                mode,
                density,
                seed,
            });
        }
    }
    points
}

/// Price one sweep point end to end.
pub fn run_point(point: SweepPoint, origin: DateTime<Utc>) -> SweepResult {
    let scoring = ScoringParams::default().with_delivery_mode(point.mode);
    let scenario = ScenarioParams::default()
        .with_seed(point.seed)
        .with_stop_density(point.density)
        .with_scoring(scoring.clone());
    let mut world = build_world(&scenario, origin);

    let candidates = slots_in_horizon(&mut world, origin, origin + Duration::days(3));
    let listing = list_priced_slots(
        &mut world,
        &scoring,
        &AvailabilityConfig::always(),
        scenario.center_lat,
        scenario.center_lon,
        &candidates,
        origin,
    )
    .expect("seeded slot ids are all known");

    let discounted: Vec<_> = listing
        .slots
        .iter()
        .filter(|row| row.discount_cents > 0)
        .collect();
    let best_deals = listing
        .slots
        .iter()
        .filter(|row| row.label == DealLabel::Best)
        .count();
    let good_deals = listing
        .slots
        .iter()
        .filter(|row| row.label == DealLabel::Good)
        .count();
    let solo_required_slots = listing
        .slots
        .iter()
        .filter(|row| row.requires_solo_minimum)
        .count();
    let avg_discount_cents = if listing.slots.is_empty() {
        0.0
    } else {
        listing.slots.iter().map(|row| row.discount_cents).sum::<i64>() as f64
            / listing.slots.len() as f64
    };
    let min_final_fee_cents = listing
        .slots
        .iter()
        .map(|row| row.final_fee_cents)
        .min()
        .unwrap_or(scoring.base_fee_cents);

    // Walk the cheapest discounted slot through the whole quote lifecycle.
    let mut catalog = InMemoryCatalog::with_default_products();
    let mut cart_ids = IdSource::new(Some(point.seed));
    if let Some(row) = discounted.first() {
        let cart_id = catalog
            .create_cart(
                &mut cart_ids,
                vec![CartLine {
                    product_id: "p_3".into(),
                    qty: 1,
                }],
            )
            .expect("seed catalog has the party box");
        let receipt = price_checkout(
            &mut world,
            &catalog,
            &scoring,
            &CheckoutRequest {
                cart_id,
                slot_id: row.slot_id.clone(),
                lat: scenario.center_lat,
                lon: scenario.center_lon,
            },
            origin,
        )
        .expect("discounted slot checkout");
        let client_secret = create_payment_intent(&receipt.quote_id);
        debug!(%client_secret, "payment intent created");
        handle_payment_webhook(
            &mut world,
            PAYMENT_SUCCEEDED,
            &receipt.quote_id,
            origin + Duration::minutes(1),
        )
        .expect("fresh quote finalizes");
    }

    let finalized_orders = world
        .resource::<PricingTelemetry>()
        .finalized_orders
        .len();

    debug!(
        mode = ?point.mode,
        density = ?point.density,
        discounted = discounted.len(),
        "sweep point finished"
    );

    SweepResult {
        mode: point.mode,
        density: point.density,
        seed: point.seed,
        slots_priced: listing.slots.len(),
        discounted_slots: discounted.len(),
        best_deals,
        good_deals,
        solo_required_slots,
        avg_discount_cents,
        min_final_fee_cents,
        finalized_orders,
    }
}

/// Run every point in parallel, invoking `on_point_done` as results land.
pub fn run_sweep<F>(
    points: &[SweepPoint],
    origin: DateTime<Utc>,
    on_point_done: F,
) -> Vec<SweepResult>
where
    F: Fn() + Sync,
{
    points
        .par_iter()
        .map(|point| {
            let result = run_point(*point, origin);
            on_point_done();
            result
        })
        .collect()
}
