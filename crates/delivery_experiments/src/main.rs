//! Sweep the batching discount across delivery modes and stop densities.
//!
//! Run with: cargo run -p delivery_experiments

mod export;
mod sweep;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use delivery_core::telemetry::PricingTelemetry;
use delivery_core::telemetry_export::write_priced_slot_samples_parquet;

use crate::export::{export_to_csv, export_to_json};
use crate::sweep::{parameter_grid, run_sweep};

const SWEEP_SEED: u64 = 123;
const CSV_PATH: &str = "delivery_sweep.csv";
const JSON_PATH: &str = "delivery_sweep.json";
const PARQUET_PATH: &str = "priced_slots.parquet";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let origin = Utc::now();
    let points = parameter_grid(SWEEP_SEED);

    let progress = ProgressBar::new(points.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} sweep points")
            .expect("progress template is valid"),
    );

    let mut results = run_sweep(&points, origin, || progress.inc(1));
    progress.finish();
    results.sort_by_key(|r| (format!("{:?}", r.mode), format!("{:?}", r.density)));

    println!("--- Batching discount sweep (seed {SWEEP_SEED}, {} points) ---", results.len());
    println!(
        "{:<12} {:<8} {:>6} {:>11} {:>10} {:>10} {:>13} {:>9}",
        "mode", "density", "slots", "discounted", "best", "good", "avg_disc_ct", "min_fee"
    );
    for r in &results {
        println!(
            "{:<12} {:<8} {:>6} {:>11} {:>10} {:>10} {:>13.2} {:>9}",
            format!("{:?}", r.mode).to_lowercase(),
            format!("{:?}", r.density).to_lowercase(),
            r.slots_priced,
            r.discounted_slots,
            r.best_deals,
            r.good_deals,
            r.avg_discount_cents,
            r.min_final_fee_cents,
        );
    }

    if let Err(err) = export_to_csv(&results, CSV_PATH) {
        eprintln!("CSV export failed: {err}");
    } else {
        println!("\nWrote {CSV_PATH}");
    }
    if let Err(err) = export_to_json(&results, JSON_PATH) {
        eprintln!("JSON export failed: {err}");
    } else {
        println!("Wrote {JSON_PATH}");
    }

    // Re-run the densest motorcycle point to export its per-slot samples.
    let showcase = points
        .iter()
        .copied()
        .find(|p| {
            matches!(p.mode, delivery_core::decay::DeliveryMode::Motorcycle)
                && matches!(p.density, delivery_core::scenario::StopDensity::High)
        })
        .expect("grid contains the showcase point");
    let world = sweep_world_for(showcase, origin);
    let telemetry = world.resource::<PricingTelemetry>();
    if let Err(err) = write_priced_slot_samples_parquet(PARQUET_PATH, telemetry) {
        eprintln!("Parquet export failed: {err}");
    } else {
        println!("Wrote {PARQUET_PATH} ({} samples)", telemetry.priced_slots.len());
    }
}

/// Build and price one point, returning the world with its telemetry.
fn sweep_world_for(
    point: sweep::SweepPoint,
    origin: chrono::DateTime<Utc>,
) -> bevy_ecs::prelude::World {
    use chrono::Duration;
    use delivery_core::availability::AvailabilityConfig;
    use delivery_core::engine::{list_priced_slots, slots_in_horizon};
    use delivery_core::params::ScoringParams;
    use delivery_core::scenario::{build_world, ScenarioParams};

    let scoring = ScoringParams::default().with_delivery_mode(point.mode);
    let scenario = ScenarioParams::default()
        .with_seed(point.seed)
        .with_stop_density(point.density)
        .with_scoring(scoring.clone());
    let mut world = build_world(&scenario, origin);
    let candidates = slots_in_horizon(&mut world, origin, origin + Duration::days(3));
    list_priced_slots(
        &mut world,
        &scoring,
        &AvailabilityConfig::always(),
        scenario.center_lat,
        scenario.center_lon,
        &candidates,
        origin,
    )
    .expect("seeded slot ids are all known");
    world
}
