use bevy_ecs::prelude::World;
use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::debug;

use crate::ecs::{DeliverySlot, ScheduledStop};
use crate::spatial::StopSpatialIndex;
use crate::store::{register_stop, QuoteIndex, SlotIndex, StopTimeIndex};
use crate::telemetry::PricingTelemetry;
use crate::util::IdSource;

use super::params::{ScenarioParams, StopDensity};

/// Build a world with all engine resources, a seeded slot horizon, and a
/// synthetic stop cluster around the scenario center.
pub fn build_world(params: &ScenarioParams, origin: DateTime<Utc>) -> World {
    let mut world = World::new();
    world.insert_resource(SlotIndex::default());
    world.insert_resource(QuoteIndex::default());
    world.insert_resource(StopTimeIndex::default());
    world.insert_resource(StopSpatialIndex::default());
    world.insert_resource(PricingTelemetry::default());
    world.insert_resource(IdSource::new(params.seed));
    world.insert_resource(params.scoring.clone());
    world.insert_resource(params.availability.clone());

    seed_slots(&mut world, params, origin);
    seed_stops_around(
        &mut world,
        params.center_lat,
        params.center_lon,
        params.stop_density,
        origin,
    );
    world
}

/// Ensure slots exist for the rolling horizon: one per hour in
/// `[first_hour, last_hour)` for each of `horizon_days` days.
///
/// Slot ids are date-derived (`sl_YYYYMMDD_HH`), so re-seeding an already
/// populated world creates nothing. Returns the ids actually created.
pub fn seed_slots(
    world: &mut World,
    params: &ScenarioParams,
    origin: DateTime<Utc>,
) -> Vec<String> {
    let mut created = Vec::new();
    let first_day = origin.date_naive();

    for day_offset in 0..params.horizon_days {
        let day = first_day + Duration::days(i64::from(day_offset));
        for hour in params.first_hour..params.last_hour {
            let id = format!("sl_{}_{hour:02}", day.format("%Y%m%d"));
            if world.resource::<SlotIndex>().contains(&id) {
                continue;
            }
            let start_at = day
                .and_hms_opt(hour, 0, 0)
                .expect("seeded hours are valid times")
                .and_utc();
            let entity = world
                .spawn(DeliverySlot {
                    id: id.clone(),
                    start_at,
                    end_at: start_at + Duration::minutes(params.slot_minutes),
                    capacity_total: params.slot_capacity,
                    capacity_used: 0,
                })
                .id();
            world.resource_mut::<SlotIndex>().insert(id.clone(), entity);
            created.push(id);
        }
    }

    debug!(slots = created.len(), "seeded slot horizon");
    created
}

/// Scatter synthetic committed stops around a center point.
///
/// Stops spread over ~12 hours in 20-minute steps with a deterministic
/// ~2 km lat/lon jitter, so nearby slots pick up batching neighbors without
/// any randomness in placement. Returns the new stop ids.
pub fn seed_stops_around(
    world: &mut World,
    center_lat: f64,
    center_lon: f64,
    density: StopDensity,
    origin: DateTime<Utc>,
) -> Vec<String> {
    let base = origin
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(origin);

    let mut created = Vec::new();
    for i in 0..density.target_stops() {
        let minutes_ahead = (i * 20) % (12 * 60);
        let when = base + Duration::minutes(minutes_ahead as i64);

        let dlat = 0.018 * ((i % 5) as f64 - 2.0) / 2.0;
        let dlon = 0.036 * ((i % 7) as f64 - 3.0) / 2.0 * center_lat.to_radians().cos();

        let id = world.resource_mut::<IdSource>().next("st");
        register_stop(
            world,
            ScheduledStop {
                id: id.clone(),
                lat: center_lat + dlat,
                lon: center_lon + dlon,
                scheduled_at: when,
                weight: 1.0,
            },
        );
        created.push(id);
    }

    debug!(stops = created.len(), density = ?density, "seeded stop cluster");
    created
}
