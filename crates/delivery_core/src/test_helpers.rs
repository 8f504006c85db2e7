//! Test helpers for common setup and fixtures.
//!
//! Shared across unit and integration tests to reduce duplication.

use bevy_ecs::prelude::{Entity, World};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::ecs::{DeliverySlot, ScheduledStop};
use crate::spatial::StopSpatialIndex;
use crate::store::{register_stop, QuoteIndex, SlotIndex, StopTimeIndex};
use crate::telemetry::PricingTelemetry;
use crate::util::IdSource;

/// A standard test location: central Berlin.
pub const TEST_LAT: f64 = 52.520008;
pub const TEST_LON: f64 = 13.404954;

/// A fixed reference instant: Monday 2026-03-02 14:00 UTC.
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0)
        .single()
        .expect("fixed test instant is valid")
}

/// Create a world with all engine resources and a seeded id source, but no
/// slots or stops. For full seeded scenarios use [crate::scenario::build_world].
pub fn create_test_world(seed: u64) -> World {
    let mut world = World::new();
    world.insert_resource(SlotIndex::default());
    world.insert_resource(QuoteIndex::default());
    world.insert_resource(StopTimeIndex::default());
    world.insert_resource(StopSpatialIndex::default());
    world.insert_resource(PricingTelemetry::default());
    world.insert_resource(IdSource::new(Some(seed)));
    world
}

/// Spawn a one-hour slot and register it in the slot index.
pub fn spawn_test_slot(
    world: &mut World,
    id: &str,
    start_at: DateTime<Utc>,
    capacity_total: u32,
    capacity_used: u32,
) -> Entity {
    let entity = world
        .spawn(DeliverySlot {
            id: id.to_string(),
            start_at,
            end_at: start_at + Duration::minutes(60),
            capacity_total,
            capacity_used,
        })
        .id();
    world
        .resource_mut::<SlotIndex>()
        .insert(id.to_string(), entity);
    entity
}

/// Spawn a committed stop, registering it in the time and spatial indices.
pub fn spawn_test_stop(
    world: &mut World,
    lat: f64,
    lon: f64,
    scheduled_at: DateTime<Utc>,
    weight: f64,
) -> String {
    let id = world.resource_mut::<IdSource>().next("st");
    register_stop(
        world,
        ScheduledStop {
            id: id.clone(),
            lat,
            lon,
            scheduled_at,
            weight,
        },
    );
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_is_a_monday() {
        use chrono::Datelike;
        assert_eq!(test_instant().weekday().number_from_monday(), 1);
    }

    #[test]
    fn spawned_slot_is_indexed() {
        let mut world = create_test_world(1);
        let entity = spawn_test_slot(&mut world, "sl_1", test_instant(), 10, 0);
        assert_eq!(world.resource::<SlotIndex>().get("sl_1"), Some(entity));
    }
}
