//! Arena-backed indices over the ECS world.
//!
//! Slots, quotes and stops live as entities; these resources are the lookup
//! side: id → entity maps plus a scheduled-time B-tree over stop records.
//! The time index is the in-crate [StopSource]: it answers the cheap
//! time-range query, leaving the spatial filter to the engine.

use std::collections::{BTreeMap, HashMap};

use bevy_ecs::prelude::{Entity, Resource, World};
use chrono::{DateTime, Utc};

use crate::contracts::{StopRecord, StopSource, StoreError};
use crate::ecs::ScheduledStop;
use crate::spatial::{cell_for, StopSpatialIndex};

/// Slot id → entity.
#[derive(Debug, Default, Resource)]
pub struct SlotIndex {
    by_id: HashMap<String, Entity>,
}

impl SlotIndex {
    pub fn insert(&mut self, id: String, entity: Entity) {
        self.by_id.insert(id, entity);
    }

    pub fn get(&self, id: &str) -> Option<Entity> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Quote id → entity.
#[derive(Debug, Default, Resource)]
pub struct QuoteIndex {
    by_id: HashMap<String, Entity>,
}

impl QuoteIndex {
    pub fn insert(&mut self, id: String, entity: Entity) {
        self.by_id.insert(id, entity);
    }

    pub fn get(&self, id: &str) -> Option<Entity> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Scheduled-time index over committed stops.
///
/// Kept denormalized (full [StopRecord] copies) so range queries need no
/// component access; the stop entity remains authoritative.
#[derive(Debug, Default, Resource)]
pub struct StopTimeIndex {
    by_time: BTreeMap<DateTime<Utc>, Vec<StopRecord>>,
    count: usize,
}

impl StopTimeIndex {
    pub fn insert(&mut self, record: StopRecord) {
        self.by_time.entry(record.scheduled_at).or_default().push(record);
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl StopSource for StopTimeIndex {
    fn stops_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StopRecord>, StoreError> {
        Ok(self
            .by_time
            .range(from..=to)
            .flat_map(|(_, records)| records.iter().cloned())
            .collect())
    }
}

/// Spawn a stop entity and register it in the time and spatial indices.
pub fn register_stop(world: &mut World, stop: ScheduledStop) -> Entity {
    let record = StopRecord {
        id: stop.id.clone(),
        lat: stop.lat,
        lon: stop.lon,
        scheduled_at: stop.scheduled_at,
        weight: stop.weight,
        cell: cell_for(stop.lat, stop.lon),
    };
    let entity = world.spawn(stop).id();
    if let Some(mut index) = world.get_resource_mut::<StopTimeIndex>() {
        index.insert(record.clone());
    }
    if let Some(cell) = record.cell {
        if let Some(mut spatial) = world.get_resource_mut::<StopSpatialIndex>() {
            spatial.insert_stop(entity, cell);
        }
    }
    entity
}
