//! Neighbor inspection: why did this slot price the way it did?

use bevy_ecs::prelude::World;
use chrono::{DateTime, Duration, Utc};

use crate::contracts::StopSource;
use crate::ecs::DeliverySlot;
use crate::error::PricingError;
use crate::params::ScoringParams;
use crate::scoring::{discount_from_score, score_slot};
use crate::spatial::{cell_for, haversine_m, valid_coordinates, within_radius_m, StopSpatialIndex};
use crate::store::{SlotIndex, StopTimeIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct NeighborDistance {
    pub id: String,
    pub distance_m: f64,
    pub scheduled_at: DateTime<Utc>,
}

/// Debug readout for one slot/location pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborDebug {
    pub slot_id: String,
    pub start_at: DateTime<Utc>,
    pub t0_min: f64,
    pub radius_m: f64,
    /// Candidates returned by the time-window query, before the radius filter.
    pub in_time_window: usize,
    pub within_radius: Vec<NeighborDistance>,
    /// Committed stops near the user regardless of time window.
    pub committed_nearby: usize,
    pub score: f64,
    pub expected_discount: f64,
}

pub fn inspect_neighbors(
    world: &mut World,
    params: &ScoringParams,
    slot_id: &str,
    lat: f64,
    lon: f64,
) -> Result<NeighborDebug, PricingError> {
    if !valid_coordinates(lat, lon) {
        return Err(PricingError::InvalidCoordinates { lat, lon });
    }

    let entity = world
        .resource::<SlotIndex>()
        .get(slot_id)
        .ok_or_else(|| PricingError::SlotNotFound(slot_id.to_string()))?;
    let slot = world
        .get::<DeliverySlot>(entity)
        .ok_or_else(|| PricingError::SlotNotFound(slot_id.to_string()))?
        .clone();

    let user_cell = cell_for(lat, lon);
    let half_window = Duration::seconds((params.t0_min * 60.0).round() as i64);
    let candidates = world
        .resource::<StopTimeIndex>()
        .stops_in_window(slot.start_at - half_window, slot.end_at + half_window)
        .map_err(PricingError::from)?;
    let in_time_window = candidates.len();

    let neighbors: Vec<_> = candidates
        .into_iter()
        .filter(|n| within_radius_m(lat, lon, user_cell, n.lat, n.lon, n.cell, params.radius_m))
        .collect();
    let within_radius = neighbors
        .iter()
        .map(|n| NeighborDistance {
            id: n.id.clone(),
            distance_m: haversine_m(lat, lon, n.lat, n.lon),
            scheduled_at: n.scheduled_at,
        })
        .collect();

    let committed_nearby = match user_cell {
        Some(cell) => world
            .resource::<StopSpatialIndex>()
            .stops_near(cell, params.radius_m)
            .len(),
        None => 0,
    };

    let score = score_slot(lat, lon, &slot, &neighbors, params);

    Ok(NeighborDebug {
        slot_id: slot.id,
        start_at: slot.start_at,
        t0_min: params.t0_min,
        radius_m: params.radius_m,
        in_time_window,
        within_radius,
        committed_nearby,
        score,
        expected_discount: discount_from_score(score, params),
    })
}
