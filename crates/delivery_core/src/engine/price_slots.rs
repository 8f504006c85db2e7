//! Priced slot listings: availability filter, neighbor selection, scoring.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Duration, Utc};
use h3o::CellIndex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::availability::AvailabilityConfig;
use crate::contracts::{StopRecord, StopSource};
use crate::ecs::DeliverySlot;
use crate::error::PricingError;
use crate::params::ScoringParams;
use crate::scoring::{
    clamp_fee, discount_from_score, label_for_discount, score_slot, solo_minimum_required,
    DealLabel, FeeBreakdown,
};
use crate::spatial::{cell_for, valid_coordinates, within_radius_m};
use crate::store::{SlotIndex, StopTimeIndex};
use crate::telemetry::{PricedSlotSample, PricingTelemetry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCapacityView {
    pub total: u32,
    pub used: u32,
}

/// One row of a priced listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedSlot {
    pub slot_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub base_fee_cents: i64,
    pub discount_fraction: f64,
    pub discount_cents: i64,
    pub final_fee_cents: i64,
    pub label: DealLabel,
    pub capacity: SlotCapacityView,
    pub requires_solo_minimum: bool,
    pub solo_min_units: i64,
}

/// A priced listing, stamped with the parameter snapshot it was computed from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedSlots {
    pub computed_at: DateTime<Utc>,
    pub params: ScoringParams,
    pub slots: Vec<PricedSlot>,
}

/// Ids of all slots starting within `[from, to]`, ordered by start time.
pub fn slots_in_horizon(
    world: &mut World,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<String> {
    let mut slots: Vec<(DateTime<Utc>, String)> = world
        .query::<&DeliverySlot>()
        .iter(world)
        .filter(|slot| slot.start_at >= from && slot.start_at <= to)
        .map(|slot| (slot.start_at, slot.id.clone()))
        .collect();
    slots.sort();
    slots.into_iter().map(|(_, id)| id).collect()
}

/// Select the neighbors for one slot: the stop store answers the inclusive
/// time window `[start − t0, end + t0]`, then the engine applies the radius
/// filter (padded cell prefilter plus exact haversine).
pub(crate) fn select_neighbors(
    stops: &dyn StopSource,
    params: &ScoringParams,
    user_lat: f64,
    user_lon: f64,
    user_cell: Option<CellIndex>,
    slot: &DeliverySlot,
) -> Result<Vec<StopRecord>, PricingError> {
    let half_window = Duration::seconds((params.t0_min * 60.0).round() as i64);
    let mut candidates = stops
        .stops_in_window(slot.start_at - half_window, slot.end_at + half_window)
        .map_err(PricingError::from)?;
    candidates.retain(|n| {
        within_radius_m(user_lat, user_lon, user_cell, n.lat, n.lon, n.cell, params.radius_m)
    });
    Ok(candidates)
}

pub(crate) struct SlotPricing {
    pub score: f64,
    pub discount_fraction: f64,
    pub fee: FeeBreakdown,
    pub label: DealLabel,
    pub requires_solo_minimum: bool,
    pub neighbor_count: usize,
}

pub(crate) fn price_slot(
    user_lat: f64,
    user_lon: f64,
    slot: &DeliverySlot,
    neighbors: &[StopRecord],
    params: &ScoringParams,
) -> SlotPricing {
    let score = score_slot(user_lat, user_lon, slot, neighbors, params);
    let discount_fraction = discount_from_score(score, params);
    let fee = clamp_fee(params.base_fee_cents, discount_fraction, params.min_fee_cents);
    SlotPricing {
        score,
        discount_fraction,
        fee,
        label: label_for_discount(discount_fraction, params),
        requires_solo_minimum: solo_minimum_required(score, neighbors.len(), params),
        neighbor_count: neighbors.len(),
    }
}

/// Price the candidate slots for a user location.
///
/// Slots outside every availability window are absent from the result.
/// Full slots stay listed at the base fee. Rows are ordered by slot start
/// ascending. Unknown slot ids fail the whole call; no partial listing is
/// returned.
pub fn list_priced_slots(
    world: &mut World,
    params: &ScoringParams,
    availability: &AvailabilityConfig,
    user_lat: f64,
    user_lon: f64,
    candidate_slots: &[String],
    as_of: DateTime<Utc>,
) -> Result<PricedSlots, PricingError> {
    if !valid_coordinates(user_lat, user_lon) {
        return Err(PricingError::InvalidCoordinates {
            lat: user_lat,
            lon: user_lon,
        });
    }
    let user_cell = cell_for(user_lat, user_lon);

    let mut slots = Vec::with_capacity(candidate_slots.len());
    for id in candidate_slots {
        let entity = world
            .resource::<SlotIndex>()
            .get(id)
            .ok_or_else(|| PricingError::SlotNotFound(id.clone()))?;
        let slot = world
            .get::<DeliverySlot>(entity)
            .ok_or_else(|| PricingError::SlotNotFound(id.clone()))?
            .clone();
        slots.push(slot);
    }

    slots.retain(|slot| {
        let visible = availability.allows(slot.start_at);
        if !visible {
            trace!(slot = %slot.id, start = %slot.start_at, "slot outside availability windows");
        }
        visible
    });
    slots.sort_by_key(|slot| slot.start_at);

    let mut rows = Vec::with_capacity(slots.len());
    let mut samples = Vec::with_capacity(slots.len());
    {
        let stops = world.resource::<StopTimeIndex>();
        for slot in &slots {
            let neighbors = select_neighbors(stops, params, user_lat, user_lon, user_cell, slot)?;
            let pricing = price_slot(user_lat, user_lon, slot, &neighbors, params);
            samples.push(PricedSlotSample {
                slot_id: slot.id.clone(),
                computed_at: as_of,
                score: pricing.score,
                discount_fraction: pricing.discount_fraction,
                final_fee_cents: pricing.fee.final_fee_cents,
                neighbor_count: pricing.neighbor_count,
                requires_solo_minimum: pricing.requires_solo_minimum,
            });
            rows.push(PricedSlot {
                slot_id: slot.id.clone(),
                start_at: slot.start_at,
                end_at: slot.end_at,
                base_fee_cents: pricing.fee.base_fee_cents,
                discount_fraction: pricing.discount_fraction,
                discount_cents: pricing.fee.discount_cents,
                final_fee_cents: pricing.fee.final_fee_cents,
                label: pricing.label,
                capacity: SlotCapacityView {
                    total: slot.capacity_total,
                    used: slot.capacity_used,
                },
                requires_solo_minimum: pricing.requires_solo_minimum,
                solo_min_units: params.min_solo_units,
            });
        }
    }

    world
        .resource_mut::<PricingTelemetry>()
        .priced_slots
        .extend(samples);
    debug!(slots = rows.len(), "priced slot listing computed");

    Ok(PricedSlots {
        computed_at: as_of,
        params: params.clone(),
        slots: rows,
    })
}
