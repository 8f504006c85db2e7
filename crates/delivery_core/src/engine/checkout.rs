//! Checkout pricing: turn a cart + slot + location into a locked quote.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::contracts::CartStore;
use crate::ecs::{DeliverySlot, Quote, QuoteState};
use crate::engine::price_slots::{price_slot, select_neighbors};
use crate::error::PricingError;
use crate::params::ScoringParams;
use crate::scoring::DealLabel;
use crate::spatial::{cell_for, valid_coordinates};
use crate::store::{QuoteIndex, SlotIndex, StopTimeIndex};
use crate::telemetry::PricingTelemetry;
use crate::util::IdSource;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub cart_id: String,
    pub slot_id: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteAmounts {
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// What the caller gets back: the quote id, how long the price holds, and
/// the frozen amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteReceipt {
    pub quote_id: String,
    pub locked_until: DateTime<Utc>,
    pub amounts: QuoteAmounts,
    pub label: DealLabel,
    pub requires_solo_minimum: bool,
}

/// Price a cart for a slot and user location, enforcing the solo-minimum
/// rule, and freeze the result into a [Quote] locked for the configured
/// window.
pub fn price_checkout(
    world: &mut World,
    carts: &dyn CartStore,
    params: &ScoringParams,
    request: &CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<QuoteReceipt, PricingError> {
    if !valid_coordinates(request.lat, request.lon) {
        return Err(PricingError::InvalidCoordinates {
            lat: request.lat,
            lon: request.lon,
        });
    }

    let slot_entity = world
        .resource::<SlotIndex>()
        .get(&request.slot_id)
        .ok_or_else(|| PricingError::SlotNotFound(request.slot_id.clone()))?;
    let slot = world
        .get::<DeliverySlot>(slot_entity)
        .ok_or_else(|| PricingError::SlotNotFound(request.slot_id.clone()))?
        .clone();

    let totals = carts.cart_totals(&request.cart_id)?;

    let user_cell = cell_for(request.lat, request.lon);
    let pricing = {
        let stops = world.resource::<StopTimeIndex>();
        let neighbors =
            select_neighbors(stops, params, request.lat, request.lon, user_cell, &slot)?;
        price_slot(request.lat, request.lon, &slot, &neighbors, params)
    };

    if pricing.requires_solo_minimum && totals.units_total < params.min_solo_units {
        world.resource_mut::<PricingTelemetry>().solo_minimum_rejections += 1;
        return Err(PricingError::SoloMinimumNotMet {
            required_units: params.min_solo_units,
            cart_units: totals.units_total,
        });
    }

    let amounts = QuoteAmounts {
        subtotal_cents: totals.subtotal_cents,
        delivery_fee_cents: pricing.fee.final_fee_cents,
        discount_cents: pricing.fee.discount_cents,
        total_cents: totals.subtotal_cents + pricing.fee.final_fee_cents,
    };

    let quote_id = world.resource_mut::<IdSource>().next("q");
    let locked_until = now + Duration::minutes(params.quote_lock_minutes);
    let quote_entity = world
        .spawn(Quote {
            id: quote_id.clone(),
            cart_id: request.cart_id.clone(),
            slot_id: slot.id.clone(),
            slot: slot_entity,
            lat: request.lat,
            lon: request.lon,
            subtotal_cents: amounts.subtotal_cents,
            delivery_fee_cents: amounts.delivery_fee_cents,
            discount_cents: amounts.discount_cents,
            total_cents: amounts.total_cents,
            locked_until,
            state: QuoteState::Locked,
        })
        .id();
    world
        .resource_mut::<QuoteIndex>()
        .insert(quote_id.clone(), quote_entity);
    world.resource_mut::<PricingTelemetry>().quotes_created += 1;

    debug!(
        quote = %quote_id,
        slot = %slot.id,
        fee_cents = amounts.delivery_fee_cents,
        discount_cents = amounts.discount_cents,
        "quote created"
    );

    Ok(QuoteReceipt {
        quote_id,
        locked_until,
        amounts,
        label: pricing.label,
        requires_solo_minimum: pricing.requires_solo_minimum,
    })
}
