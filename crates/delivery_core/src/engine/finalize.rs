//! Quote finalization: payment succeeded, convert the quote into an order,
//! a committed stop, and one unit of slot capacity.

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ecs::{DeliverySlot, Order, Quote, QuoteState, ScheduledStop};
use crate::error::PricingError;
use crate::store::{register_stop, QuoteIndex};
use crate::telemetry::{FinalizedOrderRecord, PricingTelemetry};
use crate::util::IdSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// First finalization: one order, one stop, capacity incremented.
    Finalized { order_id: String, stop_id: String },
    /// Replayed payment signal; nothing changed.
    AlreadyFinalized,
}

/// Finalize a quote at most once.
///
/// The whole transition runs under exclusive world access, so concurrent
/// payment signals for the same slot cannot lose a capacity update. Replays
/// are no-ops; expired quotes are rejected.
pub fn finalize_quote(
    world: &mut World,
    quote_id: &str,
    now: DateTime<Utc>,
) -> Result<FinalizeOutcome, PricingError> {
    let quote_entity = world
        .resource::<QuoteIndex>()
        .get(quote_id)
        .ok_or_else(|| PricingError::QuoteNotFound(quote_id.to_string()))?;
    let quote = world
        .get::<Quote>(quote_entity)
        .ok_or_else(|| PricingError::QuoteNotFound(quote_id.to_string()))?
        .clone();

    if quote.state == QuoteState::Finalized {
        world.resource_mut::<PricingTelemetry>().finalize_replays += 1;
        debug!(quote = %quote.id, "finalize replay ignored");
        return Ok(FinalizeOutcome::AlreadyFinalized);
    }
    if quote.is_expired(now) {
        return Err(PricingError::QuoteExpired {
            quote_id: quote.id,
            locked_until: quote.locked_until,
        });
    }

    let slot_start = {
        let mut slot = world
            .get_mut::<DeliverySlot>(quote.slot)
            .ok_or_else(|| PricingError::SlotNotFound(quote.slot_id.clone()))?;
        slot.capacity_used = (slot.capacity_used + 1).min(slot.capacity_total);
        slot.start_at
    };

    let (order_id, stop_id) = {
        let mut ids = world.resource_mut::<IdSource>();
        (ids.next("ord"), ids.next("st"))
    };

    world.spawn(Order {
        id: order_id.clone(),
        quote_id: quote.id.clone(),
        cart_id: quote.cart_id.clone(),
        slot_id: quote.slot_id.clone(),
        subtotal_cents: quote.subtotal_cents,
        delivery_fee_cents: quote.delivery_fee_cents,
        discount_cents: quote.discount_cents,
        total_cents: quote.total_cents,
        lat: quote.lat,
        lon: quote.lon,
        confirmed_at: now,
    });

    if let Some(mut stored) = world.get_mut::<Quote>(quote_entity) {
        stored.state = QuoteState::Finalized;
    }

    // The new stop lands at the slot start, inside the window it batches into.
    register_stop(
        world,
        ScheduledStop {
            id: stop_id.clone(),
            lat: quote.lat,
            lon: quote.lon,
            scheduled_at: slot_start,
            weight: 1.0,
        },
    );

    let mut telemetry = world.resource_mut::<PricingTelemetry>();
    telemetry.finalized_orders.push(FinalizedOrderRecord {
        order_id: order_id.clone(),
        quote_id: quote.id.clone(),
        slot_id: quote.slot_id.clone(),
        subtotal_cents: quote.subtotal_cents,
        delivery_fee_cents: quote.delivery_fee_cents,
        discount_cents: quote.discount_cents,
        total_cents: quote.total_cents,
        lat: quote.lat,
        lon: quote.lon,
        finalized_at: now,
    });

    debug!(quote = %quote.id, order = %order_id, stop = %stop_id, "quote finalized");

    Ok(FinalizeOutcome::Finalized { order_id, stop_id })
}
