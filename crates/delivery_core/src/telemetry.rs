//! Telemetry: records pricing computations and finalized orders for analysis.

use bevy_ecs::prelude::Resource;
use chrono::{DateTime, Utc};

/// One slot pricing computation, recorded when a listing is served.
#[derive(Debug, Clone)]
pub struct PricedSlotSample {
    pub slot_id: String,
    pub computed_at: DateTime<Utc>,
    pub score: f64,
    pub discount_fraction: f64,
    pub final_fee_cents: i64,
    pub neighbor_count: usize,
    pub requires_solo_minimum: bool,
}

/// One finalized order, recorded when its quote converts.
#[derive(Debug, Clone)]
pub struct FinalizedOrderRecord {
    pub order_id: String,
    pub quote_id: String,
    pub slot_id: String,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub lat: f64,
    pub lon: f64,
    pub finalized_at: DateTime<Utc>,
}

impl FinalizedOrderRecord {
    /// Fee before the discount was taken off.
    pub fn base_fee_cents(&self) -> i64 {
        self.delivery_fee_cents + self.discount_cents
    }

    /// Fraction of the base fee actually discounted.
    pub fn effective_discount(&self) -> f64 {
        let base = self.base_fee_cents();
        if base == 0 {
            return 0.0;
        }
        self.discount_cents as f64 / base as f64
    }
}

/// Collects engine telemetry. Insert as a resource to record pricing activity.
#[derive(Debug, Default, Resource)]
pub struct PricingTelemetry {
    pub priced_slots: Vec<PricedSlotSample>,
    pub finalized_orders: Vec<FinalizedOrderRecord>,
    pub quotes_created: u64,
    /// Finalize calls that hit an already-finalized quote.
    pub finalize_replays: u64,
    pub solo_minimum_rejections: u64,
}
