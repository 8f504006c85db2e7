use bevy_ecs::prelude::{Component, Entity};
use chrono::{DateTime, Utc};

use crate::time::slot_midpoint;

/// A fixed-duration delivery window with finite capacity.
///
/// `start_at..end_at` is half-open. `capacity_used` only ever grows, by one
/// per finalized quote, capped at `capacity_total`.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct DeliverySlot {
    pub id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub capacity_total: u32,
    pub capacity_used: u32,
}

impl DeliverySlot {
    pub fn is_full(&self) -> bool {
        self.capacity_used >= self.capacity_total
    }

    /// Fraction of capacity in use; full when total is zero.
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity_total == 0 {
            return 1.0;
        }
        f64::from(self.capacity_used) / f64::from(self.capacity_total)
    }

    pub fn midpoint(&self) -> DateTime<Utc> {
        slot_midpoint(self.start_at, self.end_at)
    }
}

/// An already-committed delivery; nearby stops make a slot cheaper to serve.
/// Immutable once spawned.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct ScheduledStop {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub scheduled_at: DateTime<Utc>,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Born locked; honorable for payment until `locked_until`.
    Locked,
    /// Converted into an order and a stop; terminal.
    Finalized,
}

/// A price-locked commitment tying a cart, a slot, and a location together.
/// Amounts are integer minor currency units, frozen at creation.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Quote {
    pub id: String,
    pub cart_id: String,
    pub slot_id: String,
    pub slot: Entity,
    pub lat: f64,
    pub lon: f64,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub locked_until: DateTime<Utc>,
    pub state: QuoteState,
}

impl Quote {
    /// Expiry is a predicate evaluated at use time, not a timer.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.locked_until
    }
}

/// The confirmed order a finalized quote produces, exactly once.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Order {
    pub id: String,
    pub quote_id: String,
    pub cart_id: String,
    pub slot_id: String,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub lat: f64,
    pub lon: f64,
    pub confirmed_at: DateTime<Utc>,
}
