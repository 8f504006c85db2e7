//! Scoring parameters: one immutable snapshot per pricing request.
//!
//! Every engine call takes an explicit [ScoringParams] value instead of
//! reading process-wide mutable settings, so concurrent requests can never
//! observe each other's configuration and tests run against fixed fixtures.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::decay::{decay_for_mode, DecayConstants, DeliveryMode};

/// Default base delivery fee in currency minor units.
pub const DEFAULT_BASE_FEE_CENTS: i64 = 450;
/// Default floor for the delivery fee in currency minor units.
pub const DEFAULT_MIN_FEE_CENTS: i64 = 300;
/// Default cap on the discount fraction.
pub const DEFAULT_MAX_DISCOUNT: f64 = 0.20;
/// Default discount curve steepness.
pub const DEFAULT_K: f64 = 1.0;
/// Default neighbor search radius in meters.
pub const DEFAULT_RADIUS_M: f64 = 3_000.0;
/// Default neighbor time half-window in minutes.
pub const DEFAULT_T0_MIN: f64 = 30.0;
/// Default minimum-score threshold below which the solo rule applies.
pub const DEFAULT_S_MIN: f64 = 0.05;
/// Default minimum cart units for an under-batched slot.
pub const DEFAULT_MIN_SOLO_UNITS: i64 = 6;
/// Default distance decay constant in meters.
pub const DEFAULT_D0_M: f64 = 800.0;
/// Default capacity ratio above which a slot counts as near-full.
pub const DEFAULT_NEAR_FULL_THRESHOLD: f64 = 0.8;
/// Default score multiplier applied to near-full slots.
pub const DEFAULT_CAPACITY_HALF_MULTIPLIER: f64 = 0.5;
/// Default quote lock window in minutes.
pub const DEFAULT_QUOTE_LOCK_MINUTES: i64 = 15;

/// Immutable scoring/fee configuration snapshot.
///
/// May originate from persisted settings or these static defaults; the engine
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringParams {
    pub base_fee_cents: i64,
    pub min_fee_cents: i64,
    pub max_discount: f64,
    pub k: f64,
    pub radius_m: f64,
    pub t0_min: f64,
    pub s_min: f64,
    pub min_solo_units: i64,
    pub delivery_mode: DeliveryMode,
    pub d0_m: f64,
    pub near_full_threshold: f64,
    pub capacity_half_multiplier: f64,
    /// Discount ratio (relative to `max_discount`) from which a slot is
    /// labelled a best deal.
    pub best_deal_ratio: f64,
    /// Discount ratio from which a slot is labelled a good deal.
    pub good_deal_ratio: f64,
    pub quote_lock_minutes: i64,
    /// Dampen the score of near-full slots.
    pub near_full_dampening: bool,
    /// Adjust decay constants for the configured delivery mode.
    pub mode_adjusted_decay: bool,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_fee_cents: DEFAULT_BASE_FEE_CENTS,
            min_fee_cents: DEFAULT_MIN_FEE_CENTS,
            max_discount: DEFAULT_MAX_DISCOUNT,
            k: DEFAULT_K,
            radius_m: DEFAULT_RADIUS_M,
            t0_min: DEFAULT_T0_MIN,
            s_min: DEFAULT_S_MIN,
            min_solo_units: DEFAULT_MIN_SOLO_UNITS,
            delivery_mode: DeliveryMode::default(),
            d0_m: DEFAULT_D0_M,
            near_full_threshold: DEFAULT_NEAR_FULL_THRESHOLD,
            capacity_half_multiplier: DEFAULT_CAPACITY_HALF_MULTIPLIER,
            best_deal_ratio: 0.7,
            good_deal_ratio: 0.3,
            quote_lock_minutes: DEFAULT_QUOTE_LOCK_MINUTES,
            near_full_dampening: true,
            mode_adjusted_decay: true,
        }
    }
}

impl ScoringParams {
    pub fn with_delivery_mode(mut self, mode: DeliveryMode) -> Self {
        self.delivery_mode = mode;
        self
    }

    pub fn with_fees(mut self, base_fee_cents: i64, min_fee_cents: i64) -> Self {
        self.base_fee_cents = base_fee_cents;
        self.min_fee_cents = min_fee_cents;
        self
    }

    pub fn with_discount_curve(mut self, max_discount: f64, k: f64) -> Self {
        self.max_discount = max_discount;
        self.k = k;
        self
    }

    pub fn with_neighbor_window(mut self, radius_m: f64, t0_min: f64) -> Self {
        self.radius_m = radius_m;
        self.t0_min = t0_min;
        self
    }

    pub fn with_solo_rule(mut self, s_min: f64, min_solo_units: i64) -> Self {
        self.s_min = s_min;
        self.min_solo_units = min_solo_units;
        self
    }

    pub fn with_near_full_dampening(mut self, enabled: bool) -> Self {
        self.near_full_dampening = enabled;
        self
    }

    pub fn with_mode_adjusted_decay(mut self, enabled: bool) -> Self {
        self.mode_adjusted_decay = enabled;
        self
    }

    /// Effective decay constants for this snapshot, honoring the
    /// mode-adjustment toggle.
    pub fn decay_constants(&self) -> DecayConstants {
        if self.mode_adjusted_decay {
            decay_for_mode(self.delivery_mode, self.d0_m, self.t0_min)
        } else {
            DecayConstants {
                d0_m: self.d0_m,
                t0_min: self.t0_min,
            }
        }
    }
}
