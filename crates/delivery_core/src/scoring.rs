//! Batching score and dynamic fee computation.
//!
//! A slot's score sums, over every committed neighbor stop, the product of
//! two exponential decays: one in distance from the requesting user, one in
//! elapsed time from the slot midpoint. Dense nearby demand pushes the score
//! up; the score feeds a saturating discount curve whose output is clamped so
//! the fee never drops below the configured floor.
//!
//! Everything here is pure and synchronous; callers may invoke these from any
//! number of threads without coordination.

use serde::Serialize;
use std::fmt;

use crate::contracts::StopRecord;
use crate::ecs::DeliverySlot;
use crate::params::ScoringParams;
use crate::spatial::haversine_m;
use crate::time::elapsed_minutes;

/// Score how batchable `slot` is for a user at (`user_lat`, `user_lon`)
/// given the spatially pre-filtered `neighbors`.
///
/// A full slot scores exactly 0 regardless of neighbors. A near-full slot
/// (fill ratio at or above the configured threshold) has its score dampened
/// when dampening is enabled.
pub fn score_slot(
    user_lat: f64,
    user_lon: f64,
    slot: &DeliverySlot,
    neighbors: &[StopRecord],
    params: &ScoringParams,
) -> f64 {
    if slot.is_full() {
        return 0.0;
    }

    let decay = params.decay_constants();
    let midpoint = slot.midpoint();

    let mut score = 0.0;
    for n in neighbors {
        let dist_m = haversine_m(user_lat, user_lon, n.lat, n.lon);
        let dt_min = elapsed_minutes(midpoint, n.scheduled_at);
        score += n.weight * (-dist_m / decay.d0_m).exp() * (-dt_min / decay.t0_min).exp();
    }

    if params.near_full_dampening && slot.fill_ratio() >= params.near_full_threshold {
        score *= params.capacity_half_multiplier;
    }

    score
}

/// Convert a dimensionless score into a discount fraction.
///
/// Monotonically increasing, 0 at score 0, asymptotic to `max_discount`.
pub fn discount_from_score(score: f64, params: &ScoringParams) -> f64 {
    if score <= 0.0 {
        return 0.0;
    }
    params.max_discount * (1.0 - (-params.k * score).exp())
}

/// Fee amounts in minor currency units after applying a discount fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub base_fee_cents: i64,
    pub discount_cents: i64,
    pub final_fee_cents: i64,
}

/// Apply `discount_fraction` to the base fee, flooring at the minimum fee.
///
/// The fraction is clamped to [0, 1] before use. The floor guarantees the
/// merchant never delivers below cost, and the reported discount is the
/// amount actually taken off (never negative).
pub fn clamp_fee(base_fee_cents: i64, discount_fraction: f64, min_fee_cents: i64) -> FeeBreakdown {
    debug_assert!(
        min_fee_cents <= base_fee_cents,
        "fee floor must not exceed the base fee"
    );
    let fraction = discount_fraction.clamp(0.0, 1.0);
    let discounted = (base_fee_cents as f64 * (1.0 - fraction)).round() as i64;
    let final_fee_cents = discounted.max(min_fee_cents);
    FeeBreakdown {
        base_fee_cents,
        discount_cents: (base_fee_cents - final_fee_cents).max(0),
        final_fee_cents,
    }
}

/// Human-readable deal quality derived from the discount fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DealLabel {
    #[serde(rename = "Best deal")]
    Best,
    #[serde(rename = "Good deal")]
    Good,
    Standard,
}

impl fmt::Display for DealLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealLabel::Best => write!(f, "Best deal"),
            DealLabel::Good => write!(f, "Good deal"),
            DealLabel::Standard => write!(f, "Standard"),
        }
    }
}

/// Label a discount fraction relative to the configured maximum.
pub fn label_for_discount(discount_fraction: f64, params: &ScoringParams) -> DealLabel {
    if discount_fraction >= params.best_deal_ratio * params.max_discount {
        DealLabel::Best
    } else if discount_fraction >= params.good_deal_ratio * params.max_discount {
        DealLabel::Good
    } else {
        DealLabel::Standard
    }
}

/// Whether the minimum-order-size rule applies for an under-batched slot.
pub fn solo_minimum_required(score: f64, neighbor_count: usize, params: &ScoringParams) -> bool {
    neighbor_count == 0 || score < params.s_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn slot_at(start: DateTime<Utc>, total: u32, used: u32) -> DeliverySlot {
        DeliverySlot {
            id: "sl_test".into(),
            start_at: start,
            end_at: start + Duration::minutes(60),
            capacity_total: total,
            capacity_used: used,
        }
    }

    fn stop_at(lat: f64, lon: f64, at: DateTime<Utc>, weight: f64) -> StopRecord {
        StopRecord {
            id: "st_test".into(),
            lat,
            lon,
            scheduled_at: at,
            weight,
            cell: None,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
    }

    #[test]
    fn colocated_neighbor_at_midpoint_scores_one() {
        let params = ScoringParams::default();
        let slot = slot_at(start(), 10, 0);
        let neighbor = stop_at(52.52, 13.40, slot.midpoint(), 1.0);
        let score = score_slot(52.52, 13.40, &slot, &[neighbor], &params);
        assert!((score - 1.0).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn worked_example_yields_fee_393_discount_57() {
        // base 450, min 300, max discount 0.20, k = 1, score 1.0
        let params = ScoringParams::default();
        let slot = slot_at(start(), 10, 0);
        let neighbor = stop_at(52.52, 13.40, slot.midpoint(), 1.0);
        let score = score_slot(52.52, 13.40, &slot, &[neighbor], &params);
        let discount = discount_from_score(score, &params);
        assert!((discount - 0.1264).abs() < 1e-3, "got {discount}");
        let fee = clamp_fee(params.base_fee_cents, discount, params.min_fee_cents);
        assert_eq!(fee.final_fee_cents, 393);
        assert_eq!(fee.discount_cents, 57);
        assert_eq!(fee.base_fee_cents, 450);
    }

    #[test]
    fn zero_neighbors_mean_full_price_and_solo_rule() {
        let params = ScoringParams::default();
        let slot = slot_at(start(), 10, 0);
        let score = score_slot(52.52, 13.40, &slot, &[], &params);
        assert_eq!(score, 0.0);
        assert_eq!(discount_from_score(score, &params), 0.0);
        let fee = clamp_fee(params.base_fee_cents, 0.0, params.min_fee_cents);
        assert_eq!(fee.final_fee_cents, 450);
        assert!(solo_minimum_required(score, 0, &params));
    }

    #[test]
    fn full_slot_scores_zero_regardless_of_neighbors() {
        let params = ScoringParams::default();
        let slot = slot_at(start(), 10, 10);
        let neighbors: Vec<_> = (0..25)
            .map(|_| stop_at(52.52, 13.40, slot.midpoint(), 1.0))
            .collect();
        assert_eq!(score_slot(52.52, 13.40, &slot, &neighbors, &params), 0.0);
    }

    #[test]
    fn near_full_slot_is_dampened_by_half() {
        let params = ScoringParams::default();
        let roomy = slot_at(start(), 10, 0);
        let busy = slot_at(start(), 10, 8);
        let neighbor = stop_at(52.52, 13.40, roomy.midpoint(), 1.0);
        let open_score = score_slot(52.52, 13.40, &roomy, &[neighbor.clone()], &params);
        let busy_score = score_slot(52.52, 13.40, &busy, &[neighbor.clone()], &params);
        assert!((busy_score - open_score * 0.5).abs() < 1e-12);

        let undamped = params.clone().with_near_full_dampening(false);
        let raw = score_slot(52.52, 13.40, &busy, &[neighbor], &undamped);
        assert!((raw - open_score).abs() < 1e-12);
    }

    #[test]
    fn neighbor_weight_scales_its_contribution() {
        let params = ScoringParams::default();
        let slot = slot_at(start(), 10, 0);
        let heavy = stop_at(52.52, 13.40, slot.midpoint(), 2.5);
        let score = score_slot(52.52, 13.40, &slot, &[heavy], &params);
        assert!((score - 2.5).abs() < 1e-12);
    }

    #[test]
    fn discount_is_monotonic_and_bounded() {
        let params = ScoringParams::default();
        let mut prev = discount_from_score(0.0, &params);
        assert_eq!(prev, 0.0);
        for i in 1..=100 {
            let d = discount_from_score(i as f64 * 0.25, &params);
            assert!(d >= prev);
            assert!(d < params.max_discount);
            prev = d;
        }
    }

    #[test]
    fn fee_never_drops_below_the_floor() {
        let fee = clamp_fee(450, 0.99, 300);
        assert_eq!(fee.final_fee_cents, 300);
        assert_eq!(fee.discount_cents, 150);

        // fraction outside [0, 1] is clamped, not propagated
        let fee = clamp_fee(450, 7.0, 300);
        assert_eq!(fee.final_fee_cents, 300);
        let fee = clamp_fee(450, -0.5, 300);
        assert_eq!(fee.final_fee_cents, 450);
        assert_eq!(fee.discount_cents, 0);
    }

    #[test]
    fn labels_follow_the_ratio_thresholds() {
        let params = ScoringParams::default();
        // max discount 0.20: best from 0.14, good from 0.06
        assert_eq!(label_for_discount(0.15, &params), DealLabel::Best);
        assert_eq!(label_for_discount(0.10, &params), DealLabel::Good);
        assert_eq!(label_for_discount(0.061, &params), DealLabel::Good);
        assert_eq!(label_for_discount(0.059, &params), DealLabel::Standard);
        assert_eq!(label_for_discount(0.02, &params), DealLabel::Standard);
        assert_eq!(DealLabel::Best.to_string(), "Best deal");
    }

    #[test]
    fn solo_rule_uses_the_score_threshold() {
        let params = ScoringParams::default();
        assert!(solo_minimum_required(0.0, 0, &params));
        assert!(solo_minimum_required(10.0, 0, &params));
        assert!(solo_minimum_required(0.049, 3, &params));
        assert!(!solo_minimum_required(0.05, 3, &params));
        assert!(!solo_minimum_required(1.0, 1, &params));
    }

    #[test]
    fn bicycle_mode_decays_faster_with_distance() {
        let base = ScoringParams::default();
        let bike = base.clone().with_delivery_mode(crate::decay::DeliveryMode::Bicycle);
        let slot = slot_at(start(), 10, 0);
        // ~1.1 km north of the user
        let neighbor = stop_at(52.52 + 0.01, 13.40, slot.midpoint(), 1.0);
        let s_moto = score_slot(52.52, 13.40, &slot, &[neighbor.clone()], &base);
        let s_bike = score_slot(52.52, 13.40, &slot, &[neighbor], &bike);
        assert!(s_bike < s_moto);
    }
}
