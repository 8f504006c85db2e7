//! Delivery-mode decay constants.
//!
//! The batching score decays exponentially with distance and elapsed time;
//! how fast depends on what the courier rides. A car tolerates distance, a
//! bicycle is sensitive to both.

use serde::{Deserialize, Deserializer, Serialize};

/// How the courier travels. Unknown values deserialize to [DeliveryMode::Motorcycle].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Car,
    #[default]
    Motorcycle,
    Bicycle,
}

impl<'de> Deserialize<'de> for DeliveryMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mode = String::deserialize(deserializer)?;
        Ok(match mode.as_str() {
            "car" => DeliveryMode::Car,
            "bicycle" => DeliveryMode::Bicycle,
            _ => DeliveryMode::Motorcycle,
        })
    }
}

/// Effective decay constants for one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConstants {
    /// Distance decay constant in meters.
    pub d0_m: f64,
    /// Time decay constant in minutes.
    pub t0_min: f64,
}

/// Adjust base decay constants for a delivery mode.
///
/// - car: d0 × 1.4, t0 × 1.0
/// - motorcycle: baseline
/// - bicycle: d0 × 0.7, t0 × 0.8
pub fn decay_for_mode(mode: DeliveryMode, base_d0_m: f64, base_t0_min: f64) -> DecayConstants {
    match mode {
        DeliveryMode::Car => DecayConstants {
            d0_m: base_d0_m * 1.4,
            t0_min: base_t0_min,
        },
        DeliveryMode::Bicycle => DecayConstants {
            d0_m: base_d0_m * 0.7,
            t0_min: base_t0_min * 0.8,
        },
        DeliveryMode::Motorcycle => DecayConstants {
            d0_m: base_d0_m,
            t0_min: base_t0_min,
        },
    }
}
