//! Collaborator contracts.
//!
//! The engine never queries storage directly. Neighbor candidates, cart
//! totals and settings snapshots arrive through these traits, so the backing
//! store (in-memory arena, SQL, a remote service) can be swapped without
//! touching the scoring path. Infrastructure failures surface as
//! [StoreError::Unavailable] and stay distinguishable from domain misses.

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};
use h3o::CellIndex;

use crate::availability::AvailabilityConfig;
use crate::params::ScoringParams;

/// One neighbor candidate as handed over by the stop store.
///
/// The store pre-filters by scheduled time only; the spatial filter is the
/// engine's job.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub scheduled_at: DateTime<Utc>,
    pub weight: f64,
    /// Resolution-9 cell of the stop location, when resolvable.
    pub cell: Option<CellIndex>,
}

/// Cheap time-range retrieval of committed stops.
pub trait StopSource {
    /// All stops with `scheduled_at` in `[from, to]`, both bounds inclusive.
    fn stops_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StopRecord>, StoreError>;
}

/// Cart aggregates needed for pricing and the solo-minimum rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal_cents: i64,
    /// Σ quantity × per-product unit factor.
    pub units_total: i64,
}

pub trait CartStore {
    fn cart_totals(&self, cart_id: &str) -> Result<CartTotals, StoreError>;
}

/// Source of the per-request configuration snapshot.
pub trait SettingsSource {
    fn scoring_params(&self) -> Result<ScoringParams, StoreError>;
    fn availability(&self) -> Result<AvailabilityConfig, StoreError>;
}

/// Fixed settings, for static deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    pub params: ScoringParams,
    pub availability: AvailabilityConfig,
}

impl SettingsSource for StaticSettings {
    fn scoring_params(&self) -> Result<ScoringParams, StoreError> {
        Ok(self.params.clone())
    }

    fn availability(&self) -> Result<AvailabilityConfig, StoreError> {
        Ok(self.availability.clone())
    }
}

/// Collaborator failure: either a domain miss or infrastructure trouble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    CartNotFound(String),
    ProductNotFound(String),
    /// The backing store could not answer; not a pricing outcome.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CartNotFound(id) => write!(f, "unknown cart {id}"),
            StoreError::ProductNotFound(id) => write!(f, "unknown product {id}"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_settings_hand_out_snapshot_copies() {
        let settings = StaticSettings {
            params: ScoringParams::default().with_discount_curve(0.3, 2.0),
            availability: AvailabilityConfig::weekday_afternoons(),
        };
        let params = settings.scoring_params().expect("params");
        assert_eq!(params.max_discount, 0.3);
        assert_eq!(params.k, 2.0);
        assert_eq!(
            settings.availability().expect("availability"),
            AvailabilityConfig::weekday_afternoons()
        );
    }
}
