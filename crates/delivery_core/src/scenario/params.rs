use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityConfig;
use crate::params::ScoringParams;

/// Default center: Berlin.
const DEFAULT_CENTER_LAT: f64 = 52.520008;
const DEFAULT_CENTER_LON: f64 = 13.404954;

/// How many synthetic stops to scatter around the center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopDensity {
    Low,
    #[default]
    Medium,
    High,
}

impl StopDensity {
    pub fn target_stops(self) -> usize {
        match self {
            StopDensity::Low => 10,
            StopDensity::Medium => 25,
            StopDensity::High => 60,
        }
    }
}

/// Parameters for building a seeded pricing world.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub seed: Option<u64>,
    /// Rolling slot horizon in days.
    pub horizon_days: u32,
    /// First seeded slot hour of each day (inclusive).
    pub first_hour: u32,
    /// Last seeded slot hour of each day (exclusive).
    pub last_hour: u32,
    pub slot_minutes: i64,
    pub slot_capacity: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub stop_density: StopDensity,
    pub scoring: ScoringParams,
    pub availability: AvailabilityConfig,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            seed: None,
            horizon_days: 3,
            first_hour: 12,
            last_hour: 20,
            slot_minutes: 60,
            slot_capacity: 10,
            center_lat: DEFAULT_CENTER_LAT,
            center_lon: DEFAULT_CENTER_LON,
            stop_density: StopDensity::default(),
            scoring: ScoringParams::default(),
            availability: AvailabilityConfig::always(),
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_daily_hours(mut self, first_hour: u32, last_hour: u32) -> Self {
        self.first_hour = first_hour;
        self.last_hour = last_hour;
        self
    }

    pub fn with_slot_capacity(mut self, capacity: u32) -> Self {
        self.slot_capacity = capacity;
        self
    }

    pub fn with_center(mut self, lat: f64, lon: f64) -> Self {
        self.center_lat = lat;
        self.center_lon = lon;
        self
    }

    pub fn with_stop_density(mut self, density: StopDensity) -> Self {
        self.stop_density = density;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringParams) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_availability(mut self, availability: AvailabilityConfig) -> Self {
        self.availability = availability;
        self
    }
}
