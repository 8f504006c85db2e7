#![allow(dead_code)]

use bevy_ecs::prelude::World;
use chrono::{DateTime, Utc};

use delivery_core::availability::AvailabilityConfig;
use delivery_core::params::ScoringParams;
use delivery_core::scenario::{build_world, ScenarioParams, StopDensity};

/// Builder configuration for reproducible seeded test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub stop_density: StopDensity,
    pub slot_capacity: u32,
    pub scoring: ScoringParams,
    pub availability: AvailabilityConfig,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            stop_density: StopDensity::Medium,
            slot_capacity: 10,
            scoring: ScoringParams::default(),
            availability: AvailabilityConfig::always(),
        }
    }
}

/// Helper that builds a fully seeded world for integration tests.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_stop_density(mut self, density: StopDensity) -> Self {
        self.config.stop_density = density;
        self
    }

    pub fn with_slot_capacity(mut self, capacity: u32) -> Self {
        self.config.slot_capacity = capacity;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringParams) -> Self {
        self.config.scoring = scoring;
        self
    }

    pub fn with_availability(mut self, availability: AvailabilityConfig) -> Self {
        self.config.availability = availability;
        self
    }

    pub fn scenario_params(&self) -> ScenarioParams {
        ScenarioParams::default()
            .with_seed(self.config.seed)
            .with_stop_density(self.config.stop_density)
            .with_slot_capacity(self.config.slot_capacity)
            .with_scoring(self.config.scoring.clone())
            .with_availability(self.config.availability.clone())
    }

    /// Build the seeded world as of `origin`.
    pub fn build(self, origin: DateTime<Utc>) -> World {
        build_world(&self.scenario_params(), origin)
    }
}
