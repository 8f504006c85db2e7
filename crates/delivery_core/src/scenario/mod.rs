//! Scenario setup: seeded worlds with a rolling slot horizon and synthetic
//! stop clusters for exercising the batching discount.

mod build;
mod params;

pub use build::{build_world, seed_slots, seed_stops_around};
pub use params::{ScenarioParams, StopDensity};
