//! Spatial operations: great-circle distances and H3-based stop indexing.
//!
//! This module provides:
//!
//! - **haversine_m**: exact great-circle distance between raw coordinates
//! - **Cell-pair distances**: cached cell-center distances used as a
//!   conservative radius prefilter
//! - **StopSpatialIndex**: H3 cell → stop entity mappings for density queries
//!
//! Stops are indexed at resolution 9 (~240m cell size), city-scale.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use bevy_ecs::prelude::{Entity, Resource};
use h3o::{CellIndex, LatLng, Resolution};
use lru::LruCache;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Resolution at which stop locations are indexed.
pub const STOP_RESOLUTION: Resolution = Resolution::Nine;

/// Conservative circumradius of a resolution-9 cell in meters.
/// Used to pad cell-center distances so the prefilter never drops a stop
/// that the exact test would keep.
pub const CELL_RADIUS_M: f64 = 210.0;

/// Approximate center-to-center spacing of adjacent resolution-9 cells.
const CELL_SPACING_M: f64 = 300.0;

/// True when both coordinates are finite and within valid degree ranges.
pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Great-circle distance in meters between two points given in degrees.
///
/// Deterministic, symmetric, zero for identical points. Inputs must already
/// be valid degrees; validation happens at the engine boundary.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let sin_dphi = (dphi * 0.5).sin();
    let sin_dlambda = (dlambda * 0.5).sin();
    let h = sin_dphi * sin_dphi + phi1.cos() * phi2.cos() * sin_dlambda * sin_dlambda;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Resolution-9 cell for a coordinate pair, `None` when out of range.
pub fn cell_for(lat: f64, lon: f64) -> Option<CellIndex> {
    LatLng::new(lat, lon).ok().map(|ll| ll.to_cell(STOP_RESOLUTION))
}

/// Uncached cell-center distance (internal use).
fn distance_m_between_cells_uncached(a: CellIndex, b: CellIndex) -> f64 {
    let a: LatLng = a.into();
    let b: LatLng = b.into();
    haversine_m(a.lat(), a.lng(), b.lat(), b.lng())
}

/// Global cell-pair distance cache (50,000 entries).
fn distance_cache() -> &'static Mutex<LruCache<(CellIndex, CellIndex), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CellIndex, CellIndex), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(50_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Distance in meters between two H3 cell centers, with LRU caching.
///
/// Users cluster into a handful of cells while committed stops stay fixed,
/// so cell pairs repeat heavily across pricing requests.
pub fn distance_m_between_cells(a: CellIndex, b: CellIndex) -> f64 {
    // Symmetric key (smaller cell first) to maximize cache hits
    let key = if a < b { (a, b) } else { (b, a) };

    let mut cache = match distance_cache().lock() {
        Ok(guard) => guard,
        Err(_) => return distance_m_between_cells_uncached(key.0, key.1),
    };

    *cache.get_or_insert(key, || distance_m_between_cells_uncached(key.0, key.1))
}

/// Two-stage radius test: a padded cell-center prefilter, then the exact
/// haversine check. The prefilter never rejects a point the exact test would
/// accept because the padding covers both cell circumradii.
pub fn within_radius_m(
    user_lat: f64,
    user_lon: f64,
    user_cell: Option<CellIndex>,
    stop_lat: f64,
    stop_lon: f64,
    stop_cell: Option<CellIndex>,
    radius_m: f64,
) -> bool {
    if let (Some(uc), Some(sc)) = (user_cell, stop_cell) {
        if distance_m_between_cells(uc, sc) > radius_m + 2.0 * CELL_RADIUS_M {
            return false;
        }
    }
    haversine_m(user_lat, user_lon, stop_lat, stop_lon) <= radius_m
}

/// Number of H3 rings needed to cover a metric radius at [STOP_RESOLUTION].
pub fn rings_for_radius_m(radius_m: f64) -> u32 {
    ((radius_m + 2.0 * CELL_RADIUS_M) / CELL_SPACING_M).ceil() as u32
}

/// Spatial index over committed stops.
///
/// Maintains H3 cell → stop entity mappings so density around a point can be
/// answered without scanning every stop. Updated incrementally as quotes
/// finalize into stops.
#[derive(Debug, Resource, Default)]
pub struct StopSpatialIndex {
    stops_by_cell: HashMap<CellIndex, Vec<Entity>>,
    stop_to_cell: HashMap<Entity, CellIndex>,
}

impl StopSpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stop entity at the given cell.
    pub fn insert_stop(&mut self, entity: Entity, cell: CellIndex) {
        self.stops_by_cell.entry(cell).or_default().push(entity);
        self.stop_to_cell.insert(entity, cell);
    }

    /// Remove a stop entity from the index.
    pub fn remove_stop(&mut self, entity: Entity) {
        if let Some(cell) = self.stop_to_cell.remove(&entity) {
            if let Some(entities) = self.stops_by_cell.get_mut(&cell) {
                entities.retain(|&e| e != entity);
                if entities.is_empty() {
                    self.stops_by_cell.remove(&cell);
                }
            }
        }
    }

    /// All stop entities registered in the given cells.
    pub fn stops_in_cells(&self, cells: &[CellIndex]) -> Vec<Entity> {
        let mut result = Vec::new();
        for cell in cells {
            if let Some(entities) = self.stops_by_cell.get(cell) {
                result.extend(entities.iter().copied());
            }
        }
        result
    }

    /// Stop entities whose cell lies within `radius_m` of `center`, padded by
    /// the cell circumradius; callers refine with the exact distance.
    pub fn stops_near(&self, center: CellIndex, radius_m: f64) -> Vec<Entity> {
        let cells = center.grid_disk::<Vec<_>>(rings_for_radius_m(radius_m));
        self.stops_in_cells(&cells)
    }

    /// Current cell for a stop entity.
    pub fn cell_of(&self, entity: Entity) -> Option<CellIndex> {
        self.stop_to_cell.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.stop_to_cell.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_to_cell.is_empty()
    }
}
