use chrono::{DateTime, Utc};

use crate::geo::GeoPoint;
use crate::store::{EchoTopCluster, ShearCluster, TiltId, TrackCluster};

/// One tilt's outcome inside a vertical profile. "Searched and not found"
/// and "tilt absent from the case data" are distinct outcomes and map to
/// different output sentinels.
#[derive(Debug, Clone)]
pub enum TiltSlot {
    Found(ShearCluster),
    NotFound,
    TiltAbsent,
}

impl TiltSlot {
    pub fn cluster(&self) -> Option<&ShearCluster> {
        match self {
            TiltSlot::Found(c) => Some(c),
            _ => None,
        }
    }
}

/// The vertical stack of shear clusters for one scan time, one slot per
/// configured tilt. Built low-to-high by the vertical associator, then
/// frozen; the slots are not reachable mutably from outside this module's
/// builder surface.
#[derive(Debug, Clone)]
pub struct ShearGroup {
    tilts: Vec<TiltId>,
    slots: Vec<TiltSlot>,
}

impl ShearGroup {
    /// Seed a group with the lowest-tilt cluster; higher slots start
    /// `NotFound` until the vertical associator fills them.
    pub fn new(tilts: Vec<TiltId>, lowest: ShearCluster) -> Self {
        assert!(!tilts.is_empty(), "a shear group needs at least one tilt");
        let mut slots = Vec::with_capacity(tilts.len());
        slots.push(TiltSlot::Found(lowest));
        for _ in 1..tilts.len() {
            slots.push(TiltSlot::NotFound);
        }
        Self { tilts, slots }
    }

    pub(crate) fn set_slot(&mut self, index: usize, slot: TiltSlot) {
        self.slots[index] = slot;
    }

    pub fn tilts(&self) -> &[TiltId] {
        &self.tilts
    }

    pub fn slot(&self, index: usize) -> &TiltSlot {
        &self.slots[index]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The lowest-tilt cluster. Always present; the group exists because the
    /// temporal associator accepted it.
    pub fn lowest(&self) -> &ShearCluster {
        match &self.slots[0] {
            TiltSlot::Found(c) => c,
            _ => unreachable!("slot 0 is seeded at construction"),
        }
    }

    /// The group's canonical location: the lowest tilt's position.
    pub fn canonical_position(&self) -> GeoPoint {
        self.lowest().position()
    }

    /// Mean centroid over every populated tilt.
    pub fn mean_centroid(&self) -> GeoPoint {
        let mut lat = 0.0;
        let mut lon = 0.0;
        let mut n = 0usize;
        for slot in &self.slots {
            if let TiltSlot::Found(c) = slot {
                lat += c.lat_deg;
                lon += c.lon_deg;
                n += 1;
            }
        }
        GeoPoint::new(lat / n as f64, lon / n as f64)
    }

    /// Timestamp inherited from the lowest tilt.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.lowest().timestamp
    }

    /// Highest populated slot at or below `index`, for stacking the next
    /// tilt when the one immediately below came up empty.
    pub fn highest_found_below(&self, index: usize) -> &ShearCluster {
        self.slots[..index]
            .iter()
            .rev()
            .find_map(TiltSlot::cluster)
            .unwrap_or_else(|| self.lowest())
    }
}

/// The engine's per-time-step output record. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct StormGroup {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub shear: ShearGroup,
    pub cell: Option<TrackCluster>,
    pub top: Option<EchoTopCluster>,
}
