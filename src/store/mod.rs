mod cluster;
mod scan;

pub use cluster::{
    is_missing, tilt_id, EchoTopCluster, Motion, Sense, ShearCluster, TiltId, TrackCluster,
    NOT_FOUND, UNAVAILABLE,
};
pub use scan::ScanTime;

#[cfg(test)]
pub use cluster::test_util;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// Every candidate object for one case, ordered by scan time.
///
/// The loader builds it with explicit get-or-insert upserts; the engine only
/// reads it.
#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    scans: Vec<ScanTime>,
    tilts_present: BTreeSet<TiltId>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan bucket for `timestamp`, inserted in time order on first use.
    pub fn scan_mut(&mut self, timestamp: DateTime<Utc>) -> &mut ScanTime {
        let idx = match self.scans.binary_search_by_key(&timestamp, |s| s.timestamp) {
            Ok(i) => i,
            Err(i) => {
                self.scans.insert(i, ScanTime::new(timestamp));
                i
            }
        };
        &mut self.scans[idx]
    }

    pub fn push_shear(&mut self, sense: Sense, cluster: ShearCluster) {
        self.tilts_present.insert(cluster.tilt);
        self.scan_mut(cluster.timestamp).push_shear(sense, cluster);
    }

    pub fn push_cell(&mut self, cell: TrackCluster) {
        self.scan_mut(cell.timestamp).cells.push(cell);
    }

    pub fn push_top(&mut self, top: EchoTopCluster) {
        self.scan_mut(top.timestamp).tops.push(top);
    }

    pub fn scans(&self) -> &[ScanTime] {
        &self.scans
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Whether any shear candidate was detected at this tilt anywhere in the
    /// case, in either sense. Distinguishes "searched and not found" from
    /// "tilt absent from the data".
    pub fn has_tilt(&self, tilt: TiltId) -> bool {
        self.tilts_present.contains(&tilt)
    }

    /// Index of the scan closest in time to `t`.
    pub fn index_closest_to(&self, t: DateTime<Utc>) -> Option<usize> {
        self.scans
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| (s.timestamp - t).num_seconds().abs())
            .map(|(i, _)| i)
    }

    /// Index of the scan whose timestamp equals `t` exactly.
    pub fn index_at(&self, t: DateTime<Utc>) -> Option<usize> {
        self.scans
            .binary_search_by_key(&t, |s| s.timestamp)
            .ok()
    }
}
