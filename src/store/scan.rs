use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::cluster::{EchoTopCluster, Sense, ShearCluster, TiltId, TrackCluster};

/// All candidate objects detected at one scan instant, bucketed by kind.
/// Filled by the loader, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ScanTime {
    pub timestamp: DateTime<Utc>,
    cyclonic: BTreeMap<TiltId, Vec<ShearCluster>>,
    anticyclonic: BTreeMap<TiltId, Vec<ShearCluster>>,
    pub cells: Vec<TrackCluster>,
    pub tops: Vec<EchoTopCluster>,
}

impl ScanTime {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            cyclonic: BTreeMap::new(),
            anticyclonic: BTreeMap::new(),
            cells: Vec::new(),
            tops: Vec::new(),
        }
    }

    fn shear_map(&self, sense: Sense) -> &BTreeMap<TiltId, Vec<ShearCluster>> {
        match sense {
            Sense::Cyclonic => &self.cyclonic,
            Sense::Anticyclonic => &self.anticyclonic,
        }
    }

    /// Append a shear candidate, creating the tilt bucket on first use.
    /// Insertion order within a bucket is preserved; earlier rows win ties
    /// downstream.
    pub fn push_shear(&mut self, sense: Sense, cluster: ShearCluster) {
        let map = match sense {
            Sense::Cyclonic => &mut self.cyclonic,
            Sense::Anticyclonic => &mut self.anticyclonic,
        };
        map.entry(cluster.tilt).or_default().push(cluster);
    }

    pub fn shear(&self, sense: Sense, tilt: TiltId) -> &[ShearCluster] {
        self.shear_map(sense)
            .get(&tilt)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tilts(&self, sense: Sense) -> impl Iterator<Item = TiltId> + '_ {
        self.shear_map(sense).keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::cluster::test_util::shear;
    use chrono::TimeZone;

    #[test]
    fn buckets_by_sense_and_tilt() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 20, 22, 0, 0).unwrap();
        let mut scan = ScanTime::new(ts);
        scan.push_shear(Sense::Cyclonic, shear(ts, 5, 35.0, -97.0));
        scan.push_shear(Sense::Cyclonic, shear(ts, 5, 35.1, -97.1));
        scan.push_shear(Sense::Anticyclonic, shear(ts, 9, 35.2, -97.2));

        assert_eq!(scan.shear(Sense::Cyclonic, 5).len(), 2);
        assert_eq!(scan.shear(Sense::Cyclonic, 9).len(), 0);
        assert_eq!(scan.shear(Sense::Anticyclonic, 9).len(), 1);
        assert_eq!(scan.tilts(Sense::Cyclonic).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn insertion_order_preserved() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 20, 22, 0, 0).unwrap();
        let mut scan = ScanTime::new(ts);
        scan.push_shear(Sense::Cyclonic, shear(ts, 5, 35.0, -97.0));
        scan.push_shear(Sense::Cyclonic, shear(ts, 5, 36.0, -96.0));
        let rows = scan.shear(Sense::Cyclonic, 5);
        assert_eq!(rows[0].lat_deg, 35.0);
        assert_eq!(rows[1].lat_deg, 36.0);
    }
}
