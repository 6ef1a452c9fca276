use chrono::{DateTime, Utc};

use crate::config::TrackConfig;
use crate::engine::interest::{interest_score, ScoreInput};
use crate::geo::GeoPoint;
use crate::store::{CaseStore, Sense, ShearCluster, TiltId};

/// The anchor cluster for one sense: its scan index and an owned copy.
#[derive(Debug, Clone)]
pub struct Reference {
    pub scan_index: usize,
    pub cluster: ShearCluster,
}

/// Find the first anchor for `sense`: among the lowest-tilt clusters linked
/// to at least one severe report, at the scan closest in time to the report,
/// the best distance+intensity scorer against the report point.
///
/// No direction term applies (the storm bearing is unknown this early) and
/// there is no close-range bearing exemption to waive. `None` means this
/// sense produces no track, which is not an error by itself.
pub fn select_reference(
    store: &CaseStore,
    cfg: &TrackConfig,
    sense: Sense,
    report_point: GeoPoint,
    report_time: DateTime<Utc>,
    lowest_tilt: TiltId,
) -> Option<Reference> {
    // Scans that hold at least one report-linked lowest-tilt cluster.
    let linked: Vec<usize> = store
        .scans()
        .iter()
        .enumerate()
        .filter(|(_, scan)| {
            scan.shear(sense, lowest_tilt)
                .iter()
                .any(|c| c.report_links > 0)
        })
        .map(|(i, _)| i)
        .collect();

    let scan_index = linked.into_iter().min_by_key(|&i| {
        (store.scans()[i].timestamp - report_time)
            .num_seconds()
            .abs()
    })?;

    let scan = &store.scans()[scan_index];
    let mut best: Option<(&ShearCluster, f64)> = None;
    for cand in scan.shear(sense, lowest_tilt) {
        if cand.report_links == 0 {
            continue;
        }
        let input = ScoreInput {
            source: report_point,
            candidate: cand.position(),
            reference_bearing_deg: None,
            intensity: Some((cand.shear_max, cand.shear_min)),
        };
        let Some(score) = interest_score(&input, &cfg.shear, cfg.shear.max_dist_km) else {
            continue;
        };
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((cand, score)),
        }
    }

    let (cluster, score) = best?;
    if score < cfg.min_reference_score {
        log::debug!(
            "{sense} reference candidate at {} scored {score:.2}, below minimum {:.2}",
            cluster.timestamp,
            cfg.min_reference_score
        );
        return None;
    }

    log::info!(
        "{sense} reference at {} ({:.4}, {:.4}) score {score:.2}",
        cluster.timestamp,
        cluster.lat_deg,
        cluster.lon_deg
    );
    Some(Reference {
        scan_index,
        cluster: cluster.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::shear;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 22, 0, 0).unwrap()
    }

    fn store_with_linked(lat_offsets: &[(i64, f64, u32)]) -> CaseStore {
        let mut store = CaseStore::new();
        for &(minutes, dlat, links) in lat_offsets {
            let mut c = shear(t0() + Duration::minutes(minutes), 5, 35.0 + dlat, -97.0);
            c.report_links = links;
            store.push_shear(Sense::Cyclonic, c);
        }
        store
    }

    #[test]
    fn unlinked_clusters_never_anchor() {
        let store = store_with_linked(&[(0, 0.0, 0), (5, 0.0, 0)]);
        let cfg = TrackConfig::default();
        let r = select_reference(
            &store,
            &cfg,
            Sense::Cyclonic,
            GeoPoint::new(35.0, -97.0),
            t0(),
            5,
        );
        assert!(r.is_none());
    }

    #[test]
    fn closest_linked_scan_wins() {
        // Linked clusters at t+0 and t+10; the report is at t+9.
        let store = store_with_linked(&[(0, 0.0, 1), (10, 0.02, 2)]);
        let cfg = TrackConfig::default();
        let r = select_reference(
            &store,
            &cfg,
            Sense::Cyclonic,
            GeoPoint::new(35.02, -97.0),
            t0() + Duration::minutes(9),
            5,
        )
        .unwrap();
        assert_eq!(r.scan_index, 1);
        assert_eq!(r.cluster.lat_deg, 35.02);
    }

    #[test]
    fn minimum_score_enforced() {
        let mut cfg = TrackConfig::default();
        cfg.min_reference_score = 1000.0;
        let store = store_with_linked(&[(0, 0.0, 1)]);
        let r = select_reference(
            &store,
            &cfg,
            Sense::Cyclonic,
            GeoPoint::new(35.0, -97.0),
            t0(),
            5,
        );
        assert!(r.is_none());
    }

    #[test]
    fn nearest_cluster_beats_farther_linked_one() {
        let mut store = CaseStore::new();
        let mut near = shear(t0(), 5, 35.01, -97.0);
        near.report_links = 1;
        let mut far = shear(t0(), 5, 35.08, -97.0);
        far.report_links = 3;
        store.push_shear(Sense::Cyclonic, far);
        store.push_shear(Sense::Cyclonic, near);

        let cfg = TrackConfig::default();
        let r = select_reference(
            &store,
            &cfg,
            Sense::Cyclonic,
            GeoPoint::new(35.01, -97.0),
            t0(),
            5,
        )
        .unwrap();
        assert_eq!(r.cluster.lat_deg, 35.01);
    }
}
