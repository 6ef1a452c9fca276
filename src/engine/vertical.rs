use crate::config::TrackConfig;
use crate::engine::auxiliary::validate_shear;
use crate::engine::error::TrackError;
use crate::engine::group::{ShearGroup, TiltSlot};
use crate::engine::interest::{pick_best, ScoreInput};
use crate::engine::motion;
use crate::engine::temporal::TemporalTrack;
use crate::store::{tilt_id, CaseStore, ShearCluster};

/// Stack per-tilt clusters onto every time step of the winning track,
/// building one vertical profile per step.
///
/// Each slot above the anchor is matched against the cluster accepted at the
/// tilt below it, inheriting that cluster's motion and using the tighter
/// tilt-level gate. An empty search leaves `NotFound` when the tilt exists
/// anywhere in the case data, `TiltAbsent` when it does not.
pub fn build_groups(
    store: &CaseStore,
    cfg: &TrackConfig,
    track: &TemporalTrack,
) -> Result<Vec<ShearGroup>, TrackError> {
    let tilts: Vec<_> = cfg.tilts_deg.iter().map(|&t| tilt_id(t)).collect();
    let mut groups = Vec::with_capacity(track.clusters.len());

    for anchor in &track.clusters {
        let mut group = ShearGroup::new(tilts.clone(), anchor.clone());
        let scan_index = store
            .index_at(anchor.timestamp)
            .or_else(|| store.index_closest_to(anchor.timestamp));
        let Some(scan_index) = scan_index else {
            groups.push(group);
            continue;
        };
        let scan = &store.scans()[scan_index];

        for (slot_index, &tilt) in tilts.iter().enumerate().skip(1) {
            let below = group.highest_found_below(slot_index).clone();
            let candidates = scan.shear(track.sense, tilt);

            let picked = pick_best(candidates, &cfg.shear, cfg.max_dist_tilt_km, |c| {
                score_input(cfg, &below, c)
            });

            let slot = match picked {
                Some((_, cluster, _, passers)) => {
                    validate_shear(cluster)?;
                    let mut cluster = cluster.clone();
                    cluster.nearby_count = passers;
                    // The stack shares the track's motion.
                    cluster.motion = below.motion;
                    TiltSlot::Found(cluster)
                }
                None if store.has_tilt(tilt) => TiltSlot::NotFound,
                None => TiltSlot::TiltAbsent,
            };
            group.set_slot(slot_index, slot);
        }

        groups.push(group);
    }

    Ok(groups)
}

fn score_input(cfg: &TrackConfig, below: &ShearCluster, candidate: &ShearCluster) -> ScoreInput {
    // Tilt rows can carry their own times; projecting over that offset
    // degenerates to the raw position when the volume shares one timestamp.
    let (source, bearing) = match &below.motion {
        Some(m) => {
            let elapsed_s = (candidate.timestamp - below.timestamp).num_seconds() as f64;
            (
                motion::project(below.position(), m, elapsed_s, cfg.project_fraction),
                Some(m.bearing_deg),
            )
        }
        None => (below.position(), None),
    };
    ScoreInput {
        source,
        candidate: candidate.position(),
        reference_bearing_deg: bearing,
        intensity: Some((below.abs_shear(), candidate.abs_shear())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::shear;
    use crate::store::Sense;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 22, 0, 0).unwrap()
    }

    fn cfg() -> TrackConfig {
        TrackConfig {
            tilts_deg: vec![0.5, 0.9, 1.3],
            ..TrackConfig::default()
        }
    }

    fn one_step_track(store: &CaseStore) -> TemporalTrack {
        TemporalTrack {
            sense: Sense::Cyclonic,
            clusters: vec![store.scans()[0].shear(Sense::Cyclonic, 5)[0].clone()],
        }
    }

    #[test]
    fn stacks_nearby_tilts() {
        let mut store = CaseStore::new();
        store.push_shear(Sense::Cyclonic, shear(t0(), 5, 35.0, -97.0));
        store.push_shear(Sense::Cyclonic, shear(t0(), 9, 35.01, -97.0));
        store.push_shear(Sense::Cyclonic, shear(t0(), 13, 35.02, -97.0));

        let track = one_step_track(&store);
        let groups = build_groups(&store, &cfg(), &track).unwrap();
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.slot(1).cluster().unwrap().tilt, 9);
        assert_eq!(g.slot(2).cluster().unwrap().tilt, 13);
    }

    #[test]
    fn tilt_gate_is_tighter_than_temporal_gate() {
        let mut store = CaseStore::new();
        store.push_shear(Sense::Cyclonic, shear(t0(), 5, 35.0, -97.0));
        // ~11 km away: inside the 15 km temporal gate, outside the 7.5 km
        // tilt gate.
        store.push_shear(Sense::Cyclonic, shear(t0(), 9, 35.1, -97.0));

        let track = one_step_track(&store);
        let groups = build_groups(&store, &cfg(), &track).unwrap();
        assert!(matches!(groups[0].slot(1), TiltSlot::NotFound));
    }

    #[test]
    fn absent_tilt_marked_distinctly() {
        let mut store = CaseStore::new();
        store.push_shear(Sense::Cyclonic, shear(t0(), 5, 35.0, -97.0));
        // tilt 9 exists in the case (different sense still counts as present)
        store.push_shear(Sense::Anticyclonic, shear(t0(), 9, 35.5, -97.5));
        // tilt 13 appears nowhere

        let track = one_step_track(&store);
        let groups = build_groups(&store, &cfg(), &track).unwrap();
        assert!(matches!(groups[0].slot(1), TiltSlot::NotFound));
        assert!(matches!(groups[0].slot(2), TiltSlot::TiltAbsent));
    }

    #[test]
    fn gap_below_falls_back_to_lower_slot() {
        let mut store = CaseStore::new();
        store.push_shear(Sense::Cyclonic, shear(t0(), 5, 35.0, -97.0));
        // nothing at tilt 9; tilt 13 close to the anchor
        store.push_shear(Sense::Cyclonic, shear(t0(), 9, 36.5, -97.0));
        store.push_shear(Sense::Cyclonic, shear(t0(), 13, 35.01, -97.0));

        let track = one_step_track(&store);
        let groups = build_groups(&store, &cfg(), &track).unwrap();
        assert!(matches!(groups[0].slot(1), TiltSlot::NotFound));
        assert_eq!(groups[0].slot(2).cluster().unwrap().tilt, 13);
    }

    #[test]
    fn stacked_cluster_inherits_track_motion() {
        let mut store = CaseStore::new();
        let mut anchor = shear(t0(), 5, 35.0, -97.0);
        anchor.motion = Some(crate::store::Motion {
            bearing_deg: 45.0,
            speed_km_s: 0.01,
            sum_east: 0.00707,
            sum_north: 0.00707,
            samples: 1,
        });
        store.push_shear(Sense::Cyclonic, anchor.clone());
        store.push_shear(Sense::Cyclonic, shear(t0(), 9, 35.01, -97.0));

        let track = TemporalTrack {
            sense: Sense::Cyclonic,
            clusters: vec![anchor],
        };
        let groups = build_groups(&store, &cfg(), &track).unwrap();
        let stacked = groups[0].slot(1).cluster().unwrap();
        let m = stacked.motion.expect("inherited motion");
        assert!((m.bearing_deg - 45.0).abs() < 1e-9);
    }
}
