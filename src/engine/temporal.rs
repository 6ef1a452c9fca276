use crate::config::TrackConfig;
use crate::engine::auxiliary::validate_shear;
use crate::engine::error::TrackError;
use crate::engine::interest::{interest_score, pick_best, ScoreInput};
use crate::engine::motion;
use crate::engine::reference::Reference;
use crate::store::{CaseStore, Sense, ShearCluster, TiltId};

/// Phase of the bidirectional tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrackState {
    SeekReference,
    TrackBackward,
    TrackForward,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

/// One sense's chronological cluster sequence.
#[derive(Debug, Clone)]
pub struct TemporalTrack {
    pub sense: Sense,
    pub clusters: Vec<ShearCluster>,
}

/// Track one sense backward then forward from its reference cluster.
///
/// Running out of acceptable candidates in either direction just ends that
/// direction; only missing model data aborts the case.
pub fn build_track(
    store: &CaseStore,
    cfg: &TrackConfig,
    sense: Sense,
    lowest_tilt: TiltId,
    reference: Reference,
) -> Result<TemporalTrack, TrackError> {
    let mut assoc = Associator {
        store,
        cfg,
        sense,
        lowest_tilt,
        state: TrackState::SeekReference,
        clusters: Vec::new(),
        ref_index: reference.scan_index,
    };
    assoc.run(reference.cluster).map_err(|e| {
        assoc.state = TrackState::Aborted;
        e
    })?;
    Ok(TemporalTrack {
        sense,
        clusters: assoc.clusters,
    })
}

struct Associator<'a> {
    store: &'a CaseStore,
    cfg: &'a TrackConfig,
    sense: Sense,
    lowest_tilt: TiltId,
    state: TrackState,
    clusters: Vec<ShearCluster>,
    ref_index: usize,
}

impl Associator<'_> {
    fn run(&mut self, reference: ShearCluster) -> Result<(), TrackError> {
        validate_shear(&reference)?;
        self.clusters.push(reference);

        self.transition(TrackState::TrackBackward);
        self.walk(Direction::Backward)?;

        // The reference was appended first; move it to the end so forward
        // stepping extends from it.
        let reference = self.clusters.remove(0);
        self.clusters.push(reference);

        self.transition(TrackState::TrackForward);
        self.walk(Direction::Forward)?;

        self.transition(TrackState::Done);
        self.finish();
        Ok(())
    }

    fn transition(&mut self, next: TrackState) {
        log::debug!("{} tracker: {} -> {next}", self.sense, self.state);
        self.state = next;
    }

    fn walk(&mut self, dir: Direction) -> Result<(), TrackError> {
        let mut idx = self.ref_index;
        loop {
            let next = match dir {
                Direction::Backward => match idx.checked_sub(1) {
                    Some(i) => i,
                    None => return Ok(()),
                },
                Direction::Forward => {
                    if idx + 1 >= self.store.len() {
                        return Ok(());
                    }
                    idx + 1
                }
            };

            if !self.step(dir, next)? {
                // No passer at this scan: stop, the remaining times are
                // simply excluded.
                log::debug!(
                    "{} tracker: no candidate at scan {next}, {} phase ends",
                    self.sense,
                    self.state
                );
                return Ok(());
            }
            idx = next;
        }
    }

    /// Try to extend the track into scan `next`. Ok(false) means nothing
    /// passed gating there.
    fn step(&mut self, dir: Direction, next: usize) -> Result<bool, TrackError> {
        let scan = &self.store.scans()[next];
        let last_idx = self.clusters.len() - 1;
        let last = self.clusters[last_idx].clone();

        let elapsed_s = (scan.timestamp - last.timestamp).num_seconds() as f64;

        // With a motion estimate, score against the dead-reckoned position
        // and expect travel along (or against) the stored bearing.
        let (source, bearing) = match &last.motion {
            Some(m) => {
                let projected =
                    motion::project(last.position(), m, elapsed_s, self.cfg.project_fraction);
                let expected = match dir {
                    Direction::Forward => m.bearing_deg,
                    Direction::Backward => (m.bearing_deg + 180.0).rem_euclid(360.0),
                };
                match dir {
                    Direction::Forward => self.clusters[last_idx].projected_fwd = Some(projected),
                    Direction::Backward => self.clusters[last_idx].projected_back = Some(projected),
                }
                (projected, Some(expected))
            }
            None => (last.position(), None),
        };

        let params = &self.cfg.shear;
        let candidates = scan.shear(self.sense, self.lowest_tilt);
        let make_input = |c: &ShearCluster| ScoreInput {
            source,
            candidate: c.position(),
            reference_bearing_deg: bearing,
            intensity: Some((last.abs_shear(), c.abs_shear())),
        };

        let Some((best_idx, _, _, passers)) =
            pick_best(candidates, params, params.max_dist_km, make_input)
        else {
            return Ok(false);
        };

        // The upstream continuity token is tried first, but only kept when
        // the association itself passes gating.
        let token_idx = last.token.and_then(|t| {
            candidates.iter().position(|c| c.token == Some(t)).filter(|&i| {
                interest_score(&make_input(&candidates[i]), params, params.max_dist_km)
                    .is_some_and(|s| s >= params.min_score)
            })
        });

        let accepted_idx = token_idx.unwrap_or(best_idx);
        let mut accepted = candidates[accepted_idx].clone();
        validate_shear(&accepted)?;
        accepted.nearby_count = passers;

        // Motion is estimated older -> newer so the bearing always points
        // along the storm's travel, and stored on the newer of the pair; the
        // older end inherits it for the next step's projection.
        let (older, newer) = match dir {
            Direction::Backward => (accepted.position(), last.position()),
            Direction::Forward => (last.position(), accepted.position()),
        };
        let m = motion::estimate(
            last.motion.as_ref(),
            older,
            newer,
            elapsed_s.abs(),
            self.cfg.mean_motion,
        );
        accepted.motion = Some(m);
        self.clusters[last_idx].motion = Some(m);

        log::debug!(
            "{} tracker accepted cluster at {} ({} gated candidates)",
            self.sense,
            accepted.timestamp,
            passers
        );
        self.clusters.push(accepted);
        Ok(true)
    }

    /// Chronological order plus the explicit trailing projection later
    /// components rely on.
    fn finish(&mut self) {
        self.clusters.sort_by_key(|c| c.timestamp);

        let n = self.clusters.len();
        let elapsed_s = if n >= 2 {
            (self.clusters[n - 1].timestamp - self.clusters[n - 2].timestamp).num_seconds() as f64
        } else {
            self.neighbor_spacing_s()
        };

        let last = &mut self.clusters[n - 1];
        if let Some(m) = last.motion {
            last.projected_fwd = Some(motion::project(
                last.position(),
                &m,
                elapsed_s,
                self.cfg.project_fraction,
            ));
        }
    }

    /// Scan spacing around the reference, for a single-cluster track.
    fn neighbor_spacing_s(&self) -> f64 {
        let scans = self.store.scans();
        let i = self.ref_index;
        if i + 1 < scans.len() {
            (scans[i + 1].timestamp - scans[i].timestamp).num_seconds() as f64
        } else if i > 0 {
            (scans[i].timestamp - scans[i - 1].timestamp).num_seconds() as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo;
    use crate::store::test_util::shear;
    use crate::store::NOT_FOUND;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 22, 0, 0).unwrap()
    }

    /// One candidate per scan, moving northeast at a steady clip well inside
    /// the gate.
    fn steady_store(n: i64) -> CaseStore {
        let mut store = CaseStore::new();
        let origin = geo::GeoPoint::new(35.0, -97.0);
        for i in 0..n {
            let p = geo::destination(origin, 45.0, 3.0 * i as f64);
            let mut c = shear(t0() + Duration::minutes(5 * i), 5, p.lat_deg, p.lon_deg);
            if i == 0 {
                c.report_links = 1;
            }
            store.push_shear(Sense::Cyclonic, c);
        }
        store
    }

    fn reference_from(store: &CaseStore, scan_index: usize) -> Reference {
        Reference {
            scan_index,
            cluster: store.scans()[scan_index].shear(Sense::Cyclonic, 5)[0].clone(),
        }
    }

    #[test]
    fn steady_chain_links_every_scan() {
        let store = steady_store(5);
        let cfg = TrackConfig::default();
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 0),
        )
        .unwrap();
        assert_eq!(track.clusters.len(), 5);
        // chronological order
        let times: Vec<_> = track.clusters.iter().map(|c| c.timestamp).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[test]
    fn mid_case_reference_tracks_both_directions() {
        let store = steady_store(5);
        let cfg = TrackConfig::default();
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 2),
        )
        .unwrap();
        assert_eq!(track.clusters.len(), 5);
        assert_eq!(track.clusters[0].timestamp, t0());
        assert_eq!(
            track.clusters[4].timestamp,
            t0() + Duration::minutes(20)
        );
    }

    #[test]
    fn forward_tracking_stops_at_gating_distance() {
        // Reference at (35.00, -97.00); a qualifying candidate 2 km away at
        // t+5; a candidate 50 km away at t+10 with a 15 km gate.
        let mut store = CaseStore::new();
        let origin = geo::GeoPoint::new(35.0, -97.0);
        let mut r = shear(t0(), 5, 35.0, -97.0);
        r.report_links = 1;
        store.push_shear(Sense::Cyclonic, r);

        let near = geo::destination(origin, 45.0, 2.0);
        store.push_shear(
            Sense::Cyclonic,
            shear(t0() + Duration::minutes(5), 5, near.lat_deg, near.lon_deg),
        );

        let far = geo::destination(origin, 45.0, 50.0);
        store.push_shear(
            Sense::Cyclonic,
            shear(t0() + Duration::minutes(10), 5, far.lat_deg, far.lon_deg),
        );

        let cfg = TrackConfig::default();
        assert_eq!(cfg.shear.max_dist_km, 15.0);
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 0),
        )
        .unwrap();
        assert_eq!(track.clusters.len(), 2);
        assert_eq!(
            track.clusters.last().unwrap().timestamp,
            t0() + Duration::minutes(5)
        );
    }

    #[test]
    fn token_match_beats_better_scorer() {
        let mut store = CaseStore::new();
        let mut r = shear(t0(), 5, 35.0, -97.0);
        r.token = Some(42);
        store.push_shear(Sense::Cyclonic, r.clone());

        // Closer candidate without the token, farther one with it; both gate.
        let t1 = t0() + Duration::minutes(5);
        store.push_shear(Sense::Cyclonic, shear(t1, 5, 35.005, -97.0));
        let mut tokened = shear(t1, 5, 35.06, -97.0);
        tokened.token = Some(42);
        store.push_shear(Sense::Cyclonic, tokened);

        let cfg = TrackConfig::default();
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            Reference {
                scan_index: 0,
                cluster: r,
            },
        )
        .unwrap();
        assert_eq!(track.clusters.len(), 2);
        assert_eq!(track.clusters[1].token, Some(42));
        assert_eq!(track.clusters[1].lat_deg, 35.06);
    }

    #[test]
    fn missing_model_data_aborts_case() {
        let mut store = CaseStore::new();
        let mut r = shear(t0(), 5, 35.0, -97.0);
        r.report_links = 1;
        store.push_shear(Sense::Cyclonic, r);

        let mut bad = shear(t0() + Duration::minutes(5), 5, 35.01, -97.0);
        bad.wind_u_0_6km = NOT_FOUND;
        store.push_shear(Sense::Cyclonic, bad);

        let cfg = TrackConfig::default();
        let err = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TrackError::MissingAuxiliaryModelData { kind: "shear", .. }
        ));
    }

    #[test]
    fn final_cluster_gets_forward_projection() {
        let store = steady_store(3);
        let cfg = TrackConfig::default();
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 0),
        )
        .unwrap();
        let last = track.clusters.last().unwrap();
        let projected = last.projected_fwd.expect("trailing projection");
        // 3 km legs every 5 minutes: the projection extends one more leg.
        let d = geo::distance_km(last.position(), projected);
        assert!((d - 3.0).abs() < 0.3, "got {d}");
    }

    #[test]
    fn motion_accumulates_along_track() {
        let store = steady_store(4);
        let cfg = TrackConfig::default();
        let track = build_track(
            &store,
            &cfg,
            Sense::Cyclonic,
            5,
            reference_from(&store, 0),
        )
        .unwrap();
        let last = track.clusters.last().unwrap();
        let m = last.motion.expect("motion on tracked cluster");
        assert!((m.bearing_deg - 45.0).abs() < 1.0);
        // 3 km per 300 s
        assert!((m.speed_km_s - 0.01).abs() < 1e-4);
        assert_eq!(m.samples, 3);
    }
}
