mod arbiter;
mod auxiliary;
mod error;
mod group;
mod interest;
mod motion;
mod reference;
mod temporal;
mod vertical;

pub use arbiter::arbitrate;
pub use auxiliary::{attach_auxiliary, validate_cell, validate_shear, validate_top};
pub use error::TrackError;
pub use group::{ShearGroup, StormGroup, TiltSlot};
pub use interest::{interest_score, pick_best, ScoreInput};
pub use motion::{estimate, project};
pub use reference::{select_reference, Reference};
pub use temporal::{build_track, TemporalTrack, TrackState};
pub use vertical::build_groups;

use chrono::{DateTime, Utc};

use crate::config::TrackConfig;
use crate::geo::GeoPoint;
use crate::store::{tilt_id, CaseStore, Sense};

/// Run the whole association engine for one case: reference selection per
/// sense, bidirectional tracking, sense arbitration, vertical stacking,
/// auxiliary matching. Returns the ordered StormGroup sequence.
pub fn run_case(
    store: &CaseStore,
    cfg: &TrackConfig,
    report_point: GeoPoint,
    report_time: DateTime<Utc>,
) -> Result<Vec<StormGroup>, TrackError> {
    let Some(&lowest_deg) = cfg.tilts_deg.first() else {
        log::warn!("no tilts configured, nothing to anchor on");
        return Err(TrackError::NoReferenceCluster);
    };
    let lowest = tilt_id(lowest_deg);

    let mut tracks: [Option<TemporalTrack>; 2] = [None, None];
    for (i, sense) in [Sense::Cyclonic, Sense::Anticyclonic].into_iter().enumerate() {
        let Some(reference) = select_reference(store, cfg, sense, report_point, report_time, lowest)
        else {
            log::info!("{sense}: no reference cluster, sense produces no track");
            continue;
        };
        let track = build_track(store, cfg, sense, lowest, reference)?;
        log::info!("{sense}: tracked {} time steps", track.clusters.len());
        tracks[i] = Some(track);
    }
    let [cyclonic, anticyclonic] = tracks;

    let winner = arbitrate(cfg, cyclonic, anticyclonic)?;
    log::info!(
        "winning sense {} with {} time steps",
        winner.sense,
        winner.clusters.len()
    );

    let groups = build_groups(store, cfg, &winner)?;
    attach_auxiliary(store, cfg, groups)
}
