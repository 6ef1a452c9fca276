use crate::config::TrackConfig;
use crate::engine::error::TrackError;
use crate::engine::group::{ShearGroup, StormGroup};
use crate::engine::interest::{pick_best, ScoreInput};
use crate::geo;
use crate::store::{is_missing, CaseStore, EchoTopCluster, ShearCluster, TrackCluster};

/// Check that a shear cluster carries all required wind-model fields.
/// A sentinel in any of them aborts the case.
pub fn validate_shear(c: &ShearCluster) -> Result<(), TrackError> {
    let fields = [
        ("wind_u_0_6km", c.wind_u_0_6km),
        ("wind_v_0_6km", c.wind_v_0_6km),
        ("wind_u_10km", c.wind_u_10km),
        ("wind_v_10km", c.wind_v_10km),
    ];
    for (field, value) in fields {
        if is_missing(value) {
            return Err(TrackError::MissingAuxiliaryModelData {
                kind: "shear",
                timestamp: c.timestamp,
                field,
            });
        }
    }
    Ok(())
}

pub fn validate_cell(c: &TrackCluster) -> Result<(), TrackError> {
    let fields = [
        ("shear_u_0_6km", c.shear_u_0_6km),
        ("shear_v_0_6km", c.shear_v_0_6km),
    ];
    for (field, value) in fields {
        if is_missing(value) {
            return Err(TrackError::MissingAuxiliaryModelData {
                kind: "cell",
                timestamp: c.timestamp,
                field,
            });
        }
    }
    Ok(())
}

pub fn validate_top(c: &EchoTopCluster) -> Result<(), TrackError> {
    let fields = [("motion_u_ms", c.motion_u_ms), ("motion_v_ms", c.motion_v_ms)];
    for (field, value) in fields {
        if is_missing(value) {
            return Err(TrackError::MissingAuxiliaryModelData {
                kind: "echo_top",
                timestamp: c.timestamp,
                field,
            });
        }
    }
    Ok(())
}

/// Attach the best-matching storm cell and echo top to every finalized
/// shear group, producing the engine's StormGroup output sequence.
pub fn attach_auxiliary(
    store: &CaseStore,
    cfg: &TrackConfig,
    groups: Vec<ShearGroup>,
) -> Result<Vec<StormGroup>, TrackError> {
    let mut out = Vec::with_capacity(groups.len());

    for (index, group) in groups.into_iter().enumerate() {
        let timestamp = group.timestamp();
        let scan_index = store
            .index_at(timestamp)
            .or_else(|| store.index_closest_to(timestamp));

        let (cell, top) = match scan_index {
            Some(si) => {
                let scan = &store.scans()[si];
                let cell = match_cell(cfg, &group, &scan.cells)?;
                let top = match_top(cfg, &group, cell.as_ref(), &scan.tops)?;
                (cell, top)
            }
            None => (None, None),
        };

        log::debug!(
            "group {index} at {timestamp}: cell {}, echo top {}",
            if cell.is_some() { "matched" } else { "none" },
            if top.is_some() { "matched" } else { "none" },
        );
        out.push(StormGroup {
            index,
            timestamp,
            shear: group,
            cell,
            top,
        });
    }

    Ok(out)
}

/// Best storm-cell match for a group: distance plus direction only, the
/// direction reference being each candidate's own 0-6 km bulk shear bearing.
fn match_cell(
    cfg: &TrackConfig,
    group: &ShearGroup,
    cells: &[TrackCluster],
) -> Result<Option<TrackCluster>, TrackError> {
    let source = group.canonical_position();
    let picked = pick_best(cells, &cfg.cell, cfg.cell.max_dist_km, |c| ScoreInput {
        source,
        candidate: c.position(),
        reference_bearing_deg: Some(geo::vector_bearing_deg(c.shear_u_0_6km, c.shear_v_0_6km)),
        intensity: None,
    });

    match picked {
        Some((_, cell, _, passers)) => {
            validate_cell(cell)?;
            let mut cell = cell.clone();
            cell.nearby_count = passers;
            Ok(Some(cell))
        }
        None => Ok(None),
    }
}

/// Best echo-top match, searched from the accepted cell when one exists.
/// Without a cell there is no bearing reference, so only distance applies.
fn match_top(
    cfg: &TrackConfig,
    group: &ShearGroup,
    cell: Option<&TrackCluster>,
    tops: &[EchoTopCluster],
) -> Result<Option<EchoTopCluster>, TrackError> {
    let (source, bearing) = match cell {
        Some(c) => (
            c.position(),
            Some(geo::vector_bearing_deg(c.shear_u_0_6km, c.shear_v_0_6km)),
        ),
        None => (group.canonical_position(), None),
    };

    let picked = pick_best(tops, &cfg.top, cfg.top.max_dist_km, |t| ScoreInput {
        source,
        candidate: t.position(),
        reference_bearing_deg: bearing,
        intensity: None,
    });

    match picked {
        Some((_, top, _, _)) => {
            validate_top(top)?;
            Ok(Some(top.clone()))
        }
        None => Ok(None),
    }
}
