use crate::config::TrackConfig;
use crate::engine::error::TrackError;
use crate::engine::temporal::TemporalTrack;
use crate::store::Sense;

/// Decide which rotational sense survives. One point per shared timestamp to
/// the larger absolute shear; the cyclonic sense wins ties. A pair whose
/// timestamps do not line up is skipped with a warning, never an error.
pub fn arbitrate(
    cfg: &TrackConfig,
    cyclonic: Option<TemporalTrack>,
    anticyclonic: Option<TemporalTrack>,
) -> Result<TemporalTrack, TrackError> {
    if let Some(sense) = cfg.sense_override {
        log::info!("sense arbitration overridden to {sense}");
        let forced = match sense {
            Sense::Cyclonic => cyclonic,
            Sense::Anticyclonic => anticyclonic,
        };
        return forced.ok_or(TrackError::NoReferenceCluster);
    }

    match (cyclonic, anticyclonic) {
        (Some(cyc), Some(anti)) => Ok(vote(cyc, anti)),
        (Some(cyc), None) => {
            log::info!("only the cyclonic sense produced a track");
            Ok(cyc)
        }
        (None, Some(anti)) => {
            log::info!("only the anticyclonic sense produced a track");
            Ok(anti)
        }
        (None, None) => Err(TrackError::NoReferenceCluster),
    }
}

fn vote(cyc: TemporalTrack, anti: TemporalTrack) -> TemporalTrack {
    let mut cyc_points = 0u32;
    let mut anti_points = 0u32;
    let mut skipped = 0u32;

    let pairs = cyc.clusters.len().min(anti.clusters.len());
    for i in 0..pairs {
        let max = &cyc.clusters[i];
        let min = &anti.clusters[i];
        if max.timestamp != min.timestamp {
            log::warn!(
                "sense arbitration: mismatched timestamps at step {i} ({} vs {}), pair skipped",
                max.timestamp,
                min.timestamp
            );
            skipped += 1;
            continue;
        }
        if max.abs_shear() >= min.abs_shear() {
            cyc_points += 1;
        } else {
            anti_points += 1;
        }
    }

    log::info!(
        "sense arbitration: cyclonic {cyc_points}, anticyclonic {anti_points}, skipped {skipped}"
    );
    if anti_points > cyc_points {
        anti
    } else {
        cyc
    }
}
