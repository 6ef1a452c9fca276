use crate::config::MatchParams;
use crate::geo::{self, GeoPoint};

/// One association attempt: where the source is (already projected if a
/// motion estimate exists), which bearing it expects, and the intensity pair
/// when the step compares shear magnitudes.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput {
    pub source: GeoPoint,
    pub candidate: GeoPoint,
    /// Expected bearing of travel; `None` disables the direction term and
    /// its gate (reference selection, echo tops without a cell).
    pub reference_bearing_deg: Option<f64>,
    /// Shear magnitudes of source and candidate; `None` omits the intensity
    /// term (track and echo-top matching).
    pub intensity: Option<(f64, f64)>,
}

/// Interest score for one candidate, or `None` when a gate rejects it.
///
/// `gate_km` is the applicable maximum distance: `params.max_dist_km` for
/// same-tilt steps, the tighter tilt-level gate for vertical stacking. It is
/// used both as the rejection bound and in the distance-term denominator.
pub fn interest_score(input: &ScoreInput, params: &MatchParams, gate_km: f64) -> Option<f64> {
    let dist = geo::distance_km(input.source, input.candidate);
    if dist > gate_km {
        return None;
    }
    let mut score = (gate_km - dist) / gate_km * params.dist_weight;

    if let Some(reference) = input.reference_bearing_deg {
        let bearing = geo::bearing_deg(input.source, input.candidate);
        let deviation = geo::bearing_difference_deg(bearing, reference);
        // A close-range candidate is exempt from the bearing gate.
        if deviation > params.max_bearing_dev_deg
            && dist > gate_km * params.vector_distance_factor
        {
            return None;
        }
        score += (180.0 - deviation) / 180.0 * params.vector_weight;
    }

    if let Some((a, b)) = input.intensity {
        let (lo, hi) = if a.abs() <= b.abs() {
            (a.abs(), b.abs())
        } else {
            (b.abs(), a.abs())
        };
        if hi > 0.0 {
            score += lo / hi * params.intensity_weight;
        }
    }

    Some(score)
}

/// Best passer among `candidates`, with how many passed gating in total.
///
/// Ties go to the first-encountered candidate: the running best is only
/// replaced on a strictly greater score.
pub fn pick_best<'a, T, F>(
    candidates: &'a [T],
    params: &MatchParams,
    gate_km: f64,
    mut input_for: F,
) -> Option<(usize, &'a T, f64, u32)>
where
    F: FnMut(&T) -> ScoreInput,
{
    let mut best: Option<(usize, &T, f64)> = None;
    let mut passers = 0u32;

    for (i, cand) in candidates.iter().enumerate() {
        let Some(score) = interest_score(&input_for(cand), params, gate_km) else {
            continue;
        };
        if score < params.min_score {
            continue;
        }
        passers += 1;
        match best {
            Some((_, _, s)) if score <= s => {}
            _ => best = Some((i, cand, score)),
        }
    }

    best.map(|(i, c, s)| (i, c, s, passers))
}
