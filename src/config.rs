use serde::{Deserialize, Serialize};

use crate::store::Sense;

/// Gating and weighting parameters for one matching step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Reject candidates farther than this (km).
    pub max_dist_km: f64,
    /// Reject when bearing deviation exceeds this (degrees) outside close range.
    pub max_bearing_dev_deg: f64,
    /// Fraction of max_dist_km inside which the bearing test is waived.
    pub vector_distance_factor: f64,
    pub dist_weight: f64,
    pub vector_weight: f64,
    pub intensity_weight: f64,
    /// Minimum interest score an accepted association must reach.
    pub min_score: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            max_dist_km: 15.0,
            max_bearing_dev_deg: 45.0,
            vector_distance_factor: 0.33,
            dist_weight: 30.0,
            vector_weight: 20.0,
            intensity_weight: 10.0,
            min_score: 5.0,
        }
    }
}

/// Every recognized tuning option of the tracking engine. One instance is
/// passed into every component; nothing reads configuration from anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Elevation tilts in increasing order (degrees). The first entry is the
    /// anchor tilt for temporal tracking.
    pub tilts_deg: Vec<f64>,
    /// Force a rotational sense instead of arbitrating.
    pub sense_override: Option<Sense>,
    /// Running vector-mean motion instead of latest-pair motion.
    pub mean_motion: bool,
    /// Scale applied to dead-reckoned projection distances.
    pub project_fraction: f64,
    /// Minimum score for the reference cluster against the report point.
    pub min_reference_score: f64,
    /// Gating distance for tilt-to-tilt (vertical) matching, replacing
    /// shear.max_dist_km at that step (km).
    pub max_dist_tilt_km: f64,
    pub shear: MatchParams,
    pub cell: MatchParams,
    pub top: MatchParams,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            tilts_deg: vec![0.5, 0.9, 1.3, 1.8, 2.4],
            sense_override: None,
            mean_motion: true,
            project_fraction: 1.0,
            min_reference_score: 10.0,
            max_dist_tilt_km: 7.5,
            shear: MatchParams::default(),
            cell: MatchParams {
                max_dist_km: 20.0,
                max_bearing_dev_deg: 60.0,
                intensity_weight: 0.0,
                ..MatchParams::default()
            },
            top: MatchParams {
                max_dist_km: 20.0,
                max_bearing_dev_deg: 60.0,
                intensity_weight: 0.0,
                ..MatchParams::default()
            },
        }
    }
}

impl TrackConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = TrackConfig::default();
        assert!(cfg.max_dist_tilt_km < cfg.shear.max_dist_km);
        assert!(!cfg.tilts_deg.is_empty());
        assert!(cfg.tilts_deg.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn partial_yaml_overrides() {
        let cfg = TrackConfig::from_yaml("mean_motion: false\nshear:\n  max_dist_km: 25.0\n")
            .unwrap();
        assert!(!cfg.mean_motion);
        assert_eq!(cfg.shear.max_dist_km, 25.0);
        // untouched fields keep their defaults
        assert_eq!(cfg.shear.dist_weight, 30.0);
        assert!(cfg.sense_override.is_none());
    }

    #[test]
    fn sense_override_parses() {
        let cfg = TrackConfig::from_yaml("sense_override: anticyclonic\n").unwrap();
        assert_eq!(cfg.sense_override, Some(Sense::Anticyclonic));
    }
}
