use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Sentinel for a value the engine looked for but did not find.
pub const NOT_FOUND: f64 = -99900.0;
/// Sentinel for a value that is structurally absent from the case data.
pub const UNAVAILABLE: f64 = -99903.0;

/// True for either missing-value sentinel.
pub fn is_missing(v: f64) -> bool {
    v <= -99000.0
}

/// Rotational polarity of a shear cluster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sense {
    /// Positive ("max") rotation.
    Cyclonic,
    /// Negative ("min") rotation.
    Anticyclonic,
}

/// Elevation tilt identifier: tenths of a degree, so 0.5° is `5`.
pub type TiltId = u16;

pub fn tilt_id(tilt_deg: f64) -> TiltId {
    (tilt_deg * 10.0).round() as TiltId
}

/// Derived storm motion: where the cluster is heading and how fast.
///
/// The east/north sums and sample count support the running vector mean used
/// in mean-motion mode; angles are never averaged directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub bearing_deg: f64,
    pub speed_km_s: f64,
    pub sum_east: f64,
    pub sum_north: f64,
    pub samples: u32,
}

/// An azimuthal-shear local maximum at one tilt and scan time.
///
/// Input fields come straight from the detection table. `motion`, the
/// projected positions, and `nearby_count` are derived and set only when the
/// cluster is accepted into a group.
#[derive(Debug, Clone)]
pub struct ShearCluster {
    pub timestamp: DateTime<Utc>,
    pub tilt: TiltId,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub extent_km: f64,
    pub shear_max: f64,
    pub shear_min: f64,
    pub shear_p10: f64,
    pub shear_p90: f64,
    pub spectrum_width: f64,
    pub tds_pixels: f64,
    pub tds_min: f64,
    pub reflectivity: f64,
    /// How many severe reports this cluster was linked to upstream. Only the
    /// reference selector reads it.
    pub report_links: u32,
    pub report_dist_km: f64,
    pub wind_u_0_6km: f64,
    pub wind_v_0_6km: f64,
    pub wind_u_10km: f64,
    pub wind_v_10km: f64,
    pub range_km: f64,
    pub beam_height_km: f64,
    /// Upstream continuity token. A hint only, never authoritative.
    pub token: Option<i64>,
    pub age_s: f64,
    /// Detector-supplied motion components (m/s east/north); the tracker
    /// estimates its own motion and never trusts these.
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,

    pub motion: Option<Motion>,
    pub projected_fwd: Option<GeoPoint>,
    pub projected_back: Option<GeoPoint>,
    /// How many candidates passed gating when this cluster was accepted.
    pub nearby_count: u32,
}

impl ShearCluster {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }

    /// Larger magnitude of the signed max/min shear.
    pub fn abs_shear(&self) -> f64 {
        self.shear_max.abs().max(self.shear_min.abs())
    }
}

/// A storm-cell-scale intensity object.
#[derive(Debug, Clone)]
pub struct TrackCluster {
    pub timestamp: DateTime<Utc>,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub extent_km: f64,
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,
    /// 0–6 km bulk shear vector; its bearing is the directional reference
    /// when matching cells to a shear group.
    pub shear_u_0_6km: f64,
    pub shear_v_0_6km: f64,
    pub vil_avg: f64,
    pub vil_max: f64,
    pub refl_max: f64,
    pub nearby_count: u32,
}

impl TrackCluster {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }
}

/// An echo-top local maximum.
#[derive(Debug, Clone)]
pub struct EchoTopCluster {
    pub timestamp: DateTime<Utc>,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub extent_km: f64,
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,
    pub top_max_km: f64,
    pub top_p90_km: f64,
}

impl EchoTopCluster {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat_deg, self.lon_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_missing() {
        assert!(is_missing(NOT_FOUND));
        assert!(is_missing(UNAVAILABLE));
        assert!(!is_missing(0.0));
        assert!(!is_missing(-45.0));
    }

    #[test]
    fn tilt_id_rounds() {
        assert_eq!(tilt_id(0.5), 5);
        assert_eq!(tilt_id(1.45), 15);
        assert_eq!(tilt_id(19.5), 195);
    }

    #[test]
    fn abs_shear_takes_larger_magnitude() {
        let mut c = test_util::shear(Utc::now(), 5, 35.0, -97.0);
        c.shear_max = 0.004;
        c.shear_min = -0.009;
        assert_eq!(c.abs_shear(), 0.009);
    }
}
