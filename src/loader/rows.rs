use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::LoadError;
use crate::store::{tilt_id, EchoTopCluster, Sense, ShearCluster, TrackCluster};

/// One detection-table row for a shear cluster, as written by the upstream
/// clustering toolkit.
#[derive(Debug, Deserialize)]
pub struct ShearRow {
    pub time: DateTime<Utc>,
    pub tilt_deg: f64,
    pub sense: String,
    pub lat: f64,
    pub lon: f64,
    pub extent_km: f64,
    pub shear_max: f64,
    pub shear_min: f64,
    pub shear_p10: f64,
    pub shear_p90: f64,
    pub spectrum_width: f64,
    pub tds_pixels: f64,
    pub tds_min: f64,
    pub refl: f64,
    pub report_links: u32,
    pub report_dist_km: f64,
    pub wind_u_0_6km: f64,
    pub wind_v_0_6km: f64,
    pub wind_u_10km: f64,
    pub wind_v_10km: f64,
    pub range_km: f64,
    pub beam_height_km: f64,
    pub token: Option<i64>,
    pub age_s: f64,
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,
}

impl ShearRow {
    pub fn into_cluster(self) -> Result<(Sense, ShearCluster), LoadError> {
        let sense = parse_sense(&self.sense)?;
        let cluster = ShearCluster {
            timestamp: self.time,
            tilt: tilt_id(self.tilt_deg),
            lat_deg: self.lat,
            lon_deg: self.lon,
            extent_km: self.extent_km,
            shear_max: self.shear_max,
            shear_min: self.shear_min,
            shear_p10: self.shear_p10,
            shear_p90: self.shear_p90,
            spectrum_width: self.spectrum_width,
            tds_pixels: self.tds_pixels,
            tds_min: self.tds_min,
            reflectivity: self.refl,
            report_links: self.report_links,
            report_dist_km: self.report_dist_km,
            wind_u_0_6km: self.wind_u_0_6km,
            wind_v_0_6km: self.wind_v_0_6km,
            wind_u_10km: self.wind_u_10km,
            wind_v_10km: self.wind_v_10km,
            range_km: self.range_km,
            beam_height_km: self.beam_height_km,
            token: self.token,
            age_s: self.age_s,
            motion_u_ms: self.motion_u_ms,
            motion_v_ms: self.motion_v_ms,
            motion: None,
            projected_fwd: None,
            projected_back: None,
            nearby_count: 0,
        };
        Ok((sense, cluster))
    }
}

/// Storm-cell table row.
#[derive(Debug, Deserialize)]
pub struct CellRow {
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub extent_km: f64,
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,
    pub shear_u_0_6km: f64,
    pub shear_v_0_6km: f64,
    pub vil_avg: f64,
    pub vil_max: f64,
    pub refl_max: f64,
}

impl CellRow {
    pub fn into_cluster(self) -> TrackCluster {
        TrackCluster {
            timestamp: self.time,
            lat_deg: self.lat,
            lon_deg: self.lon,
            extent_km: self.extent_km,
            motion_u_ms: self.motion_u_ms,
            motion_v_ms: self.motion_v_ms,
            shear_u_0_6km: self.shear_u_0_6km,
            shear_v_0_6km: self.shear_v_0_6km,
            vil_avg: self.vil_avg,
            vil_max: self.vil_max,
            refl_max: self.refl_max,
            nearby_count: 0,
        }
    }
}

/// Echo-top table row.
#[derive(Debug, Deserialize)]
pub struct TopRow {
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub extent_km: f64,
    pub motion_u_ms: f64,
    pub motion_v_ms: f64,
    pub top_max_km: f64,
    pub top_p90_km: f64,
}

impl TopRow {
    pub fn into_cluster(self) -> EchoTopCluster {
        EchoTopCluster {
            timestamp: self.time,
            lat_deg: self.lat,
            lon_deg: self.lon,
            extent_km: self.extent_km,
            motion_u_ms: self.motion_u_ms,
            motion_v_ms: self.motion_v_ms,
            top_max_km: self.top_max_km,
            top_p90_km: self.top_p90_km,
        }
    }
}

/// Accepts both the polarity names and the upstream "max"/"min" spellings.
pub fn parse_sense(s: &str) -> Result<Sense, LoadError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "cyclonic" | "max" => Ok(Sense::Cyclonic),
        "anticyclonic" | "min" => Ok(Sense::Anticyclonic),
        other => Err(LoadError::UnknownSense(other.to_string())),
    }
}
