use crate::geo::{self, GeoPoint};
use crate::store::Motion;

/// Motion of the newer cluster from the displacement older -> newer.
///
/// `previous` is the motion carried by the track so far. In mean mode the
/// east/north components of every historical estimate are summed and the
/// stored bearing/speed come from the component mean; raw bearings are never
/// averaged. Outside mean mode the latest pair wins but the sums are still
/// maintained so the mode can be meaningful per configuration, not per call.
pub fn estimate(
    previous: Option<&Motion>,
    older: GeoPoint,
    newer: GeoPoint,
    elapsed_s: f64,
    mean: bool,
) -> Motion {
    let dist_km = geo::distance_km(older, newer);
    let bearing = geo::bearing_deg(older, newer);
    let speed = if elapsed_s.abs() > 0.0 {
        dist_km / elapsed_s.abs()
    } else {
        0.0
    };

    let east = speed * bearing.to_radians().sin();
    let north = speed * bearing.to_radians().cos();

    let (sum_east, sum_north, samples) = match previous {
        Some(m) => (m.sum_east + east, m.sum_north + north, m.samples + 1),
        None => (east, north, 1),
    };

    if mean && samples > 0 {
        let mean_east = sum_east / samples as f64;
        let mean_north = sum_north / samples as f64;
        Motion {
            bearing_deg: geo::vector_bearing_deg(mean_east, mean_north),
            speed_km_s: (mean_east * mean_east + mean_north * mean_north).sqrt(),
            sum_east,
            sum_north,
            samples,
        }
    } else {
        Motion {
            bearing_deg: bearing,
            speed_km_s: speed,
            sum_east,
            sum_north,
            samples,
        }
    }
}

/// Dead-reckoned position after `elapsed_s` seconds along the stored motion,
/// scaled by the configured projection fraction. Negative elapsed time
/// regresses along the reciprocal bearing.
pub fn project(from: GeoPoint, motion: &Motion, elapsed_s: f64, fraction: f64) -> GeoPoint {
    let dist_km = motion.speed_km_s * elapsed_s * fraction;
    geo::destination(from, motion.bearing_deg, dist_km)
}
