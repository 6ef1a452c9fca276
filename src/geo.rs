pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

/// Haversine great-circle distance in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let dlat = (b.lat_deg - a.lat_deg).to_radians();
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from north in [0, 360).
pub fn bearing_deg(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_a = from.lat_deg.to_radians();
    let lat_b = to.lat_deg.to_radians();
    let dlon = (to.lon_deg - from.lon_deg).to_radians();

    let y = dlon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dlon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Point reached by travelling `dist_km` along `bearing` from `from`.
/// A negative distance travels along the reciprocal bearing.
pub fn destination(from: GeoPoint, bearing: f64, dist_km: f64) -> GeoPoint {
    let (bearing, dist_km) = if dist_km < 0.0 {
        (bearing + 180.0, -dist_km)
    } else {
        (bearing, dist_km)
    };

    let lat = from.lat_deg.to_radians();
    let lon = from.lon_deg.to_radians();
    let brg = bearing.to_radians();
    let ang = dist_km / EARTH_RADIUS_KM;

    let lat_out = (lat.sin() * ang.cos() + lat.cos() * ang.sin() * brg.cos()).asin();
    let lon_out = lon
        + (brg.sin() * ang.sin() * lat.cos()).atan2(ang.cos() - lat.sin() * lat_out.sin());

    GeoPoint {
        lat_deg: lat_out.to_degrees(),
        lon_deg: wrap_lon(lon_out.to_degrees()),
    }
}

/// Absolute difference between two bearings, wrapped to [0, 180].
pub fn bearing_difference_deg(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Bearing of a (u east, v north) vector, degrees clockwise from north.
pub fn vector_bearing_deg(u: f64, v: f64) -> f64 {
    u.atan2(v).to_degrees().rem_euclid(360.0)
}

fn wrap_lon(lon_deg: f64) -> f64 {
    let w = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if w == -180.0 {
        180.0
    } else {
        w
    }
}
