//! Flat-earth primitives shared by the trajectory generators.
//!
//! Valid for displacements of tens to a few hundred meters only; no
//! great-circle math is attempted.

use crate::model::Waypoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Coarse meters-per-degree constant used by the radial patterns.
pub const METERS_PER_DEGREE: f64 = 111_320.0;
const COS_LAT_THRESHOLD: f64 = 1e-12;

/// Shifts `(lat, lon)` by a metric displacement; result rounded to 6 places.
///
/// Longitude does not move at the poles, where `cos(lat)` vanishes.
pub fn offset(lat: f64, lon: f64, north_m: f64, east_m: f64) -> Waypoint {
    let delta_lat = (north_m / EARTH_RADIUS_M).to_degrees();
    let delta_lon = if lat.abs() >= 90.0 {
        0.0
    } else {
        let cos_lat = lat.to_radians().cos();
        if cos_lat.abs() < COS_LAT_THRESHOLD {
            0.0
        } else {
            (east_m / (EARTH_RADIUS_M * cos_lat)).to_degrees()
        }
    };
    Waypoint::rounded(lon + delta_lon, lat + delta_lat)
}

/// Same as [`offset`] with the origin given as a waypoint.
pub fn offset_from(origin: Waypoint, north_m: f64, east_m: f64) -> Waypoint {
    offset(origin.lat, origin.lon, north_m, east_m)
}

/// Rotates `point` about `origin` by `angle_deg`, treating lon/lat as
/// plane coordinates.
pub fn rotate(origin: Waypoint, point: Waypoint, angle_deg: f64) -> Waypoint {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let dx = point.lon - origin.lon;
    let dy = point.lat - origin.lat;
    Waypoint::rounded(
        origin.lon + cos_a * dx - sin_a * dy,
        origin.lat + sin_a * dx + cos_a * dy,
    )
}

/// Tip of a ray of `length_m` at `angle_rad` (counter-clockwise from east),
/// using the coarse [`METERS_PER_DEGREE`] constant. Not rounded.
pub fn ray_tip(center: Waypoint, length_m: f64, angle_rad: f64) -> Waypoint {
    let cos_lat = center.lat.to_radians().cos();
    let (sin_a, cos_a) = angle_rad.sin_cos();
    let delta_lon = if cos_lat.abs() < COS_LAT_THRESHOLD {
        0.0
    } else {
        length_m * cos_a / (METERS_PER_DEGREE * cos_lat)
    };
    Waypoint::new(
        center.lon + delta_lon,
        center.lat + length_m * sin_a / METERS_PER_DEGREE,
    )
}
