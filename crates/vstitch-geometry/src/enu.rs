//! Flat-earth East-North-Up projection on the WGS-84 ellipsoid.
//!
//! Good for baselines of a few kilometres. Not globally accurate.

use vstitch_models::{GeoPoint, Vector2};

/// WGS-84 semi-major axis in metres.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity squared.
pub const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Offset of `target` from `origin` in metres, `x` east and `y` north.
pub fn enu_offset(origin: GeoPoint, target: GeoPoint) -> Vector2 {
    let phi0 = origin.latitude.to_radians();
    let sin_phi0 = phi0.sin();
    let denom = 1.0 - WGS84_E2 * sin_phi0 * sin_phi0;

    // Meridian and prime-vertical radii of curvature.
    let r_north = WGS84_A * (1.0 - WGS84_E2) / denom.powf(1.5);
    let r_east = WGS84_A / denom.sqrt();

    let d_lat = (target.latitude - origin.latitude).to_radians();
    let d_lon = (target.longitude - origin.longitude).to_radians();

    Vector2::new(r_east * phi0.cos() * d_lon, r_north * d_lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_origin() {
        let p = GeoPoint::new(37.4, -122.1);
        assert_eq!(enu_offset(p, p), Vector2::ZERO);
    }

    #[test]
    fn test_one_millidegree_north_at_equator() {
        let origin = GeoPoint::new(0.0, 0.0);
        let v = enu_offset(origin, GeoPoint::new(0.001, 0.0));
        // ~110.57 m per degree of latitude at the equator.
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 110.57).abs() < 0.1, "north = {}", v.y);
    }

    #[test]
    fn test_east_shrinks_with_latitude() {
        let equator = enu_offset(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001));
        let sixty = enu_offset(GeoPoint::new(60.0, 0.0), GeoPoint::new(60.0, 0.001));
        assert!(equator.x > 0.0);
        assert!(sixty.x < equator.x * 0.51);
        assert!(sixty.x > equator.x * 0.49);
    }

    #[test]
    fn test_west_and_south_are_negative() {
        let v = enu_offset(GeoPoint::new(45.0, 10.0), GeoPoint::new(44.999, 9.999));
        assert!(v.x < 0.0);
        assert!(v.y < 0.0);
    }
}
