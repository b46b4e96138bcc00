use glam::{DMat3, DVec3};

use crate::types::{EcefPoint, GeoPoint};

/// WGS84 semi-major axis in metres.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis in metres.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared: e² = 2f - f²
pub const WGS84_E2: f64 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
/// WGS84 second eccentricity squared: e'² = e² / (1 - e²)
const WGS84_EP2: f64 = WGS84_E2 / (1.0 - WGS84_E2);

/// Parametric-latitude refinements applied after Bowring's initial guess.
const BOWRING_ITERATIONS: usize = 2;

/// Radius of curvature in the prime vertical at the given latitude (radians).
pub fn prime_vertical_radius(lat_rad: f64) -> f64 {
    let sin_lat = lat_rad.sin();
    WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt()
}

/// Convert geodetic latitude/longitude (degrees) and altitude (metres) to ECEF.
pub fn geodetic_to_ecef(geo: &GeoPoint) -> EcefPoint {
    let lat = geo.latitude_deg.to_radians();
    let lon = geo.longitude_deg.to_radians();

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = prime_vertical_radius(lat);

    let horizontal = (n + geo.altitude_m) * cos_lat;
    EcefPoint::new(
        horizontal * lon.cos(),
        horizontal * lon.sin(),
        (n * (1.0 - WGS84_E2) + geo.altitude_m) * sin_lat,
    )
}

/// Convert ECEF to geodetic with Bowring's method.
///
/// Starts from the parametric latitude of the point projected onto the
/// ellipsoid and refines it [`BOWRING_ITERATIONS`] times, which keeps the
/// altitude error well below a millimetre for points within a few thousand
/// kilometres of the surface. Longitude comes back in (-180°, 180°].
pub fn ecef_to_geodetic(ecef: &EcefPoint) -> GeoPoint {
    let EcefPoint { x, y, z } = *ecef;
    let p = x.hypot(y);

    // Earth's centre has no defined latitude; pin it to the equator.
    if p == 0.0 && z == 0.0 {
        return GeoPoint::new(0.0, 0.0, -WGS84_A);
    }

    let lon = y.atan2(x);

    let mut u = (z * WGS84_A).atan2(p * WGS84_B);
    let mut lat = 0.0;
    for _ in 0..BOWRING_ITERATIONS {
        let (sin_u, cos_u) = u.sin_cos();
        lat = (z + WGS84_EP2 * WGS84_B * sin_u.powi(3))
            .atan2(p - WGS84_E2 * WGS84_A * cos_u.powi(3));
        u = ((1.0 - WGS84_F) * lat.sin()).atan2(lat.cos());
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = prime_vertical_radius(lat);

    // Divide by the larger of cos/sin to stay well-conditioned near the poles.
    let alt = if sin_lat * sin_lat <= 0.5 {
        p / cos_lat - n
    } else {
        z / sin_lat - n * (1.0 - WGS84_E2)
    };

    let mut lon_deg = lon.to_degrees();
    if lon_deg == -180.0 {
        lon_deg = 180.0;
    }

    GeoPoint::new(lat.to_degrees(), lon_deg, alt)
}

/// Build the ECEF → NED direction cosine matrix for a geodetic origin.
///
/// Rows of the returned matrix are the local North, East and Down unit
/// vectors expressed in ECEF, so `ned = m * ecef_delta`. Its transpose maps
/// NED back to ECEF.
pub fn ned_rotation_matrix(lat_deg: f64, lon_deg: f64) -> DMat3 {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();

    // NED basis vectors expressed in ECEF:
    //   North = (-sin_lat*cos_lon, -sin_lat*sin_lon,  cos_lat)
    //   East  = (-sin_lon,          cos_lon,          0      )
    //   Down  = (-cos_lat*cos_lon, -cos_lat*sin_lon, -sin_lat)
    let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    let east = DVec3::new(-sin_lon, cos_lon, 0.0);
    let down = DVec3::new(-cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat);

    // glam is column-major: build with the basis as columns, then transpose.
    DMat3::from_cols(north, east, down).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        // (0°, 0°, 0m) should give (a, 0, 0)
        let ecef = geodetic_to_ecef(&GeoPoint::new(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(ecef.x, WGS84_A, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_north_pole() {
        let ecef = geodetic_to_ecef(&GeoPoint::new(90.0, 0.0, 0.0));
        assert!(ecef.x.abs() < 1e-6);
        assert!(ecef.y.abs() < 1e-6);
        assert_abs_diff_eq!(ecef.z, WGS84_B, epsilon = 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_known_point() {
        // London (51.5074° N, 0.1278° W, 0m)
        let ecef = geodetic_to_ecef(&GeoPoint::new(51.5074, -0.1278, 0.0));
        assert!((ecef.x - 3_978_000.0).abs() < 1000.0);
        assert!((ecef.y - (-8700.0)).abs() < 1000.0);
        assert!((ecef.z - 4_968_000.0).abs() < 1000.0);
    }

    #[test]
    fn geodetic_to_ecef_with_altitude() {
        let ground = geodetic_to_ecef(&GeoPoint::new(0.0, 0.0, 0.0));
        let high = geodetic_to_ecef(&GeoPoint::new(0.0, 0.0, 1000.0));
        // At equator, prime meridian, altitude adds to X only
        assert_abs_diff_eq!(high.x - ground.x, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn ecef_to_geodetic_inverts_forward() {
        let cases = [
            GeoPoint::new(0.0, 0.0, 0.0),
            GeoPoint::new(32.0, 34.0, 50.0),
            GeoPoint::new(-45.5, 179.9, -120.0),
            GeoPoint::new(89.99, -120.0, 2_000.0),
            GeoPoint::new(-89.999, 10.0, 0.0),
            GeoPoint::new(10.0, -75.0, 2_000_000.0),
        ];
        for geo in cases {
            let back = ecef_to_geodetic(&geodetic_to_ecef(&geo));
            assert_abs_diff_eq!(back.latitude_deg, geo.latitude_deg, epsilon = 1e-9);
            assert_abs_diff_eq!(back.longitude_deg, geo.longitude_deg, epsilon = 1e-9);
            assert_abs_diff_eq!(back.altitude_m, geo.altitude_m, epsilon = 1e-4);
        }
    }

    #[test]
    fn ecef_to_geodetic_on_polar_axis() {
        let back = ecef_to_geodetic(&EcefPoint::new(0.0, 0.0, WGS84_B + 100.0));
        assert_abs_diff_eq!(back.latitude_deg, 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.altitude_m, 100.0, epsilon = 1e-6);

        let back = ecef_to_geodetic(&EcefPoint::new(0.0, 0.0, -WGS84_B));
        assert_abs_diff_eq!(back.latitude_deg, -90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.altitude_m, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn ecef_to_geodetic_seam_longitude_is_positive() {
        let back = ecef_to_geodetic(&EcefPoint::new(-WGS84_A, 0.0, 0.0));
        assert_abs_diff_eq!(back.longitude_deg, 180.0, epsilon = 1e-12);
    }

    #[test]
    fn ned_matrix_at_equator_prime_meridian() {
        let m = ned_rotation_matrix(0.0, 0.0);
        // North = +Z, East = +Y, Down = -X
        let n = m * DVec3::new(0.0, 0.0, 1.0);
        assert_abs_diff_eq!(n.x, 1.0, epsilon = 1e-12);
        let e = m * DVec3::new(0.0, 1.0, 0.0);
        assert_abs_diff_eq!(e.y, 1.0, epsilon = 1e-12);
        let d = m * DVec3::new(-1.0, 0.0, 0.0);
        assert_abs_diff_eq!(d.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ned_matrix_is_orthonormal() {
        let m = ned_rotation_matrix(47.3, -122.4);
        let identity = m * m.transpose();
        for (col, expected) in [identity.x_axis, identity.y_axis, identity.z_axis]
            .into_iter()
            .zip([DVec3::X, DVec3::Y, DVec3::Z])
        {
            assert!((col - expected).length() < 1e-12);
        }
        assert_abs_diff_eq!(m.determinant(), 1.0, epsilon = 1e-12);
    }
}
