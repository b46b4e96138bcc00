pub mod ecef;

use crate::error::{NedkitError, Result};
use crate::types::{EcefPoint, GeoPoint, NedPoint, Origin};

use ecef::{ecef_to_geodetic, geodetic_to_ecef, ned_rotation_matrix};

/// Wrap an angle in degrees into (-180°, 180°].
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Fold a latitude/longitude pair into the canonical domain.
///
/// A latitude past a pole is reflected back over it, which moves the point
/// to the opposite meridian. Longitude ends up in (-180°, 180°].
pub fn fold_lat_lon(lat_deg: f64, lon_deg: f64) -> (f64, f64) {
    let mut lat = wrap_longitude(lat_deg);
    let mut lon = lon_deg;
    if lat > 90.0 {
        lat = 180.0 - lat;
        lon += 180.0;
    } else if lat < -90.0 {
        lat = -180.0 - lat;
        lon += 180.0;
    }
    (lat, wrap_longitude(lon))
}

fn ensure_finite(what: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(NedkitError::InvalidInput(format!(
            "{what} has a non-finite component: {values:?}"
        )))
    }
}

fn normalized_geo(geo: &GeoPoint) -> GeoPoint {
    let (lat, lon) = fold_lat_lon(geo.latitude_deg, geo.longitude_deg);
    GeoPoint::new(lat, lon, geo.altitude_m)
}

fn normalized_origin(origin: &Origin) -> Result<GeoPoint> {
    ensure_finite(
        "origin",
        &[origin.latitude_deg, origin.longitude_deg, origin.altitude_m],
    )?;
    Ok(normalized_geo(&origin.as_geo()))
}

/// Geodetic → ECEF under WGS84.
pub fn geo_to_ecef(point: &GeoPoint) -> Result<EcefPoint> {
    ensure_finite("geodetic point", &point.to_array())?;
    Ok(geodetic_to_ecef(&normalized_geo(point)))
}

/// ECEF → geodetic under WGS84.
pub fn ecef_to_geo(point: &EcefPoint) -> Result<GeoPoint> {
    ensure_finite("ECEF point", &point.to_array())?;
    Ok(ecef_to_geodetic(point))
}

/// Express a geodetic point in the NED frame of `origin`.
///
/// The origin's altitude is used as given ([`Origin::new`] places it on the
/// ellipsoid, altitude 0 m), so `down` is measured from that height.
pub fn geo_to_ned(origin: &Origin, point: &GeoPoint) -> Result<NedPoint> {
    let origin = normalized_origin(origin)?;
    ensure_finite("geodetic point", &point.to_array())?;

    let origin_ecef = geodetic_to_ecef(&origin).to_dvec3();
    let point_ecef = geodetic_to_ecef(&normalized_geo(point)).to_dvec3();

    let rotation = ned_rotation_matrix(origin.latitude_deg, origin.longitude_deg);
    Ok(NedPoint::from_dvec3(rotation * (point_ecef - origin_ecef)))
}

/// Inverse of [`geo_to_ned`]: NED offset from `origin` back to geodetic.
pub fn ned_to_geo(origin: &Origin, point: &NedPoint) -> Result<GeoPoint> {
    let origin = normalized_origin(origin)?;
    ensure_finite("NED point", &point.to_array())?;

    let origin_ecef = geodetic_to_ecef(&origin).to_dvec3();
    let rotation = ned_rotation_matrix(origin.latitude_deg, origin.longitude_deg);
    let ecef = origin_ecef + rotation.transpose() * point.to_dvec3();

    Ok(ecef_to_geodetic(&EcefPoint::from_dvec3(ecef)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn scenario_geo_to_ned() {
        let origin = Origin::new(32.0, 34.0);
        let ned = geo_to_ned(&origin, &GeoPoint::new(32.01, 34.01, 50.0)).unwrap();
        // Earth curvature lifts the point's `down` by ~0.17 m over 1.4 km.
        assert_abs_diff_eq!(ned.north, 1108.921, epsilon = 0.05);
        assert_abs_diff_eq!(ned.east, 944.836, epsilon = 0.05);
        assert_abs_diff_eq!(ned.down, -49.833, epsilon = 0.05);
    }

    #[test]
    fn scenario_ned_to_geo() {
        let origin = Origin::new(32.0, 34.0);
        let geo = ned_to_geo(&origin, &NedPoint::new(1000.0, 500.0, -50.0)).unwrap();
        assert_abs_diff_eq!(geo.latitude_deg, 32.009018, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.longitude_deg, 34.005292, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.altitude_m, 50.098, epsilon = 0.05);
    }

    #[test]
    fn origin_maps_to_zero() {
        let origin = Origin::with_altitude(-33.9, 151.2, 40.0);
        let ned = geo_to_ned(&origin, &origin.as_geo()).unwrap();
        assert_abs_diff_eq!(ned.north, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ned.east, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ned.down, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn origin_altitude_shifts_down_axis() {
        let surface = Origin::new(10.0, 20.0);
        let raised = Origin::with_altitude(10.0, 20.0, 100.0);
        let p = GeoPoint::new(10.0, 20.0, 0.0);
        let a = geo_to_ned(&surface, &p).unwrap();
        let b = geo_to_ned(&raised, &p).unwrap();
        assert_abs_diff_eq!(b.down - a.down, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn round_trip_across_seam() {
        let origin = Origin::new(-12.0, 179.9);
        let p = GeoPoint::new(-11.6, -179.7, 321.0);
        let ned = geo_to_ned(&origin, &p).unwrap();
        // The seam crossing is a short hop east, not a trip around the globe.
        assert!(ned.east > 0.0 && ned.east < 50_000.0);
        let back = ned_to_geo(&origin, &ned).unwrap();
        assert_abs_diff_eq!(back.latitude_deg, p.latitude_deg, epsilon = 1e-9);
        assert_abs_diff_eq!(back.longitude_deg, p.longitude_deg, epsilon = 1e-9);
        assert_abs_diff_eq!(back.altitude_m, p.altitude_m, epsilon = 1e-4);
    }

    #[test]
    fn round_trip_near_pole() {
        let origin = Origin::new(89.9, 45.0);
        let p = GeoPoint::new(89.95, -130.0, 12.0);
        let ned = geo_to_ned(&origin, &p).unwrap();
        let back = ned_to_geo(&origin, &ned).unwrap();
        assert_abs_diff_eq!(back.latitude_deg, p.latitude_deg, epsilon = 1e-9);
        assert_abs_diff_eq!(back.longitude_deg, p.longitude_deg, epsilon = 1e-7);
        assert_abs_diff_eq!(back.altitude_m, p.altitude_m, epsilon = 1e-4);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let origin = Origin::new(32.0, 34.0);
        let err = geo_to_ned(&origin, &GeoPoint::new(f64::NAN, 34.0, 0.0)).unwrap_err();
        assert!(matches!(err, NedkitError::InvalidInput(_)));

        let err = ned_to_geo(&origin, &NedPoint::new(0.0, f64::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, NedkitError::InvalidInput(_)));

        let bad_origin = Origin::new(32.0, f64::NAN);
        assert!(geo_to_ned(&bad_origin, &GeoPoint::new(32.0, 34.0, 0.0)).is_err());
        assert!(geo_to_ecef(&GeoPoint::new(0.0, 0.0, f64::INFINITY)).is_err());
        assert!(ecef_to_geo(&EcefPoint::new(f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn wrap_longitude_range() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), 180.0);
        assert_abs_diff_eq!(wrap_longitude(190.0), -170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_longitude(-190.0), 170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_longitude(725.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn fold_reflects_over_pole() {
        let (lat, lon) = fold_lat_lon(95.0, 10.0);
        assert_abs_diff_eq!(lat, 85.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, -170.0, epsilon = 1e-12);

        let (lat, lon) = fold_lat_lon(-100.0, -30.0);
        assert_abs_diff_eq!(lat, -80.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, 150.0, epsilon = 1e-12);
    }

    #[test]
    fn folded_point_maps_to_same_ecef() {
        let a = geo_to_ecef(&GeoPoint::new(95.0, 10.0, 5.0)).unwrap();
        let b = geo_to_ecef(&GeoPoint::new(85.0, -170.0, 5.0)).unwrap();
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-6);
    }
}
