//! Reference oracle.
//!
//! Independent of the engine under test: ECEF to geodetic uses Heikkinen's
//! closed-form solution instead of Bowring iteration, the NED frame is built
//! from east/up basis vectors instead of a direction cosine matrix, and the
//! polygon predicates go through the `geo` crate's containment, distance and
//! intersection algorithms.

use geo::{EuclideanDistance, Intersects, Line, LineString, Point, Polygon};
use glam::DVec3;

use super::engine::GeoEngine;
use crate::error::{NedkitError, Result};
use crate::geometry::{BOUNDARY_TOLERANCE_M, PredicateError, PredicateResult};
use crate::types::{EcefPoint, GeoPoint, LineSegment, NePoint, NedPoint, Origin};

const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_223_563;
const B: f64 = A * (1.0 - F);
const E2: f64 = F * (2.0 - F);
const EP2: f64 = (A * A - B * B) / (B * B);

/// Ground-truth implementation of the [`GeoEngine`] capability set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceOracle;

impl ReferenceOracle {
    pub fn new() -> Self {
        Self
    }
}

fn finite(what: &str, values: [f64; 3]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(NedkitError::InvalidInput(format!("{what}: {values:?}")))
    }
}

fn to_ecef(lat_deg: f64, lon_deg: f64, alt: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();
    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    DVec3::new(
        (n + alt) * cos_lat * cos_lon,
        (n + alt) * cos_lat * sin_lon,
        (n * (1.0 - E2) + alt) * sin_lat,
    )
}

/// Heikkinen (1982) exact closed-form inversion.
fn heikkinen(ecef: DVec3) -> GeoPoint {
    let (x, y, z) = (ecef.x, ecef.y, ecef.z);
    let p2 = x * x + y * y;
    let p = p2.sqrt();
    let z2 = z * z;

    let f = 54.0 * B * B * z2;
    let g = p2 + (1.0 - E2) * z2 - E2 * (A * A - B * B);
    let c = E2 * E2 * f * p2 / (g * g * g);
    let s = (1.0 + c + (c * c + 2.0 * c).sqrt()).cbrt();
    let k = s + 1.0 + 1.0 / s;
    let big_p = f / (3.0 * k * k * g * g);
    let q = (1.0 + 2.0 * E2 * E2 * big_p).sqrt();
    let r0 = -big_p * E2 * p / (1.0 + q)
        + (0.5 * A * A * (1.0 + 1.0 / q)
            - big_p * (1.0 - E2) * z2 / (q * (1.0 + q))
            - 0.5 * big_p * p2)
            .max(0.0)
            .sqrt();

    let t = p - E2 * r0;
    let u = (t * t + z2).sqrt();
    let v = (t * t + (1.0 - E2) * z2).sqrt();
    let z0 = B * B * z / (A * v);

    GeoPoint::new(
        (z + EP2 * z0).atan2(p).to_degrees(),
        y.atan2(x).to_degrees(),
        u * (1.0 - B * B / (A * v)),
    )
}

/// North, east and up unit vectors of the tangent plane at `origin`.
fn local_basis(origin: &Origin) -> (DVec3, DVec3, DVec3) {
    let (sin_lat, cos_lat) = origin.latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = origin.longitude_deg.to_radians().sin_cos();
    let east = DVec3::new(-sin_lon, cos_lon, 0.0);
    let up = DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
    (up.cross(east), east, up)
}

fn check_polygon(polygon: &[NePoint]) -> std::result::Result<(), PredicateError> {
    match polygon.len() {
        0 => Err(PredicateError::PolygonNull),
        n @ (1 | 2) => Err(PredicateError::PolygonTooSmall { vertices: n }),
        _ => Ok(()),
    }
}

fn to_geo_polygon(polygon: &[NePoint]) -> Polygon<f64> {
    let ring: Vec<(f64, f64)> = polygon.iter().map(|p| p.to_f64()).collect();
    Polygon::new(LineString::from(ring), vec![])
}

impl GeoEngine for ReferenceOracle {
    fn name(&self) -> &str {
        "reference"
    }

    /// Self-check against values that hold for any correct WGS84 and
    /// planar-geometry implementation.
    fn probe(&self) -> Result<()> {
        let on_equator = to_ecef(0.0, 0.0, 0.0);
        let pole = heikkinen(DVec3::new(0.0, 0.0, B + 10.0));
        let transforms_ok = (on_equator.x - A).abs() < 1e-6
            && (pole.latitude_deg - 90.0).abs() < 1e-9
            && (pole.altitude_m - 10.0).abs() < 1e-6;

        let unit_square = [
            NePoint::new(0.0, 0.0),
            NePoint::new(0.0, 1.0),
            NePoint::new(1.0, 1.0),
            NePoint::new(1.0, 0.0),
        ];
        let predicates_ok = self.is_near(&unit_square, NePoint::new(0.5, 0.5), 0.0) == Ok(true)
            && self.is_near(&unit_square, NePoint::new(3.0, 3.0), 0.5) == Ok(false);

        if transforms_ok && predicates_ok {
            Ok(())
        } else {
            Err(NedkitError::OracleUnavailable(format!(
                "self-check failed (transforms: {transforms_ok}, predicates: {predicates_ok})"
            )))
        }
    }

    fn geo_to_ned(&self, origin: &Origin, point: &GeoPoint) -> Result<NedPoint> {
        finite("origin", origin.as_geo().to_array())?;
        finite("geodetic point", point.to_array())?;

        let delta = to_ecef(point.latitude_deg, point.longitude_deg, point.altitude_m)
            - to_ecef(origin.latitude_deg, origin.longitude_deg, origin.altitude_m);
        let (north, east, up) = local_basis(origin);
        Ok(NedPoint::new(delta.dot(north), delta.dot(east), -delta.dot(up)))
    }

    fn ned_to_geo(&self, origin: &Origin, point: &NedPoint) -> Result<GeoPoint> {
        finite("origin", origin.as_geo().to_array())?;
        finite("NED point", point.to_array())?;

        let (north, east, up) = local_basis(origin);
        let ecef = to_ecef(origin.latitude_deg, origin.longitude_deg, origin.altitude_m)
            + north * point.north
            + east * point.east
            - up * point.down;
        Ok(heikkinen(ecef))
    }

    fn geo_to_ecef(&self, point: &GeoPoint) -> Result<EcefPoint> {
        finite("geodetic point", point.to_array())?;
        Ok(EcefPoint::from_dvec3(to_ecef(
            point.latitude_deg,
            point.longitude_deg,
            point.altitude_m,
        )))
    }

    fn ecef_to_geo(&self, point: &EcefPoint) -> Result<GeoPoint> {
        finite("ECEF point", point.to_array())?;
        Ok(heikkinen(point.to_dvec3()))
    }

    fn is_near(&self, polygon: &[NePoint], point: NePoint, radius: f32) -> PredicateResult {
        check_polygon(polygon)?;
        // Zero when the point is inside, else distance to the nearest edge
        let distance = Point::from(point.to_f64()).euclidean_distance(&to_geo_polygon(polygon));
        Ok(distance <= (radius as f64).max(0.0) + BOUNDARY_TOLERANCE_M)
    }

    fn intersects(&self, polygon: &[NePoint], segment: &LineSegment) -> PredicateResult {
        check_polygon(polygon)?;
        if !(segment.length_m > 0.0) {
            return Err(PredicateError::InvalidLength {
                length: segment.length_m,
            });
        }

        // Start inside or on the boundary, with the same slack as `is_near`
        if self.is_near(polygon, segment.start, 0.0)? {
            return Ok(true);
        }

        let poly = to_geo_polygon(polygon);
        let start = segment.start.to_f64();

        let (sin_az, cos_az) = (segment.azimuth_deg as f64).to_radians().sin_cos();
        let length = segment.length_m as f64;
        let end = (start.0 + length * cos_az, start.1 + length * sin_az);
        Ok(Line::new(start, end).intersects(&poly))
    }
}
