//! Fixed-layout C ABI.
//!
//! Polygons are passed as a pointer plus vertex count, results are written
//! through out-parameters. On any status other than [`Status::Ok`] the
//! boolean output is set to `true`: callers that ignore the status treat the
//! query as a collision.
//!
//! `isInsidePolygon`, `doesLineIntersectPolygon`, `GeoToNed` and `NedToGeo`
//! keep the names and signatures existing C and ctypes callers bind to. The
//! `nk_*` transform variants additionally report a [`Status`].

use std::{ptr, slice};

use crate::geometry::{self, PredicateError, PredicateResult, Status};
use crate::transform;
use crate::types::{EcefPoint, GeoPoint, NePoint, NedPoint, Origin};

const NAN3: [f64; 3] = [f64::NAN; 3];

/// # Safety
///
/// `polygon` must be null or point to `count` readable vertices.
unsafe fn polygon_slice<'a>(polygon: *const NePoint, count: u16) -> Option<&'a [NePoint]> {
    if polygon.is_null() {
        None
    } else {
        // SAFETY: non-null and the caller guarantees `count` vertices.
        Some(unsafe { slice::from_raw_parts(polygon, count as usize) })
    }
}

/// # Safety
///
/// Each pointer must be null or valid for a single write.
unsafe fn write_predicate(
    result: PredicateResult,
    out_result: *mut bool,
    result_state: *mut Status,
) {
    let (hit, status) = match result {
        Ok(hit) => (hit, Status::Ok),
        Err(e) => (true, e.status()),
    };
    // SAFETY: the caller guarantees the pointers are writable when non-null.
    unsafe {
        if let Some(out) = out_result.as_mut() {
            *out = hit;
        }
        if let Some(state) = result_state.as_mut() {
            *state = status;
        }
    }
}

/// Disc-versus-polygon overlap test.
///
/// # Safety
///
/// `polygon` must be null or point to `point_count` vertices, `test_point`
/// must be valid for reads, and the out-pointers valid for writes.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn isInsidePolygon(
    polygon: *const NePoint,
    point_count: u16,
    test_point: *const NePoint,
    radius_meters: f32,
    out_result: *mut bool,
    result_state: *mut Status,
) {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = match (polygon_slice(polygon, point_count), test_point.as_ref()) {
            (None, _) | (_, None) => Err(PredicateError::PolygonNull),
            (Some(poly), Some(point)) => geometry::is_near(poly, *point, radius_meters),
        };
        write_predicate(result, out_result, result_state);
    }
}

/// Segment-versus-polygon intersection test.
///
/// # Safety
///
/// Same contract as [`isInsidePolygon`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn doesLineIntersectPolygon(
    polygon: *const NePoint,
    point_count: u16,
    test_point: *const NePoint,
    azimuth_degrees: f32,
    max_length_meters: f32,
    out_result: *mut bool,
    result_state: *mut Status,
) {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = match (polygon_slice(polygon, point_count), test_point.as_ref()) {
            (None, _) | (_, None) => Err(PredicateError::PolygonNull),
            (Some(poly), Some(start)) => {
                geometry::intersects(poly, *start, azimuth_degrees, max_length_meters)
            }
        };
        write_predicate(result, out_result, result_state);
    }
}

/// # Safety
///
/// Latitude and longitude pointers must be valid for reads; altitude may be
/// null, in which case the origin sits on the ellipsoid (0 m).
unsafe fn read_origin(lat: *const f64, lon: *const f64, alt: *const f64) -> Option<Origin> {
    // SAFETY: forwarded from the caller.
    unsafe {
        let lat = *lat.as_ref()?;
        let lon = *lon.as_ref()?;
        Some(match alt.as_ref() {
            Some(&alt) => Origin::with_altitude(lat, lon, alt),
            None => Origin::new(lat, lon),
        })
    }
}

/// # Safety
///
/// `status` must be null or valid for a single write.
unsafe fn finish<T>(result: Option<crate::error::Result<T>>, fallback: T, status: *mut Status) -> T {
    let (value, code) = match result {
        Some(Ok(v)) => (v, Status::Ok),
        Some(Err(_)) | None => (fallback, Status::InvalidInput),
    };
    // SAFETY: forwarded from the caller.
    unsafe {
        if let Some(s) = status.as_mut() {
            *s = code;
        }
    }
    value
}

/// Geodetic point to NED relative to the origin.
///
/// Non-finite input yields NaN components and [`Status::InvalidInput`].
///
/// # Safety
///
/// `origin_lat_deg`, `origin_lon_deg` and `geo` must be valid for reads;
/// `origin_alt_m` and `status` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_geo_to_ned(
    origin_lat_deg: *const f64,
    origin_lon_deg: *const f64,
    origin_alt_m: *const f64,
    geo: *const GeoPoint,
    status: *mut Status,
) -> NedPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = read_origin(origin_lat_deg, origin_lon_deg, origin_alt_m)
            .zip(geo.as_ref())
            .map(|(origin, geo)| transform::geo_to_ned(&origin, geo));
        finish(result, bytemuck::cast(NAN3), status)
    }
}

/// NED offset from the origin back to a geodetic point.
///
/// # Safety
///
/// Same contract as [`nk_geo_to_ned`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_ned_to_geo(
    origin_lat_deg: *const f64,
    origin_lon_deg: *const f64,
    origin_alt_m: *const f64,
    ned: *const NedPoint,
    status: *mut Status,
) -> GeoPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = read_origin(origin_lat_deg, origin_lon_deg, origin_alt_m)
            .zip(ned.as_ref())
            .map(|(origin, ned)| transform::ned_to_geo(&origin, ned));
        finish(result, bytemuck::cast(NAN3), status)
    }
}

/// [`nk_geo_to_ned`] without the status out-parameter.
///
/// # Safety
///
/// Same contract as [`nk_geo_to_ned`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GeoToNed(
    origin_lat_deg: *const f64,
    origin_lon_deg: *const f64,
    origin_alt_m: *const f64,
    geo: *const GeoPoint,
) -> NedPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe { nk_geo_to_ned(origin_lat_deg, origin_lon_deg, origin_alt_m, geo, ptr::null_mut()) }
}

/// [`nk_ned_to_geo`] without the status out-parameter.
///
/// # Safety
///
/// Same contract as [`nk_geo_to_ned`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn NedToGeo(
    origin_lat_deg: *const f64,
    origin_lon_deg: *const f64,
    origin_alt_m: *const f64,
    ned: *const NedPoint,
) -> GeoPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe { nk_ned_to_geo(origin_lat_deg, origin_lon_deg, origin_alt_m, ned, ptr::null_mut()) }
}

/// Geodetic point to ECEF.
///
/// # Safety
///
/// `geo` must be valid for reads; `status` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_geo_to_ecef(geo: *const GeoPoint, status: *mut Status) -> EcefPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = geo.as_ref().map(transform::geo_to_ecef);
        finish(result, bytemuck::cast(NAN3), status)
    }
}

/// ECEF point to geodetic.
///
/// # Safety
///
/// `ecef` must be valid for reads; `status` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nk_ecef_to_geo(ecef: *const EcefPoint, status: *mut Status) -> GeoPoint {
    // SAFETY: forwarded from this function's contract.
    unsafe {
        let result = ecef.as_ref().map(transform::ecef_to_geo);
        finish(result, bytemuck::cast(NAN3), status)
    }
}
