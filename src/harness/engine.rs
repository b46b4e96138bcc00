use crate::error::Result;
use crate::geometry::{self, PredicateResult};
use crate::transform;
use crate::types::{EcefPoint, GeoPoint, LineSegment, NePoint, NedPoint, Origin};

/// Capability set shared by the system under test and the reference oracle.
///
/// The harness only ever talks to this trait, so either side can be swapped
/// for another implementation (a dynamically loaded library, a different
/// geodesy package) without touching the trial loop.
pub trait GeoEngine: Send + Sync {
    /// Short label used in logs and in the run summary.
    fn name(&self) -> &str;

    /// Check that the engine can be invoked at all. Called once before any
    /// trial runs; an error aborts the run.
    fn probe(&self) -> Result<()> {
        Ok(())
    }

    fn geo_to_ned(&self, origin: &Origin, point: &GeoPoint) -> Result<NedPoint>;

    fn ned_to_geo(&self, origin: &Origin, point: &NedPoint) -> Result<GeoPoint>;

    fn geo_to_ecef(&self, point: &GeoPoint) -> Result<EcefPoint>;

    fn ecef_to_geo(&self, point: &EcefPoint) -> Result<GeoPoint>;

    fn is_near(&self, polygon: &[NePoint], point: NePoint, radius: f32) -> PredicateResult;

    fn intersects(&self, polygon: &[NePoint], segment: &LineSegment) -> PredicateResult;
}

/// This crate's own transforms and predicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl GeoEngine for NativeEngine {
    fn name(&self) -> &str {
        "nedkit"
    }

    fn geo_to_ned(&self, origin: &Origin, point: &GeoPoint) -> Result<NedPoint> {
        transform::geo_to_ned(origin, point)
    }

    fn ned_to_geo(&self, origin: &Origin, point: &NedPoint) -> Result<GeoPoint> {
        transform::ned_to_geo(origin, point)
    }

    fn geo_to_ecef(&self, point: &GeoPoint) -> Result<EcefPoint> {
        transform::geo_to_ecef(point)
    }

    fn ecef_to_geo(&self, point: &EcefPoint) -> Result<GeoPoint> {
        transform::ecef_to_geo(point)
    }

    fn is_near(&self, polygon: &[NePoint], point: NePoint, radius: f32) -> PredicateResult {
        geometry::is_near(polygon, point, radius)
    }

    fn intersects(&self, polygon: &[NePoint], segment: &LineSegment) -> PredicateResult {
        geometry::intersects_segment(polygon, segment)
    }
}
