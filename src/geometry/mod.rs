//! Polygon predicates in the local north/east plane.
//!
//! Both predicates are pure functions. Precondition failures come back as a
//! [`PredicateError`] value which maps one-to-one onto the ABI [`Status`].

pub mod segment;

use crate::types::{LineSegment, NePoint};

use segment::{Pt, dist_to_segment_sq, segments_intersect};

/// Slack (metres) added to the radius so points exactly on an edge or at
/// exact tangency survive `f32 → f64` rounding.
pub const BOUNDARY_TOLERANCE_M: f64 = 1e-6;

/// Status codes shared with the C ABI.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Ok = 0,
    PolygonTooSmall = 1,
    PolygonNull = 2,
    InvalidLength = 3,
    /// Non-finite input to a transform entry point.
    InvalidInput = 4,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::PolygonTooSmall),
            2 => Some(Status::PolygonNull),
            3 => Some(Status::InvalidLength),
            4 => Some(Status::InvalidInput),
            _ => None,
        }
    }
}

/// Precondition violations of the polygon predicates.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PredicateError {
    #[error("polygon has {vertices} vertices, at least 3 are required")]
    PolygonTooSmall { vertices: usize },
    #[error("polygon is null or has no vertices")]
    PolygonNull,
    #[error("segment length {length} must be positive")]
    InvalidLength { length: f32 },
}

/// Outcome of a polygon predicate: the verdict, or why it could not be computed.
pub type PredicateResult = Result<bool, PredicateError>;

impl PredicateError {
    pub fn status(&self) -> Status {
        match self {
            PredicateError::PolygonTooSmall { .. } => Status::PolygonTooSmall,
            PredicateError::PolygonNull => Status::PolygonNull,
            PredicateError::InvalidLength { .. } => Status::InvalidLength,
        }
    }
}

/// Status of a predicate result (`Ok` on success).
pub fn status_of(result: &PredicateResult) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(e) => e.status(),
    }
}

fn validate_polygon(polygon: &[NePoint]) -> Result<(), PredicateError> {
    match polygon.len() {
        0 => Err(PredicateError::PolygonNull),
        n if n < 3 => Err(PredicateError::PolygonTooSmall { vertices: n }),
        _ => Ok(()),
    }
}

fn pt(p: NePoint) -> Pt {
    p.to_f64()
}

/// Crossing-number containment test with a ray cast toward +north.
fn contains(polygon: &[NePoint], point: Pt) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (ni, ei) = pt(polygon[i]);
        let (nj, ej) = pt(polygon[j]);
        // Edge straddles the point's east coordinate (half-open rule)
        if (ei > point.1) != (ej > point.1) {
            let crossing_n = ni + (nj - ni) * (point.1 - ei) / (ej - ei);
            if point.0 < crossing_n {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn min_edge_distance_sq(polygon: &[NePoint], point: Pt) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| dist_to_segment_sq(point, pt(polygon[i]), pt(polygon[(i + 1) % n])))
        .fold(f64::INFINITY, f64::min)
}

/// Whether a disc of `radius` metres around `point` overlaps the polygon.
///
/// True when the centre is inside, or when any edge is within `radius`
/// (inclusive, so exact tangency and a point on the boundary both count).
/// A negative radius is treated as 0.
pub fn is_near(polygon: &[NePoint], point: NePoint, radius: f32) -> PredicateResult {
    validate_polygon(polygon)?;

    let center = pt(point);
    if contains(polygon, center) {
        return Ok(true);
    }

    let reach = (radius as f64).max(0.0) + BOUNDARY_TOLERANCE_M;
    Ok(min_edge_distance_sq(polygon, center) <= reach * reach)
}

/// Whether the segment from `start` along `azimuth_deg` (clockwise from
/// north) for `length_m` metres touches the polygon.
///
/// A start point inside or on the polygon is an immediate hit. Touching a
/// vertex or running along an edge counts as intersecting.
pub fn intersects(
    polygon: &[NePoint],
    start: NePoint,
    azimuth_deg: f32,
    length_m: f32,
) -> PredicateResult {
    validate_polygon(polygon)?;
    if !(length_m > 0.0) {
        return Err(PredicateError::InvalidLength { length: length_m });
    }

    if is_near(polygon, start, 0.0)? {
        return Ok(true);
    }

    let segment = LineSegment::new(start, azimuth_deg, length_m);
    let (a, b) = (pt(start), segment.end_f64());
    let n = polygon.len();
    Ok((0..n).any(|i| segments_intersect(a, b, pt(polygon[i]), pt(polygon[(i + 1) % n]))))
}

/// [`intersects`] taking a prepared [`LineSegment`].
pub fn intersects_segment(polygon: &[NePoint], segment: &LineSegment) -> PredicateResult {
    intersects(polygon, segment.start, segment.azimuth_deg, segment.length_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Polygon;

    fn square() -> Polygon {
        Polygon::from_pairs(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])
    }

    fn u_shape() -> Polygon {
        Polygon::from_pairs(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (7.0, 10.0),
            (7.0, 3.0),
            (3.0, 3.0),
            (3.0, 10.0),
            (0.0, 10.0),
        ])
    }

    fn triangle() -> Polygon {
        Polygon::from_pairs(&[(0.0, 0.0), (10.0, 2.0), (0.0, 4.0)])
    }

    fn near(poly: &Polygon, n: f32, e: f32, r: f32) -> bool {
        is_near(&poly.vertices, NePoint::new(n, e), r).unwrap()
    }

    fn hit(poly: &Polygon, n: f32, e: f32, az: f32, len: f32) -> bool {
        intersects(&poly.vertices, NePoint::new(n, e), az, len).unwrap()
    }

    #[test]
    fn scenario_square_disc() {
        let poly = Polygon::from_pairs(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        assert!(near(&poly, 50.0, 50.0, 1.0));
        assert_eq!(is_near(&poly.vertices, NePoint::new(200.0, 200.0), 1.0), Ok(false));
    }

    #[test]
    fn inside_outside_and_boundary() {
        let sq = square();
        assert!(near(&sq, 5.0, 5.0, 0.0));
        assert!(!near(&sq, 20.0, 5.0, 0.0));
        assert!(near(&sq, 0.0, 5.0, 0.0));
        assert!(near(&sq, 5.0, 10.0, 0.0));
        assert!(near(&sq, 10.0, 10.0, 0.0));
    }

    #[test]
    fn radius_reaches_edge() {
        let sq = square();
        assert!(near(&sq, -1.0, 5.0, 2.0));
        assert!(!near(&sq, -5.0, 5.0, 2.0));
        assert!(!near(&sq, 20.0, 20.0, 1.0));
    }

    #[test]
    fn exact_tangency_is_inclusive() {
        let sq = square();
        assert!(near(&sq, -2.0, 5.0, 2.0));
        assert!(!near(&sq, -2.01, 5.0, 2.0));
    }

    #[test]
    fn concave_bay() {
        let u = u_shape();
        assert!(!near(&u, 5.0, 8.0, 0.0));
        assert!(near(&u, 5.0, 8.0, 2.1));
        assert!(!near(&u, 5.0, 8.0, 1.9));
    }

    #[test]
    fn sharp_vertex_tip() {
        assert!(near(&triangle(), 10.0, 2.0, 0.0));
    }

    #[test]
    fn negative_radius_acts_as_zero() {
        let sq = square();
        assert!(near(&sq, 5.0, 5.0, -3.0));
        assert!(!near(&sq, -1.0, 5.0, -3.0));
    }

    #[test]
    fn degenerate_polygons() {
        let p = NePoint::new(5.0, 5.0);
        assert_eq!(is_near(&[], p, 0.0), Err(PredicateError::PolygonNull));
        let two = [NePoint::new(0.0, 0.0), NePoint::new(1.0, 1.0)];
        assert_eq!(
            is_near(&two, p, 100.0),
            Err(PredicateError::PolygonTooSmall { vertices: 2 })
        );
        assert_eq!(
            intersects(&two[..1], p, 0.0, -1.0),
            Err(PredicateError::PolygonTooSmall { vertices: 1 })
        );
        assert_eq!(intersects(&[], p, 0.0, 1.0), Err(PredicateError::PolygonNull));
    }

    #[test]
    fn non_positive_length() {
        let sq = square();
        for len in [0.0, -5.0, f32::NAN] {
            let err = intersects(&sq.vertices, NePoint::new(5.0, 5.0), 0.0, len).unwrap_err();
            assert_eq!(err.status(), Status::InvalidLength);
        }
    }

    #[test]
    fn line_crossing_and_missing() {
        let sq = square();
        // From the south, heading north through the square
        assert!(hit(&sq, -5.0, 5.0, 0.0, 20.0));
        // Too short to reach
        assert!(!hit(&sq, -5.0, 5.0, 0.0, 4.0));
        // Heading away
        assert!(!hit(&sq, -5.0, 5.0, 180.0, 20.0));
        // Passing east of the square
        assert!(!hit(&sq, -5.0, 15.0, 0.0, 30.0));
    }

    #[test]
    fn line_touching_vertex_and_edge() {
        let sq = square();
        // Ends exactly on the south edge
        assert!(hit(&sq, -5.0, 5.0, 0.0, 5.0));
        // Runs along the west edge line
        assert!(hit(&sq, -5.0, 0.0, 0.0, 7.0));
        // Ends exactly on the north-east corner
        assert!(hit(&sq, -5.0, 10.0, 0.0, 5.0));
    }

    #[test]
    fn line_starting_inside() {
        assert!(hit(&square(), 5.0, 5.0, 90.0, 1.0));
    }

    #[test]
    fn line_through_concave_bay_misses() {
        // Enters the bay through its open east side without touching the walls
        assert!(!hit(&u_shape(), 5.0, 12.0, 270.0, 8.0));
        // Long enough to reach the bay floor
        assert!(hit(&u_shape(), 5.0, 12.0, 270.0, 10.0));
    }

    #[test]
    fn centroid_of_convex_polygon_is_inside() {
        let hex = Polygon::from_pairs(&[
            (0.0, 2.0),
            (1.7, 1.0),
            (1.7, -1.0),
            (0.0, -2.0),
            (-1.7, -1.0),
            (-1.7, 1.0),
        ]);
        let c = hex.centroid().unwrap();
        assert_eq!(is_near(&hex.vertices, c, 0.0), Ok(true));
    }

    #[test]
    fn centroid_inside_random_convex_polygons() {
        use crate::harness::generator::trial_rng;
        use crate::recorder::TestKind;
        use rand::Rng;
        use std::f64::consts::TAU;

        for i in 0..500 {
            let mut rng = trial_rng(11, TestKind::PointInside, i);
            let n: usize = rng.gen_range(3..=16);
            let sector = TAU / n as f64;
            // One vertex per sector on a circle keeps the polygon convex and fat
            let pairs: Vec<(f32, f32)> = (0..n)
                .map(|k| {
                    let theta = sector * (k as f64 + rng.gen_range(0.1..0.9));
                    let (sin, cos) = theta.sin_cos();
                    ((250.0 * cos) as f32, (250.0 * sin) as f32)
                })
                .collect();
            let poly = Polygon::from_pairs(&pairs);
            let c = poly.centroid().unwrap();
            assert_eq!(is_near(&poly.vertices, c, 0.0), Ok(true), "{pairs:?}");
        }
    }

    #[test]
    fn status_codes_round_trip() {
        for s in [
            Status::Ok,
            Status::PolygonTooSmall,
            Status::PolygonNull,
            Status::InvalidLength,
            Status::InvalidInput,
        ] {
            assert_eq!(Status::from_code(s.code()), Some(s));
        }
        assert_eq!(Status::from_code(9), None);
        assert_eq!(status_of(&Ok(true)), Status::Ok);
        assert_eq!(status_of(&Err(PredicateError::PolygonNull)), Status::PolygonNull);
    }
}
