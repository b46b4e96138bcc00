/// Cross products smaller than this (m²) count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-7;

/// A 2-D point in `f64` `(north, east)` metres.
pub type Pt = (f64, f64);

/// Turn direction of the ordered triple `(p, q, r)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Orientation of `(p, q, r)` in the north/east plane.
pub fn orientation(p: Pt, q: Pt, r: Pt) -> Orientation {
    let val = (q.1 - p.1) * (r.0 - q.0) - (q.0 - p.0) * (r.1 - q.1);
    if val.abs() <= COLLINEAR_EPSILON {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies within the bounding box of segment `p`–`r`.
///
/// Only meaningful once `p`, `q`, `r` are known to be collinear.
pub fn on_segment(p: Pt, q: Pt, r: Pt) -> bool {
    q.0 <= p.0.max(r.0) && q.0 >= p.0.min(r.0) && q.1 <= p.1.max(r.1) && q.1 >= p.1.min(r.1)
}

/// Whether segments `p1`–`q1` and `p2`–`q2` share at least one point.
///
/// Touching endpoints and collinear overlap both count.
pub fn segments_intersect(p1: Pt, q1: Pt, p2: Pt, q2: Pt) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    // General case: each segment straddles the other's line
    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

fn dist_sq(a: Pt, b: Pt) -> f64 {
    let dn = a.0 - b.0;
    let de = a.1 - b.1;
    dn * dn + de * de
}

/// Squared distance from `p` to the closest point of segment `a`–`b`.
pub fn dist_to_segment_sq(p: Pt, a: Pt, b: Pt) -> f64 {
    let len_sq = dist_sq(a, b);
    if len_sq == 0.0 {
        return dist_sq(p, a);
    }

    // Projection parameter along a→b, clamped to the segment
    let t = (((p.0 - a.0) * (b.0 - a.0) + (p.1 - a.1) * (b.1 - a.1)) / len_sq).clamp(0.0, 1.0);
    let proj = (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
    dist_sq(p, proj)
}
