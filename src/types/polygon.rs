use super::point::NePoint;

/// Closed polygon in the north/east plane.
///
/// The last vertex implicitly connects back to the first. Winding order is
/// not significant for the predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<NePoint>,
}

impl Polygon {
    pub fn new(vertices: Vec<NePoint>) -> Self {
        Self { vertices }
    }

    /// Build from `(north, east)` pairs.
    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self {
            vertices: pairs.iter().map(|&(n, e)| NePoint::new(n, e)).collect(),
        }
    }

    /// Reinterpret a flat `[n0, e0, n1, e1, ...]` buffer as vertices.
    ///
    /// Returns `None` when the buffer has an odd number of floats.
    pub fn from_flat(flat: &[f32]) -> Option<Self> {
        let vertices: &[NePoint] = bytemuck::try_cast_slice(flat).ok()?;
        Some(Self {
            vertices: vertices.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges as `(from, to)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (NePoint, NePoint)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Vertex average, `None` for an empty polygon.
    pub fn centroid(&self) -> Option<NePoint> {
        if self.vertices.is_empty() {
            return None;
        }
        let (sn, se) = self
            .vertices
            .iter()
            .fold((0.0_f64, 0.0_f64), |(n, e), p| (n + p.north as f64, e + p.east as f64));
        let count = self.vertices.len() as f64;
        Some(NePoint::new((sn / count) as f32, (se / count) as f32))
    }
}

/// Directed segment given in polar form from a start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: NePoint,
    /// Degrees clockwise from north.
    pub azimuth_deg: f32,
    pub length_m: f32,
}

impl LineSegment {
    pub fn new(start: NePoint, azimuth_deg: f32, length_m: f32) -> Self {
        Self {
            start,
            azimuth_deg,
            length_m,
        }
    }

    /// End point in `f64` `(north, east)`.
    ///
    /// Azimuth 0° points north (+north), 90° points east (+east).
    pub fn end_f64(&self) -> (f64, f64) {
        let theta = (self.azimuth_deg as f64).to_radians();
        let len = self.length_m as f64;
        let (n, e) = self.start.to_f64();
        (n + len * theta.cos(), e + len * theta.sin())
    }
}
