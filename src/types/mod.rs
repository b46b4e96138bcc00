pub mod point;
pub mod polygon;

pub use point::{EcefPoint, GeoPoint, NePoint, NedPoint, Origin};
pub use polygon::{LineSegment, Polygon};
