use bytemuck::{Pod, Zeroable};
use glam::DVec3;

/// Geodetic position on the WGS84 ellipsoid.
///
/// Layout is fixed (`3 × f64`, lat/lon/alt) because the struct crosses the
/// C ABI unchanged.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Height above the ellipsoid in metres; may be negative.
    pub altitude_m: f64,
}

impl GeoPoint {
    pub const fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite() && self.altitude_m.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.latitude_deg, self.longitude_deg, self.altitude_m]
    }
}

/// Local tangent-plane position relative to an [`Origin`], in metres.
///
/// Right-handed: north, east, and down (positive toward the Earth's centre).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct NedPoint {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

impl NedPoint {
    pub const fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    pub fn is_finite(&self) -> bool {
        self.north.is_finite() && self.east.is_finite() && self.down.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.north, self.east, self.down]
    }

    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.north, self.east, self.down)
    }

    pub fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Earth-Centred Earth-Fixed Cartesian position in metres.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct EcefPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EcefPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// 2-D point in the north/east plane used by the polygon predicates.
///
/// Stored as two tightly packed `f32` to match the C ABI; all geometry is
/// evaluated in `f64`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct NePoint {
    pub north: f32,
    pub east: f32,
}

impl NePoint {
    pub const fn new(north: f32, east: f32) -> Self {
        Self { north, east }
    }

    /// Promote to `(north, east)` in `f64`.
    pub fn to_f64(self) -> (f64, f64) {
        (self.north as f64, self.east as f64)
    }
}

/// Reference datum of a NED frame.
///
/// Altitude defaults to 0 m (on the ellipsoid) unless given explicitly with
/// [`Origin::with_altitude`]; the vertical reference of the tangent plane is
/// the origin's ellipsoidal height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Origin {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Origin {
    /// Origin on the ellipsoid surface (altitude 0 m).
    pub const fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m: 0.0,
        }
    }

    pub const fn with_altitude(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn as_geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude_deg, self.longitude_deg, self.altitude_m)
    }
}
