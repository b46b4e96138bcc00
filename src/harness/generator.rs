//! Seedable trial input generation.
//!
//! Every trial owns a generator derived from `(run seed, kind, index)`, so a
//! trial's draws never depend on which other trials ran or on thread
//! scheduling.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::HarnessConfig;
use crate::recorder::TestKind;
use crate::transform::{ecef::geodetic_to_ecef, fold_lat_lon};
use crate::types::{EcefPoint, GeoPoint, LineSegment, NePoint, NedPoint, Origin, Polygon};

/// One generated input, ready to hand to both engines.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialInput {
    GeoToNed { origin: Origin, point: GeoPoint },
    NedToGeo { origin: Origin, point: NedPoint },
    Wgs84Conv(GeoPoint),
    Wgs84Inv(EcefPoint),
    GeoRoundtrip { origin: Origin, point: GeoPoint },
    PointInside {
        polygon: Polygon,
        point: NePoint,
        radius: f32,
    },
    LineIntersect {
        polygon: Polygon,
        segment: LineSegment,
    },
}

impl TrialInput {
    pub fn kind(&self) -> TestKind {
        match self {
            TrialInput::GeoToNed { .. } => TestKind::GeoToNed,
            TrialInput::NedToGeo { .. } => TestKind::NedToGeo,
            TrialInput::Wgs84Conv(_) => TestKind::Wgs84Conv,
            TrialInput::Wgs84Inv(_) => TestKind::Wgs84Inv,
            TrialInput::GeoRoundtrip { .. } => TestKind::GeoRoundtrip,
            TrialInput::PointInside { .. } => TestKind::PointInside,
            TrialInput::LineIntersect { .. } => TestKind::LineIntersect,
        }
    }

    /// Flatten for the record's input field.
    ///
    /// Transform inputs are the 3 point components. Predicate inputs are
    /// the query parameters followed by the polygon's vertices as
    /// north/east pairs.
    pub fn to_vector(&self) -> Vec<f64> {
        match self {
            TrialInput::GeoToNed { point, .. }
            | TrialInput::GeoRoundtrip { point, .. }
            | TrialInput::Wgs84Conv(point) => point.to_array().to_vec(),
            TrialInput::NedToGeo { point, .. } => point.to_array().to_vec(),
            TrialInput::Wgs84Inv(point) => point.to_array().to_vec(),
            TrialInput::PointInside {
                polygon,
                point,
                radius,
            } => {
                let mut v = vec![point.north as f64, point.east as f64, *radius as f64];
                push_vertices(&mut v, polygon);
                v
            }
            TrialInput::LineIntersect { polygon, segment } => {
                let mut v = vec![
                    segment.start.north as f64,
                    segment.start.east as f64,
                    segment.azimuth_deg as f64,
                    segment.length_m as f64,
                ];
                push_vertices(&mut v, polygon);
                v
            }
        }
    }
}

fn push_vertices(out: &mut Vec<f64>, polygon: &Polygon) {
    for vertex in &polygon.vertices {
        out.push(vertex.north as f64);
        out.push(vertex.east as f64);
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for trial `index` of `kind` in a run seeded with `seed`.
pub fn trial_rng(seed: u64, kind: TestKind, index: u64) -> StdRng {
    let stream = splitmix64(seed ^ splitmix64(kind as u64 + 1));
    StdRng::seed_from_u64(splitmix64(stream.wrapping_add(index)))
}

/// Draw one input of `kind` from the configured domain.
pub fn draw(kind: TestKind, config: &HarnessConfig, rng: &mut StdRng) -> TrialInput {
    let origin = config.origin;
    match kind {
        TestKind::GeoToNed => TrialInput::GeoToNed {
            origin,
            point: geo_near_origin(config, rng),
        },
        TestKind::NedToGeo => TrialInput::NedToGeo {
            origin,
            point: ned_near_origin(config, rng),
        },
        TestKind::Wgs84Conv => TrialInput::Wgs84Conv(geo_near_origin(config, rng)),
        TestKind::Wgs84Inv => TrialInput::Wgs84Inv(geodetic_to_ecef(&geo_near_origin(config, rng))),
        TestKind::GeoRoundtrip => TrialInput::GeoRoundtrip {
            origin,
            point: geo_near_origin(config, rng),
        },
        TestKind::PointInside => point_inside(config, rng),
        TestKind::LineIntersect => line_intersect(config, rng),
    }
}

fn symmetric(rng: &mut StdRng, half_width: f64) -> f64 {
    rng.gen_range(-half_width..=half_width)
}

fn geo_near_origin(config: &HarnessConfig, rng: &mut StdRng) -> GeoPoint {
    let s = &config.sampling;
    // Overshooting the pole reflects onto the far meridian
    let (lat, lon) = fold_lat_lon(
        config.origin.latitude_deg + symmetric(rng, s.geo_radius_deg),
        config.origin.longitude_deg + symmetric(rng, s.geo_radius_deg),
    );
    let alt = rng.gen_range(s.altitude_min_m..=s.altitude_max_m);
    GeoPoint::new(lat, lon, alt)
}

fn ned_near_origin(config: &HarnessConfig, rng: &mut StdRng) -> NedPoint {
    let s = &config.sampling;
    NedPoint::new(
        symmetric(rng, s.ned_radius_m),
        symmetric(rng, s.ned_radius_m),
        symmetric(rng, s.ned_vertical_m),
    )
}

/// Star-shaped polygon around the local origin: sorted angles with random
/// radii always give a simple polygon, convex or not.
fn star_polygon(config: &HarnessConfig, rng: &mut StdRng) -> Polygon {
    let p = &config.polygon;
    let n = rng.gen_range(p.min_vertices..=p.max_vertices);

    let mut angles: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..TAU)).collect();
    angles.sort_by(f64::total_cmp);

    let vertices = angles
        .into_iter()
        .map(|theta| {
            let r = rng.gen_range(p.min_radius_m..=p.max_radius_m);
            let (sin, cos) = theta.sin_cos();
            NePoint::new((r * cos) as f32, (r * sin) as f32)
        })
        .collect();
    Polygon::new(vertices)
}

fn inject_degenerate(config: &HarnessConfig, rng: &mut StdRng) -> bool {
    config.degenerate_ratio > 0.0 && rng.gen_bool(config.degenerate_ratio)
}

/// Cut the polygon down to 0, 1 or 2 vertices.
fn degrade(polygon: &mut Polygon, rng: &mut StdRng) {
    let keep = rng.gen_range(0..=2);
    polygon.vertices.truncate(keep);
}

fn point_inside(config: &HarnessConfig, rng: &mut StdRng) -> TrialInput {
    let mut polygon = star_polygon(config, rng);
    if inject_degenerate(config, rng) {
        degrade(&mut polygon, rng);
    }

    let reach = 1.5 * config.polygon.max_radius_m;
    let point = NePoint::new(symmetric(rng, reach) as f32, symmetric(rng, reach) as f32);
    let radius = rng.gen_range(0.0..=config.polygon.max_disc_radius_m) as f32;
    TrialInput::PointInside {
        polygon,
        point,
        radius,
    }
}

fn line_intersect(config: &HarnessConfig, rng: &mut StdRng) -> TrialInput {
    let mut polygon = star_polygon(config, rng);
    let reach = 2.0 * config.polygon.max_radius_m;
    let start = NePoint::new(symmetric(rng, reach) as f32, symmetric(rng, reach) as f32);
    let azimuth = rng.gen_range(0.0..360.0) as f32;
    let mut length = rng.gen_range(1.0..=1.5 * reach) as f32;

    if inject_degenerate(config, rng) {
        if rng.gen_bool(0.5) {
            degrade(&mut polygon, rng);
        } else {
            // Zero or negative length
            length = -(rng.gen_range(0.0..=reach) as f32).floor();
        }
    }

    TrialInput::LineIntersect {
        polygon,
        segment: LineSegment::new(start, azimuth, length),
    }
}
