use std::path::PathBuf;

use clap::Parser;

use crate::error::{NedkitError, Result};
use crate::recorder::TestKind;
use crate::types::Origin;

/// Where random transform inputs are drawn from, relative to the origin.
#[derive(Debug, Clone)]
pub struct SamplingDomain {
    /// Half-width of the latitude/longitude box around the origin, degrees.
    pub geo_radius_deg: f64,
    pub altitude_min_m: f64,
    pub altitude_max_m: f64,
    /// Half-width of the north/east box for NED inputs, metres.
    pub ned_radius_m: f64,
    /// Half-width of the down range for NED inputs, metres.
    pub ned_vertical_m: f64,
}

impl Default for SamplingDomain {
    fn default() -> Self {
        Self {
            geo_radius_deg: 1.0,
            altitude_min_m: -100.0,
            altitude_max_m: 1000.0,
            ned_radius_m: 5000.0,
            ned_vertical_m: 500.0,
        }
    }
}

/// Random polygon and query parameters for the predicate trials.
#[derive(Debug, Clone)]
pub struct PolygonDomain {
    pub min_vertices: usize,
    pub max_vertices: usize,
    pub min_radius_m: f64,
    pub max_radius_m: f64,
    /// Upper bound of the disc radius used by `point_inside` trials.
    pub max_disc_radius_m: f64,
}

impl Default for PolygonDomain {
    fn default() -> Self {
        Self {
            min_vertices: 3,
            max_vertices: 12,
            min_radius_m: 50.0,
            max_radius_m: 500.0,
            max_disc_radius_m: 50.0,
        }
    }
}

/// Pass/fail thresholds.
#[derive(Debug, Clone)]
pub struct Tolerances {
    /// Cartesian outputs (NED and ECEF), metres.
    pub position_m: f64,
    /// Latitude and longitude, degrees.
    pub angle_deg: f64,
    pub altitude_m: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            position_m: 0.05,
            angle_deg: 1e-6,
            altitude_m: 0.05,
        }
    }
}

/// Fully resolved harness configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub seed: u64,
    pub trials: usize,
    pub kinds: Vec<TestKind>,
    pub origin: Origin,
    pub sampling: SamplingDomain,
    pub polygon: PolygonDomain,
    pub tolerances: Tolerances,
    /// Share of predicate trials given a degenerate polygon or length.
    pub degenerate_ratio: f64,
    pub parallel: bool,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub replay: Option<PathBuf>,
    pub log_json: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            trials: 1000,
            kinds: TestKind::ALL.to_vec(),
            origin: Origin::new(32.0, 34.0),
            sampling: SamplingDomain::default(),
            polygon: PolygonDomain::default(),
            tolerances: Tolerances::default(),
            degenerate_ratio: 0.05,
            parallel: true,
            output: None,
            summary: None,
            replay: None,
            log_json: false,
            verbose: false,
            threads: None,
        }
    }
}

impl HarnessConfig {
    /// Reject settings the generator cannot sample from.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(NedkitError::Config(msg));

        let o = &self.origin;
        if !(o.latitude_deg.is_finite() && o.longitude_deg.is_finite() && o.altitude_m.is_finite())
        {
            return fail(format!("origin must be finite, got {o:?}"));
        }
        if !(-90.0..=90.0).contains(&o.latitude_deg) {
            return fail(format!("origin latitude {} outside [-90, 90]", o.latitude_deg));
        }

        let s = &self.sampling;
        for (name, half_width) in [
            ("geo radius", s.geo_radius_deg),
            ("NED radius", s.ned_radius_m),
            ("NED vertical range", s.ned_vertical_m),
        ] {
            if !(half_width >= 0.0 && finite_span(-half_width, half_width)) {
                return fail(format!("{name} {half_width} must be finite and non-negative"));
            }
        }
        if !(s.altitude_min_m <= s.altitude_max_m && finite_span(s.altitude_min_m, s.altitude_max_m))
        {
            return fail(format!(
                "altitude range [{}, {}] must be finite and non-empty",
                s.altitude_min_m, s.altitude_max_m
            ));
        }

        let p = &self.polygon;
        if p.min_vertices < 3 || p.min_vertices > p.max_vertices {
            return fail(format!(
                "polygon vertex range [{}, {}] must start at 3 or more",
                p.min_vertices, p.max_vertices
            ));
        }
        if p.max_vertices > u16::MAX as usize {
            return fail(format!("at most {} polygon vertices", u16::MAX));
        }
        // Segment starts and lengths are drawn up to 3x the polygon radius
        if !(p.min_radius_m > 0.0
            && p.min_radius_m <= p.max_radius_m
            && finite_span(-3.0 * p.max_radius_m, 3.0 * p.max_radius_m))
        {
            return fail(format!(
                "polygon radius range [{}, {}] is invalid",
                p.min_radius_m, p.max_radius_m
            ));
        }
        if !(p.max_disc_radius_m >= 0.0 && p.max_disc_radius_m.is_finite()) {
            return fail(format!(
                "disc radius {} must be finite and non-negative",
                p.max_disc_radius_m
            ));
        }

        let t = &self.tolerances;
        for (name, limit) in [
            ("position tolerance", t.position_m),
            ("angle tolerance", t.angle_deg),
            ("altitude tolerance", t.altitude_m),
        ] {
            if !(limit >= 0.0 && limit.is_finite()) {
                return fail(format!("{name} {limit} must be finite and non-negative"));
            }
        }

        if !(0.0..=1.0).contains(&self.degenerate_ratio) {
            return fail(format!(
                "degenerate ratio {} outside [0, 1]",
                self.degenerate_ratio
            ));
        }
        if self.kinds.is_empty() {
            return fail("no test kinds selected".into());
        }
        Ok(())
    }
}

/// Whether `[low, high]` can be sampled: both ends and the width finite.
fn finite_span(low: f64, high: f64) -> bool {
    low.is_finite() && high.is_finite() && (high - low).is_finite()
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "nedkit",
    about = "Differential validation of WGS84/NED transforms and polygon predicates",
    version
)]
pub struct CliArgs {
    /// Trials per test kind
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub trials: usize,

    /// Run seed; every trial derives its own generator from it
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Test kinds to run (repeatable, default: all)
    #[arg(long = "kind", value_enum)]
    pub kinds: Vec<TestKind>,

    /// Origin latitude in degrees
    #[arg(long, default_value_t = 32.0, allow_negative_numbers = true)]
    pub origin_lat: f64,

    /// Origin longitude in degrees
    #[arg(long, default_value_t = 34.0, allow_negative_numbers = true)]
    pub origin_lon: f64,

    /// Origin altitude in metres
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub origin_alt: f64,

    /// Half-width of the geodetic sampling box in degrees
    #[arg(long, default_value_t = 1.0)]
    pub geo_radius: f64,

    /// Half-width of the NED horizontal sampling box in metres
    #[arg(long, default_value_t = 5000.0)]
    pub ned_radius: f64,

    /// Share of predicate trials with degenerate input (0-1)
    #[arg(long, default_value_t = 0.05)]
    pub degenerate_ratio: f64,

    /// Cartesian tolerance in metres
    #[arg(long, default_value_t = 0.05)]
    pub position_tolerance: f64,

    /// Latitude/longitude tolerance in degrees
    #[arg(long, default_value_t = 1e-6)]
    pub angle_tolerance: f64,

    /// Run trials on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Record file (default: stdout)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Summarize an existing record file instead of running trials
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for HarnessConfig {
    fn from(args: CliArgs) -> Self {
        let kinds = if args.kinds.is_empty() {
            TestKind::ALL.to_vec()
        } else {
            let mut kinds = args.kinds;
            kinds.sort();
            kinds.dedup();
            kinds
        };

        HarnessConfig {
            seed: args.seed,
            trials: args.trials,
            kinds,
            origin: Origin::with_altitude(args.origin_lat, args.origin_lon, args.origin_alt),
            sampling: SamplingDomain {
                geo_radius_deg: args.geo_radius,
                ned_radius_m: args.ned_radius,
                ..SamplingDomain::default()
            },
            polygon: PolygonDomain::default(),
            tolerances: Tolerances {
                position_m: args.position_tolerance,
                angle_deg: args.angle_tolerance,
                altitude_m: args.position_tolerance,
            },
            degenerate_ratio: args.degenerate_ratio,
            parallel: !args.sequential,
            output: args.output,
            summary: args.summary,
            replay: args.replay,
            log_json: args.log_json,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
