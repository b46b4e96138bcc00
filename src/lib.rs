pub mod config;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod harness;
pub mod recorder;
pub mod transform;
pub mod types;

pub use config::{HarnessConfig, PolygonDomain, SamplingDomain, Tolerances};
pub use error::{NedkitError, Result};
pub use geometry::{PredicateError, PredicateResult, Status, intersects, is_near};
pub use harness::DifferentialHarness;
pub use harness::engine::{GeoEngine, NativeEngine};
pub use harness::oracle::ReferenceOracle;
pub use harness::summary::HarnessSummary;
pub use recorder::{ResultRecorder, TestKind, TrialRecord};
pub use transform::{ecef_to_geo, geo_to_ecef, geo_to_ned, ned_to_geo};
