//! Line-oriented trial records.
//!
//! One record per line, pipe-delimited:
//!
//! ```text
//! name|testKind|inputVector|expectedVector|actualVector|passFlag
//! ```
//!
//! Vectors are comma-separated decimals; `NULL` marks a missing value and
//! the pass flag is `1` or `0`. Readers skip kinds they do not know.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NedkitError, Result};

const NULL_FIELD: &str = "NULL";

/// Kind of differential trial.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    #[value(name = "geo_to_ned")]
    GeoToNed,
    #[value(name = "ned_to_geo")]
    NedToGeo,
    #[value(name = "wgs84_conv")]
    Wgs84Conv,
    #[value(name = "wgs84_inv")]
    Wgs84Inv,
    #[value(name = "geo_roundtrip")]
    GeoRoundtrip,
    #[value(name = "point_inside")]
    PointInside,
    #[value(name = "line_intersect")]
    LineIntersect,
}

impl TestKind {
    pub const ALL: [TestKind; 7] = [
        TestKind::GeoToNed,
        TestKind::NedToGeo,
        TestKind::Wgs84Conv,
        TestKind::Wgs84Inv,
        TestKind::GeoRoundtrip,
        TestKind::PointInside,
        TestKind::LineIntersect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TestKind::GeoToNed => "geo_to_ned",
            TestKind::NedToGeo => "ned_to_geo",
            TestKind::Wgs84Conv => "wgs84_conv",
            TestKind::Wgs84Inv => "wgs84_inv",
            TestKind::GeoRoundtrip => "geo_roundtrip",
            TestKind::PointInside => "point_inside",
            TestKind::LineIntersect => "line_intersect",
        }
    }

    /// Whether the output is a boolean predicate verdict.
    pub fn is_predicate(self) -> bool {
        matches!(self, TestKind::PointInside | TestKind::LineIntersect)
    }

    /// Whether the output is a geodetic `[lat, lon, alt]` vector.
    pub fn has_geodetic_output(self) -> bool {
        matches!(
            self,
            TestKind::NedToGeo | TestKind::Wgs84Inv | TestKind::GeoRoundtrip
        )
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = NedkitError;

    fn from_str(s: &str) -> Result<Self> {
        TestKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| NedkitError::Record(format!("unknown test kind '{s}'")))
    }
}

/// One trial's inputs, expected and actual outputs, and verdict.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    name: String,
    kind: TestKind,
    input: Vec<f64>,
    expected: Option<Vec<f64>>,
    actual: Option<Vec<f64>>,
    passed: bool,
}

impl TrialRecord {
    /// Build a record. Delimiters in `name` are replaced with `_`.
    pub fn new(
        name: impl Into<String>,
        kind: TestKind,
        input: Vec<f64>,
        expected: Option<Vec<f64>>,
        actual: Option<Vec<f64>>,
        passed: bool,
    ) -> Self {
        let name = name
            .into()
            .replace(['|', '\n', '\r'], "_");
        Self {
            name,
            kind,
            input,
            expected,
            actual,
            passed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn expected(&self) -> Option<&[f64]> {
        self.expected.as_deref()
    }

    pub fn actual(&self) -> Option<&[f64]> {
        self.actual.as_deref()
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Serialize to a single record line (no trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.name,
            self.kind,
            join_vector(&self.input),
            self.expected.as_deref().map_or_else(|| NULL_FIELD.to_string(), join_vector),
            self.actual.as_deref().map_or_else(|| NULL_FIELD.to_string(), join_vector),
            if self.passed { "1" } else { "0" },
        )
    }
}

fn join_vector(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_vector(field: &str) -> Result<Option<Vec<f64>>> {
    let field = field.trim();
    if field == NULL_FIELD {
        return Ok(None);
    }
    if field.is_empty() {
        return Ok(Some(Vec::new()));
    }
    field
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|e| NedkitError::Record(format!("bad number '{s}': {e}")))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Parse one record line.
///
/// Returns `Ok(None)` for blank lines and for unknown test kinds.
pub fn parse_line(line: &str) -> Result<Option<TrialRecord>> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 6 {
        return Err(NedkitError::Record(format!(
            "expected 6 fields, found {}: '{line}'",
            fields.len()
        )));
    }

    let Ok(kind) = fields[1].trim().parse::<TestKind>() else {
        debug!(kind = fields[1], "Skipping record with unknown test kind");
        return Ok(None);
    };

    let passed = match fields[5].trim() {
        "1" => true,
        "0" => false,
        other => {
            return Err(NedkitError::Record(format!("bad pass flag '{other}'")));
        }
    };

    Ok(Some(TrialRecord::new(
        fields[0],
        kind,
        parse_vector(fields[2])?.unwrap_or_default(),
        parse_vector(fields[3])?,
        parse_vector(fields[4])?,
        passed,
    )))
}

/// Read every known record from a line stream.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<TrialRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        if let Some(record) = parse_line(&line?)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Appends records to an output stream in emission order.
pub struct ResultRecorder<W: Write> {
    writer: W,
    written: usize,
}

impl ResultRecorder<BufWriter<File>> {
    /// Create (truncate) a record file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            NedkitError::Record(format!("Failed to create {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ResultRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn record(&mut self, record: &TrialRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_line())?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrialRecord {
        TrialRecord::new(
            "geo_to_ned#0001",
            TestKind::GeoToNed,
            vec![32.01, 34.01, 50.0],
            Some(vec![1108.9, 944.8, -49.8]),
            Some(vec![1108.9, 944.8, -49.8]),
            true,
        )
    }

    #[test]
    fn line_format() {
        assert_eq!(
            sample().to_line(),
            "geo_to_ned#0001|geo_to_ned|32.01,34.01,50|1108.9,944.8,-49.8|1108.9,944.8,-49.8|1"
        );
    }

    #[test]
    fn missing_vectors_are_null() {
        let r = TrialRecord::new("x", TestKind::NedToGeo, vec![], None, None, false);
        assert_eq!(r.to_line(), "x|ned_to_geo||NULL|NULL|0");
        let back = parse_line(&r.to_line()).unwrap().unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn parse_preserves_full_precision() {
        let r = TrialRecord::new(
            "p",
            TestKind::Wgs84Inv,
            vec![0.1 + 0.2, -1e-300, 6_378_137.123_456_789],
            Some(vec![f64::MAX]),
            Some(vec![1.0 / 3.0]),
            true,
        );
        assert_eq!(parse_line(&r.to_line()).unwrap().unwrap(), r);
    }

    #[test]
    fn delimiters_in_name_are_replaced() {
        let r = TrialRecord::new("a|b\nc", TestKind::PointInside, vec![], None, None, true);
        assert_eq!(r.name(), "a_b_c");
    }

    #[test]
    fn unknown_kind_and_blank_lines_are_skipped() {
        assert!(parse_line("t|future_kind|1,2,3|NULL|NULL|1").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_line("only|three|fields").is_err());
        assert!(parse_line("t|geo_to_ned|1,x,3|NULL|NULL|1").is_err());
        assert!(parse_line("t|geo_to_ned|1,2,3|NULL|NULL|yes").is_err());
    }

    #[test]
    fn recorder_writes_in_order() {
        let mut rec = ResultRecorder::new(Vec::new());
        rec.record(&sample()).unwrap();
        let second = TrialRecord::new("n2", TestKind::LineIntersect, vec![1.0], None, None, false);
        rec.record(&second).unwrap();
        assert_eq!(rec.written(), 2);

        let bytes = rec.into_inner();
        let records = read_records(bytes.as_slice()).unwrap();
        assert_eq!(records, vec![sample(), second]);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in TestKind::ALL {
            assert_eq!(kind.as_str().parse::<TestKind>().unwrap(), kind);
        }
        assert!("nope".parse::<TestKind>().is_err());
    }
}
