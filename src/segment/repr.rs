//! Segment representations and the closed-form conversions between them.
//!
//! A segment table is an `n x 2` matrix. Which convention its two columns
//! follow is not stored in the data, so callers pass it explicitly (or wrap the
//! table in a [`SegmentBatch`](super::SegmentBatch)).
use crate::error::{ProposalError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate convention of a two-column segment table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRepr {
    /// `(center, duration)`
    CenterDuration,
    /// `(start, end)`, both inclusive.
    Boundary,
    /// `(start, length)`
    DurationBoundary,
}

impl SegmentRepr {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentRepr::CenterDuration => "center_duration",
            SegmentRepr::Boundary => "boundary",
            SegmentRepr::DurationBoundary => "duration_boundary",
        }
    }
}

impl fmt::Display for SegmentRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentRepr {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center_duration" | "c" => Ok(SegmentRepr::CenterDuration),
            "boundary" | "b" => Ok(SegmentRepr::Boundary),
            "duration_boundary" | "d" => Ok(SegmentRepr::DurationBoundary),
            other => Err(ProposalError::UnsupportedConversion(format!(
                "unknown segment representation `{other}`"
            ))),
        }
    }
}

/// Parses a short conversion code such as `"c2b"`, `"b2c"` or `"d2b"`.
pub fn parse_conversion(code: &str) -> Result<(SegmentRepr, SegmentRepr)> {
    let unsupported = || ProposalError::UnsupportedConversion(format!("`{code}`"));
    let (from, to) = code.trim().split_once('2').ok_or_else(unsupported)?;
    let from = from.parse::<SegmentRepr>().map_err(|_| unsupported())?;
    let to = to.parse::<SegmentRepr>().map_err(|_| unsupported())?;
    Ok((from, to))
}

/// Fails with `InvalidShape` unless `table` has exactly two columns.
pub(crate) fn ensure_pairs(table: &DMatrix<f64>, name: &str) -> Result<()> {
    if table.ncols() != 2 {
        return Err(ProposalError::invalid_shape(format!(
            "{name} must have 2 columns, got {}x{}",
            table.nrows(),
            table.ncols()
        )));
    }
    Ok(())
}

/// Builds an `n x 2` table from row pairs.
pub fn segments_from_pairs(pairs: &[[f64; 2]]) -> DMatrix<f64> {
    DMatrix::from_fn(pairs.len(), 2, |r, c| pairs[r][c])
}

/// Reads an `n x 2` table back into row pairs.
pub fn segment_pairs(table: &DMatrix<f64>) -> Vec<[f64; 2]> {
    table.row_iter().map(|row| [row[0], row[1]]).collect()
}

fn center_to_boundary(center: f64, duration: f64) -> [f64; 2] {
    let start = (center - 0.5 * duration).ceil();
    [start, start + duration - 1.0]
}

/// Midpoints ending in `.5` round up so `center_to_boundary` recovers `start`.
fn boundary_to_center(start: f64, end: f64) -> [f64; 2] {
    [(0.5 * (start + end) + 0.5).floor(), end - start + 1.0]
}

fn duration_to_boundary(start: f64, length: f64) -> [f64; 2] {
    [start, start + length - 1.0]
}

/// Converts every row of `segments` from one representation to another.
///
/// Supported directions are `center_duration -> boundary`,
/// `boundary -> center_duration` and `duration_boundary -> boundary`; converting
/// a table into its own representation returns a copy. The input is never
/// modified.
pub fn convert(
    segments: &DMatrix<f64>,
    from: SegmentRepr,
    to: SegmentRepr,
) -> Result<DMatrix<f64>> {
    ensure_pairs(segments, "segments")?;
    if from == to {
        return Ok(segments.clone());
    }
    let map: fn(f64, f64) -> [f64; 2] = match (from, to) {
        (SegmentRepr::CenterDuration, SegmentRepr::Boundary) => center_to_boundary,
        (SegmentRepr::Boundary, SegmentRepr::CenterDuration) => boundary_to_center,
        (SegmentRepr::DurationBoundary, SegmentRepr::Boundary) => duration_to_boundary,
        _ => {
            return Err(ProposalError::UnsupportedConversion(format!(
                "{from} -> {to}"
            )))
        }
    };

    let mut out = DMatrix::zeros(segments.nrows(), 2);
    for (r, row) in segments.row_iter().enumerate() {
        let [a, b] = map(row[0], row[1]);
        out[(r, 0)] = a;
        out[(r, 1)] = b;
    }
    Ok(out)
}
