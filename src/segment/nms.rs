//! Greedy temporal non-maximum suppression.
//!
//! Candidates are visited from the highest score down. Each visited candidate
//! is accepted and every remaining candidate whose overlap with it exceeds the
//! threshold is dropped. Segments with `end <= start` never enter the pool.
use super::overlap::{intersection_length, segment_length};
use super::repr::ensure_pairs;
use crate::error::{ProposalError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How overlap between an accepted segment and a candidate is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OverlapMeasure {
    /// Symmetric intersection over union.
    #[default]
    Iou,
    /// Intersection over the candidate's own length (asymmetric).
    Overlap,
}

impl FromStr for OverlapMeasure {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iou" => Ok(OverlapMeasure::Iou),
            "overlap" => Ok(OverlapMeasure::Overlap),
            other => Err(ProposalError::UnknownMeasure(other.to_string())),
        }
    }
}

impl TryFrom<String> for OverlapMeasure {
    type Error = ProposalError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OverlapMeasure> for String {
    fn from(value: OverlapMeasure) -> Self {
        value.to_string()
    }
}

impl fmt::Display for OverlapMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapMeasure::Iou => f.write_str("iou"),
            OverlapMeasure::Overlap => f.write_str("overlap"),
        }
    }
}

/// Suppression knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsParams {
    /// Candidates overlapping an accepted segment by more than this are dropped.
    pub overlap_threshold: f64,
    pub measure: OverlapMeasure,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.7,
            measure: OverlapMeasure::Iou,
        }
    }
}

/// Where suppression takes candidate scores from.
#[derive(Clone, Copy, Debug)]
pub enum NmsScores<'a> {
    /// One score per segment row.
    Given(&'a [f64]),
    /// Legacy fallback: rank each segment by its `end` coordinate.
    ///
    /// Kept for compatibility with older callers that never passed scores;
    /// it ranks later segments higher regardless of confidence.
    EndCoordinate,
}

/// Output of [`non_maximum_suppression`], in selection order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Suppressed {
    /// Kept `(start, end)` boundaries rounded to whole frames.
    pub segments: Vec<[i64; 2]>,
    pub scores: Vec<f64>,
    /// Row index of each kept segment in the input table.
    pub indices: Vec<usize>,
}

impl Suppressed {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Greedy NMS over a boundary-represented segment table.
///
/// Ties in score keep their input order (the later row is visited first).
pub fn non_maximum_suppression(
    segments: &DMatrix<f64>,
    scores: NmsScores<'_>,
    params: &NmsParams,
) -> Result<Suppressed> {
    ensure_pairs(segments, "segments")?;
    let n = segments.nrows();
    let scores: Vec<f64> = match scores {
        NmsScores::Given(scores) => {
            if scores.len() != n {
                return Err(ProposalError::invalid_shape(format!(
                    "{} scores for {} segments",
                    scores.len(),
                    n
                )));
            }
            scores.to_vec()
        }
        NmsScores::EndCoordinate => segments.column(1).iter().copied().collect(),
    };

    let bounds = |i: usize| [segments[(i, 0)], segments[(i, 1)]];

    let mut pool: Vec<usize> = (0..n)
        .filter(|&i| segments[(i, 1)] > segments[(i, 0)])
        .collect();
    pool.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut kept = Suppressed::default();
    while let Some(best) = pool.pop() {
        let accepted = bounds(best);
        let accepted_len = segment_length(accepted[0], accepted[1]);
        kept.indices.push(best);
        kept.segments
            .push([accepted[0].round() as i64, accepted[1].round() as i64]);
        kept.scores.push(scores[best]);

        pool.retain(|&j| {
            let candidate = bounds(j);
            let inter = intersection_length(accepted, candidate);
            let candidate_len = segment_length(candidate[0], candidate[1]);
            let overlap = match params.measure {
                OverlapMeasure::Overlap => inter / candidate_len,
                OverlapMeasure::Iou => inter / (accepted_len + candidate_len - inter),
            };
            !(overlap > params.overlap_threshold)
        });
    }

    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segments_from_pairs;

    fn boxes() -> DMatrix<f64> {
        segments_from_pairs(&[
            [10.0, 13.0],
            [7.0, 11.0],
            [5.0, 7.0],
            [11.0, 12.0],
            [9.0, 15.0],
        ])
    }

    fn params(overlap_threshold: f64, measure: OverlapMeasure) -> NmsParams {
        NmsParams {
            overlap_threshold,
            measure,
        }
    }

    #[test]
    fn end_coordinate_scores_with_iou() {
        let out = non_maximum_suppression(
            &boxes(),
            NmsScores::EndCoordinate,
            &params(0.5, OverlapMeasure::Iou),
        )
        .unwrap();
        assert_eq!(out.indices, vec![4, 3, 1, 2]);
        assert_eq!(out.segments, vec![[9, 15], [11, 12], [7, 11], [5, 7]]);
        assert_eq!(out.scores, vec![15.0, 12.0, 11.0, 7.0]);
    }

    #[test]
    fn end_coordinate_scores_with_overlap() {
        let out = non_maximum_suppression(
            &boxes(),
            NmsScores::EndCoordinate,
            &params(0.7, OverlapMeasure::Overlap),
        )
        .unwrap();
        assert_eq!(out.indices, vec![4, 1, 2]);
    }

    #[test]
    fn given_scores() {
        let scores = [4.0, 3.0, 2.0, 1.0, 0.0];
        let by_iou = non_maximum_suppression(
            &boxes(),
            NmsScores::Given(&scores),
            &params(0.5, OverlapMeasure::Iou),
        )
        .unwrap();
        assert_eq!(by_iou.indices, vec![0, 1, 2, 3]);

        let by_overlap = non_maximum_suppression(
            &boxes(),
            NmsScores::Given(&scores),
            &params(0.7, OverlapMeasure::Overlap),
        )
        .unwrap();
        assert_eq!(by_overlap.indices, vec![0, 1, 2, 4]);
    }

    #[test]
    fn threshold_one_keeps_everything_in_score_order() {
        let out = non_maximum_suppression(
            &boxes(),
            NmsScores::EndCoordinate,
            &params(1.0, OverlapMeasure::Iou),
        )
        .unwrap();
        assert_eq!(out.indices, vec![4, 0, 3, 1, 2]);
    }

    #[test]
    fn threshold_zero_keeps_single_best_of_overlapping_group() {
        let segs = segments_from_pairs(&[[0.0, 10.0], [5.0, 20.0], [8.0, 9.0]]);
        let scores = [0.2, 0.9, 0.5];
        let out = non_maximum_suppression(
            &segs,
            NmsScores::Given(&scores),
            &params(0.0, OverlapMeasure::Iou),
        )
        .unwrap();
        assert_eq!(out.indices, vec![1]);
        assert_eq!(out.scores, vec![0.9]);
    }

    #[test]
    fn threshold_zero_keeps_disjoint_segments() {
        // zero overlap never exceeds a zero threshold
        let segs = segments_from_pairs(&[[0.0, 10.0], [20.0, 30.0]]);
        let scores = [0.9, 0.4];
        for measure in [OverlapMeasure::Iou, OverlapMeasure::Overlap] {
            let out =
                non_maximum_suppression(&segs, NmsScores::Given(&scores), &params(0.0, measure))
                    .unwrap();
            assert_eq!(out.indices, vec![0, 1]);
            assert_eq!(out.segments, vec![[0, 10], [20, 30]]);
        }
    }

    #[test]
    fn degenerate_segments_are_never_reported() {
        let segs = segments_from_pairs(&[[5.0, 5.0], [9.0, 3.0], [1.0, 4.0]]);
        let scores = [10.0, 9.0, 0.1];
        let out = non_maximum_suppression(&segs, NmsScores::Given(&scores), &NmsParams::default())
            .unwrap();
        assert_eq!(out.indices, vec![2]);
    }

    #[test]
    fn rejects_score_length_mismatch() {
        let scores = [1.0, 2.0];
        let err = non_maximum_suppression(&boxes(), NmsScores::Given(&scores), &NmsParams::default())
            .unwrap_err();
        assert!(matches!(err, ProposalError::InvalidShape(_)));
    }

    #[test]
    fn parses_measures() {
        assert_eq!("IoU".parse::<OverlapMeasure>().unwrap(), OverlapMeasure::Iou);
        assert_eq!(
            "overlap".parse::<OverlapMeasure>().unwrap(),
            OverlapMeasure::Overlap
        );
        assert!(matches!(
            "dice".parse::<OverlapMeasure>(),
            Err(ProposalError::UnknownMeasure(_))
        ));
    }

    #[test]
    fn params_deserialize_measure_strings() {
        let p: NmsParams =
            serde_json::from_str(r#"{"overlap_threshold": 0.5, "measure": "overlap"}"#).unwrap();
        assert_eq!(p.measure, OverlapMeasure::Overlap);
        assert!(serde_json::from_str::<NmsParams>(r#"{"measure": "dice"}"#).is_err());
    }
}
