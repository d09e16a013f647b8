use super::repr::{convert, ensure_pairs, SegmentRepr};
use crate::error::{ProposalError, Result};
use nalgebra::DMatrix;

/// Segment table tagged with its representation and optional per-row scores.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentBatch {
    repr: SegmentRepr,
    segments: DMatrix<f64>,
    scores: Option<Vec<f64>>,
}

impl SegmentBatch {
    pub fn new(repr: SegmentRepr, segments: DMatrix<f64>) -> Result<Self> {
        ensure_pairs(&segments, "segment batch")?;
        Ok(Self {
            repr,
            segments,
            scores: None,
        })
    }

    /// Attaches one score per segment row.
    pub fn with_scores(mut self, scores: Vec<f64>) -> Result<Self> {
        if scores.len() != self.segments.nrows() {
            return Err(ProposalError::invalid_shape(format!(
                "{} scores for {} segments",
                scores.len(),
                self.segments.nrows()
            )));
        }
        self.scores = Some(scores);
        Ok(self)
    }

    pub fn repr(&self) -> SegmentRepr {
        self.repr
    }

    pub fn segments(&self) -> &DMatrix<f64> {
        &self.segments
    }

    pub fn scores(&self) -> Option<&[f64]> {
        self.scores.as_deref()
    }

    pub fn len(&self) -> usize {
        self.segments.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.nrows() == 0
    }

    /// Returns a new batch in representation `to`; scores are carried over.
    pub fn convert(&self, to: SegmentRepr) -> Result<Self> {
        Ok(Self {
            repr: to,
            segments: convert(&self.segments, self.repr, to)?,
            scores: self.scores.clone(),
        })
    }

    /// Adds `offset` to both columns. Only meaningful for boundary tables.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            repr: self.repr,
            segments: self.segments.add_scalar(offset),
            scores: self.scores.clone(),
        }
    }

    /// Flattens batches into one, preserving batch order then row order.
    ///
    /// All batches must share a representation and either all carry scores or
    /// none do.
    pub fn concat(repr: SegmentRepr, batches: &[SegmentBatch]) -> Result<Self> {
        let total: usize = batches.iter().map(SegmentBatch::len).sum();
        let scored = batches.first().map_or(true, |b| b.scores.is_some());

        let mut segments = DMatrix::zeros(total, 2);
        let mut scores = Vec::with_capacity(if scored { total } else { 0 });
        let mut row = 0;
        for batch in batches {
            if batch.repr != repr {
                return Err(ProposalError::invalid_shape(format!(
                    "cannot merge {} segments into a {} batch",
                    batch.repr, repr
                )));
            }
            match (&batch.scores, scored) {
                (Some(s), true) => scores.extend_from_slice(s),
                (None, false) => {}
                _ => {
                    return Err(ProposalError::invalid_shape(
                        "cannot merge scored and unscored segment batches",
                    ))
                }
            }
            segments
                .rows_mut(row, batch.len())
                .copy_from(&batch.segments);
            row += batch.len();
        }

        Ok(Self {
            repr,
            segments,
            scores: scored.then_some(scores),
        })
    }
}
