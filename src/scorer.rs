//! Scorer collaborator contract.
//!
//! A scorer maps a batch of pooled windows to, per window, `num_outputs`
//! candidate segments in `(center, duration)` form normalized to the window
//! span, plus one confidence per candidate. Any type with a matching `score`
//! method works, including plain closures; [`LookupScorer`] replays
//! precomputed outputs.
use crate::error::{CollaboratorError, ProposalError, Result};
use crate::features::FeatureBatch;
use crate::segment::repr::ensure_pairs;
use crate::segment::{segment_pairs, segments_from_pairs};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Candidates produced for one window, index-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCandidates {
    /// `num_outputs x 2` normalized `(center, duration)` pairs.
    pub locations: DMatrix<f64>,
    pub scores: Vec<f64>,
}

impl WindowCandidates {
    pub fn new(locations: DMatrix<f64>, scores: Vec<f64>) -> Result<Self> {
        ensure_pairs(&locations, "candidate locations")?;
        if locations.nrows() != scores.len() {
            return Err(ProposalError::invalid_shape(format!(
                "{} candidate locations with {} scores",
                locations.nrows(),
                scores.len()
            )));
        }
        Ok(Self { locations, scores })
    }

    pub fn from_pairs(locations: &[[f64; 2]], scores: Vec<f64>) -> Result<Self> {
        Self::new(segments_from_pairs(locations), scores)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// What a [`Scorer`] returns for one batch.
pub type ScorerOutput = std::result::Result<Vec<WindowCandidates>, CollaboratorError>;

/// Scores pooled windows. Must be deterministic and free of side effects.
pub trait Scorer {
    /// Returns one [`WindowCandidates`] per window of `batch`, in order.
    fn score(&self, batch: &FeatureBatch) -> ScorerOutput;
}

impl<F> Scorer for F
where
    F: Fn(&FeatureBatch) -> ScorerOutput,
{
    fn score(&self, batch: &FeatureBatch) -> ScorerOutput {
        self(batch)
    }
}

/// Serialized form of [`WindowCandidates`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub locations: Vec<[f64; 2]>,
    pub scores: Vec<f64>,
}

impl From<&WindowCandidates> for CandidateRecord {
    fn from(value: &WindowCandidates) -> Self {
        Self {
            locations: segment_pairs(&value.locations),
            scores: value.scores.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup scorer holds {available} windows, batch has {requested}")]
    WindowCountMismatch { available: usize, requested: usize },
}

/// Replays a fixed list of per-window candidates.
///
/// Useful for offline evaluation against outputs exported from a trained
/// model, and for tests.
#[derive(Clone, Debug, Default)]
pub struct LookupScorer {
    windows: Vec<WindowCandidates>,
}

impl LookupScorer {
    pub fn new(windows: Vec<WindowCandidates>) -> Self {
        Self { windows }
    }

    pub fn from_records(records: Vec<CandidateRecord>) -> Result<Self> {
        let windows = records
            .into_iter()
            .map(|r| WindowCandidates::from_pairs(&r.locations, r.scores))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { windows })
    }

    /// Loads a JSON array of `{ "locations": [[c, d], ...], "scores": [...] }`.
    pub fn load(path: &Path) -> std::result::Result<Self, String> {
        let data = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scores {}: {e}", path.display()))?;
        let records: Vec<CandidateRecord> = serde_json::from_str(&data)
            .map_err(|e| format!("Failed to parse scores {}: {e}", path.display()))?;
        Self::from_records(records)
            .map_err(|e| format!("Invalid scores {}: {e}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Scorer for LookupScorer {
    fn score(&self, batch: &FeatureBatch) -> ScorerOutput {
        if batch.len() != self.windows.len() {
            return Err(LookupError::WindowCountMismatch {
                available: self.windows.len(),
                requested: batch.len(),
            }
            .into());
        }
        Ok(self.windows.clone())
    }
}
