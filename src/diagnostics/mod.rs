//! Structured trace of a proposal run.
//!
//! [`ProposalGenerator::generate_with_report`](crate::ProposalGenerator) returns
//! the final [`ProposalSet`] together with a [`ProposalTrace`] describing the
//! window plan, candidate counts and per-phase timings. Everything serializes
//! to camelCase JSON for tooling.

pub mod timing;

pub use timing::{StageTiming, TimingBreakdown};

use crate::proposals::WindowPlan;
use crate::types::ProposalSet;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReport {
    pub proposals: ProposalSet,
    pub trace: ProposalTrace,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTrace {
    pub video_id: String,
    pub feature_rows: usize,
    pub feature_dim: usize,
    pub plan: WindowPlan,
    /// `(windows, rows, dim)` of the batch handed to the scorer.
    pub batch_shape: (usize, usize, usize),
    /// Candidates entering suppression.
    pub candidates: usize,
    /// Proposals surviving suppression.
    pub kept: usize,
    pub timings: TimingBreakdown,
}

impl ProposalTrace {
    /// True when the video was shorter than one receptive field and a single
    /// adjusted-stride window was used.
    pub fn degraded(&self) -> bool {
        self.plan.degraded
    }
}
