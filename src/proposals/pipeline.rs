//! Proposal generator driving one video end-to-end.
//!
//! The run is a map over independent windows followed by a reduce:
//!
//! 1. [`plan_windows`] picks window starts from the video length.
//! 2. The [`WindowedAggregator`] pools each window's features.
//! 3. The [`Scorer`] is called once for the whole batch.
//! 4. [`ProposalGenerator::localize`] maps every window's candidates to
//!    absolute frames (the map phase).
//! 5. [`ProposalGenerator::suppress`] flattens them and runs NMS (the reduce
//!    phase).
//!
//! Any failure aborts the run; no partial proposal set is returned.
//!
//! ```no_run
//! use temporal_proposals::prelude::*;
//!
//! # fn example(store: &InMemoryFeatureStore, scorer: LookupScorer) -> temporal_proposals::Result<()> {
//! let generator = ProposalGenerator::new(ProposalParams::default(), scorer)?;
//! let proposals = generator.generate(store, "video_0001")?;
//! for p in proposals.top(10) {
//!     println!("{} [{}, {}] {:.3}", p.video_id, p.frame_start, p.frame_end, p.score);
//! }
//! # Ok(())
//! # }
//! ```
use super::localize::localize_window;
use super::params::ProposalParams;
use super::planning::{plan_windows, WindowPlan};
use crate::diagnostics::{ProposalReport, ProposalTrace, StageTiming, TimingBreakdown};
use crate::error::{ProposalError, Result};
use crate::features::{FeatureBatch, FeatureStore, WindowedAggregator};
use crate::scorer::Scorer;
use crate::segment::{non_maximum_suppression, NmsScores, SegmentBatch, SegmentRepr};
use crate::types::{Proposal, ProposalSet};
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::time::Instant;

/// Sliding-window proposal generator around a [`Scorer`].
pub struct ProposalGenerator<S> {
    params: ProposalParams,
    aggregator: WindowedAggregator,
    scorer: S,
}

impl<S: Scorer> ProposalGenerator<S> {
    /// Validates `params` and wraps `scorer`.
    pub fn new(params: ProposalParams, scorer: S) -> Result<Self> {
        params.validate()?;
        let aggregator = WindowedAggregator::new(params.aggregator_params());
        Ok(Self {
            params,
            aggregator,
            scorer,
        })
    }

    pub fn params(&self) -> &ProposalParams {
        &self.params
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Reads `video_id` from `store` and returns its ranked proposals.
    pub fn generate<F: FeatureStore + ?Sized>(
        &self,
        store: &F,
        video_id: &str,
    ) -> Result<ProposalSet> {
        self.generate_with_report(store, video_id)
            .map(|report| report.proposals)
    }

    /// Like [`generate`](Self::generate) but also returns the run trace.
    pub fn generate_with_report<F: FeatureStore + ?Sized>(
        &self,
        store: &F,
        video_id: &str,
    ) -> Result<ProposalReport> {
        let read_start = Instant::now();
        let features = store.read(video_id).map_err(ProposalError::Store)?;
        let read_ms = read_start.elapsed().as_secs_f64() * 1000.0;

        let mut report = self.generate_from_features(video_id, &features)?;
        report.trace.timings.stages.insert(
            0,
            StageTiming {
                label: "read".to_string(),
                elapsed_ms: read_ms,
            },
        );
        report.trace.timings.total_ms += read_ms;
        Ok(report)
    }

    /// Runs the pipeline on an already loaded `rows x dim` feature table.
    pub fn generate_from_features(
        &self,
        video_id: &str,
        features: &DMatrix<f32>,
    ) -> Result<ProposalReport> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let video_length = self.aggregator.video_length(features.nrows());
        debug!(
            "ProposalGenerator::generate start video={} rows={} length={}",
            video_id,
            features.nrows(),
            video_length
        );

        let plan = timings.time("plan", || plan_windows(video_length, &self.params))?;
        let batch = timings.time("aggregate", || self.aggregate(features, &plan))?;
        let batch_shape = batch.shape();
        let windows = timings.time("score", || self.localize(&plan, &batch))?;
        let proposals = timings.time("suppress", || self.suppress(video_id, &windows))?;

        let candidates = windows.iter().map(SegmentBatch::len).sum();
        timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "ProposalGenerator::generate done video={} windows={} candidates={} kept={} ms={:.3}",
            video_id,
            plan.len(),
            candidates,
            proposals.len(),
            timings.total_ms
        );

        let kept = proposals.len();
        Ok(ProposalReport {
            proposals,
            trace: ProposalTrace {
                video_id: video_id.to_string(),
                feature_rows: features.nrows(),
                feature_dim: features.ncols(),
                plan,
                batch_shape,
                candidates,
                kept,
                timings,
            },
        })
    }

    /// Pools every planned window, honouring a degraded plan's stride.
    pub fn aggregate(&self, features: &DMatrix<f32>, plan: &WindowPlan) -> Result<FeatureBatch> {
        self.aggregator
            .with_frame_stride(plan.frame_stride)
            .aggregate(features, &plan.starts, plan.receptive_field)
    }

    /// Scores the batch and maps each window's candidates to absolute frames.
    ///
    /// Returns one boundary [`SegmentBatch`] per window, in window order.
    pub fn localize(&self, plan: &WindowPlan, batch: &FeatureBatch) -> Result<Vec<SegmentBatch>> {
        let scored = self.scorer.score(batch).map_err(ProposalError::Scorer)?;
        if scored.len() != plan.len() {
            return Err(ProposalError::invalid_shape(format!(
                "scorer returned {} windows for {} planned",
                scored.len(),
                plan.len()
            )));
        }

        scored
            .iter()
            .zip(&plan.starts)
            .enumerate()
            .map(|(idx, (candidates, &f_init))| {
                if candidates.len() != self.params.num_outputs {
                    return Err(ProposalError::invalid_shape(format!(
                        "window {idx}: scorer returned {} candidates, expected {}",
                        candidates.len(),
                        self.params.num_outputs
                    )));
                }
                localize_window(candidates, f_init, plan.receptive_field)
            })
            .collect()
    }

    /// Flattens per-window candidates and suppresses overlaps.
    pub fn suppress(&self, video_id: &str, windows: &[SegmentBatch]) -> Result<ProposalSet> {
        let merged = SegmentBatch::concat(SegmentRepr::Boundary, windows)?;
        let scores = merged
            .scores()
            .ok_or_else(|| ProposalError::invalid_shape("candidate segments carry no scores"))?;
        let kept =
            non_maximum_suppression(merged.segments(), NmsScores::Given(scores), &self.params.nms)?;

        let proposals = kept
            .segments
            .iter()
            .zip(&kept.scores)
            .map(|(&[frame_start, frame_end], &score)| Proposal {
                video_id: video_id.to_string(),
                frame_start,
                frame_end,
                score,
            })
            .collect();
        Ok(ProposalSet {
            video_id: video_id.to_string(),
            proposals,
        })
    }
}

impl<S: Scorer + Sync> ProposalGenerator<S> {
    /// Runs independent videos in parallel, one pipeline pass each.
    ///
    /// Results come back in `video_ids` order; one video's failure does not
    /// affect the others.
    pub fn generate_many<F, I>(&self, store: &F, video_ids: &[I]) -> Vec<(String, Result<ProposalSet>)>
    where
        F: FeatureStore + Sync + ?Sized,
        I: AsRef<str> + Sync,
    {
        video_ids
            .par_iter()
            .map(|id| {
                let id = id.as_ref();
                (id.to_string(), self.generate(store, id))
            })
            .collect()
    }
}
