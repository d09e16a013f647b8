//! Parameters of the proposal pipeline.
//!
//! Defaults follow the common C3D + recurrent-scorer setup: 512-frame
//! receptive field slid by 64 frames, features sampled every 8 frames and
//! pooled into 32 time steps, 64 candidates per window, NMS at IoU 0.7.

use crate::error::{ProposalError, Result};
use crate::features::AggregatorParams;
use crate::pooling::PoolingPolicy;
use crate::segment::NmsParams;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalParams {
    /// Frames covered by one scoring window (the scorer's receptive field).
    pub window_length: usize,
    /// Frames between consecutive window starts.
    pub window_stride: usize,
    /// Time steps the scorer consumes; also the shortest video accepted.
    pub seq_length: usize,
    /// Feature row sampling stride inside a window.
    pub frame_stride: usize,
    /// Frames summarised by one feature row (0 for per-frame features).
    pub feature_resolution: usize,
    pub pooling: PoolingPolicy,
    /// Candidates the scorer returns per window.
    pub num_outputs: usize,
    pub nms: NmsParams,
}

impl Default for ProposalParams {
    fn default() -> Self {
        Self {
            window_length: 512,
            window_stride: 64,
            seq_length: 32,
            frame_stride: 8,
            feature_resolution: 0,
            pooling: PoolingPolicy::default(),
            num_outputs: 64,
            nms: NmsParams::default(),
        }
    }
}

impl ProposalParams {
    /// Rejects zero lengths and strides and a window shorter than one feature.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("window_length", self.window_length),
            ("window_stride", self.window_stride),
            ("seq_length", self.seq_length),
            ("frame_stride", self.frame_stride),
            ("num_outputs", self.num_outputs),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ProposalError::invalid_shape(format!("{name} must be at least 1")));
        }
        if self.window_length <= self.feature_resolution {
            return Err(ProposalError::invalid_shape(format!(
                "window_length {} must exceed feature_resolution {}",
                self.window_length, self.feature_resolution
            )));
        }
        if !self.nms.overlap_threshold.is_finite() {
            return Err(ProposalError::invalid_shape("overlap_threshold must be finite"));
        }
        Ok(())
    }

    pub fn aggregator_params(&self) -> AggregatorParams {
        AggregatorParams {
            frame_stride: self.frame_stride,
            feature_resolution: self.feature_resolution,
            pooling: self.pooling,
        }
    }
}
