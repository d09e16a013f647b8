//! Windowed feature aggregation.
//!
//! A feature row `i` summarises frames `[i, i + feature_resolution)`, so a
//! video with `rows` feature rows spans `rows + feature_resolution` frames.
//! The window `[f_init, f_init + window_length)` samples rows
//! `f_init, f_init + stride, ...` strictly below
//! `f_init + window_length - feature_resolution` and pools them with the
//! configured [`PoolingPolicy`]. With dense per-frame features
//! (`feature_resolution = 0`) the sampled rows are exactly the window's frames.
use super::store::FeatureStore;
use crate::error::{ProposalError, Result};
use crate::pooling::PoolingPolicy;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Sampling and pooling shared by every window of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregatorParams {
    /// Row step inside a window (>= 1).
    pub frame_stride: usize,
    /// Frames covered by one feature row.
    pub feature_resolution: usize,
    pub pooling: PoolingPolicy,
}

impl Default for AggregatorParams {
    fn default() -> Self {
        Self {
            frame_stride: 8,
            feature_resolution: 0,
            pooling: PoolingPolicy::default(),
        }
    }
}

/// Pooled windows of one video, stacked in window order.
///
/// Every window has the same `rows x dim` shape.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureBatch {
    windows: Vec<DMatrix<f32>>,
}

impl FeatureBatch {
    pub fn new(windows: Vec<DMatrix<f32>>) -> Result<Self> {
        if let Some(first) = windows.first() {
            let shape = first.shape();
            if let Some((idx, other)) = windows
                .iter()
                .enumerate()
                .find(|(_, w)| w.shape() != shape)
            {
                return Err(ProposalError::invalid_shape(format!(
                    "window {idx} pooled to {:?}, window 0 to {:?}",
                    other.shape(),
                    shape
                )));
            }
        }
        Ok(Self { windows })
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// `(num_windows, rows_per_window, feature_dim)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (rows, dim) = self.windows.first().map_or((0, 0), |w| w.shape());
        (self.windows.len(), rows, dim)
    }

    pub fn window(&self, index: usize) -> Option<&DMatrix<f32>> {
        self.windows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DMatrix<f32>> {
        self.windows.iter()
    }
}

/// Turns window start offsets into pooled feature windows.
#[derive(Clone, Debug)]
pub struct WindowedAggregator {
    params: AggregatorParams,
}

impl WindowedAggregator {
    pub fn new(params: AggregatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AggregatorParams {
        &self.params
    }

    /// Same aggregator with a different sampling stride.
    pub fn with_frame_stride(&self, frame_stride: usize) -> Self {
        Self {
            params: AggregatorParams {
                frame_stride,
                ..self.params
            },
        }
    }

    /// Frames spanned by a feature table with `rows` rows.
    pub fn video_length(&self, rows: usize) -> usize {
        rows + self.params.feature_resolution
    }

    /// Row indices sampled for `[f_init, f_init + window_length)`.
    pub fn sampled_rows(
        &self,
        rows: usize,
        f_init: usize,
        window_length: usize,
    ) -> Result<Vec<usize>> {
        if self.params.frame_stride == 0 {
            return Err(ProposalError::invalid_shape("frame_stride must be at least 1"));
        }
        let available = self.video_length(rows);
        let end = (f_init + window_length).saturating_sub(self.params.feature_resolution);
        if f_init + window_length > available || end <= f_init {
            return Err(ProposalError::EmptyWindow {
                f_init,
                window_length,
                available,
            });
        }
        Ok((f_init..end).step_by(self.params.frame_stride).collect())
    }

    /// Rows a window of `window_length` frames pools to.
    pub fn output_rows(&self, window_length: usize) -> usize {
        let span = window_length.saturating_sub(self.params.feature_resolution);
        let sampled = span.div_ceil(self.params.frame_stride.max(1));
        self.params.pooling.output_rows(sampled)
    }

    /// Samples and pools a single window.
    pub fn pool_window(
        &self,
        features: &DMatrix<f32>,
        f_init: usize,
        window_length: usize,
    ) -> Result<DMatrix<f32>> {
        let indices = self.sampled_rows(features.nrows(), f_init, window_length)?;
        let sampled = features.select_rows(indices.iter());
        self.params.pooling.apply(&sampled)
    }

    /// Pools every window in `starts`, in order.
    ///
    /// Windows are independent, so they are pooled on the rayon pool and
    /// gathered back in start order.
    pub fn aggregate(
        &self,
        features: &DMatrix<f32>,
        starts: &[usize],
        window_length: usize,
    ) -> Result<FeatureBatch> {
        debug!(
            "WindowedAggregator::aggregate rows={} windows={} length={} stride={} pooling={}",
            features.nrows(),
            starts.len(),
            window_length,
            self.params.frame_stride,
            self.params.pooling
        );
        let windows = starts
            .par_iter()
            .map(|&f_init| self.pool_window(features, f_init, window_length))
            .collect::<Result<Vec<_>>>()?;
        FeatureBatch::new(windows)
    }

    /// Reads `video_id` once from `store` and pools every window.
    pub fn aggregate_from_store<S: FeatureStore + ?Sized>(
        &self,
        store: &S,
        video_id: &str,
        starts: &[usize],
        window_length: usize,
    ) -> Result<FeatureBatch> {
        let features = store.read(video_id).map_err(ProposalError::Store)?;
        self.aggregate(&features, starts, window_length)
    }
}
