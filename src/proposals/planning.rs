use super::params::ProposalParams;
use crate::error::{ProposalError, Result};
use log::{debug, warn};
use serde::Serialize;

/// Window starts covering one video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPlan {
    pub video_length: usize,
    /// Absolute start frame of every window, ascending.
    pub starts: Vec<usize>,
    /// Frames covered by each window; the localisation scale.
    pub receptive_field: usize,
    /// Feature sampling stride used inside each window.
    pub frame_stride: usize,
    /// Set when the video was shorter than `window_length`.
    pub degraded: bool,
}

impl WindowPlan {
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Plans windows `0, S, 2S, ...` with `start + W <= video_length`.
///
/// Videos shorter than `seq_length` are rejected. Videos at least that long
/// but shorter than one window get a single window spanning the whole video,
/// with the sampling stride reduced so roughly `seq_length` feature rows are
/// sampled; this degradation is logged at warn level and flagged on the plan.
pub fn plan_windows(video_length: usize, params: &ProposalParams) -> Result<WindowPlan> {
    if video_length < params.seq_length {
        return Err(ProposalError::VideoTooShort {
            video_length,
            minimum: params.seq_length,
        });
    }

    if video_length < params.window_length {
        let rows = video_length.saturating_sub(params.feature_resolution);
        let frame_stride = rows / params.seq_length;
        if frame_stride == 0 {
            return Err(ProposalError::VideoTooShort {
                video_length,
                minimum: params.seq_length + params.feature_resolution,
            });
        }
        warn!(
            "video length {} < window length {}: using one window with frame stride {}",
            video_length, params.window_length, frame_stride
        );
        return Ok(WindowPlan {
            video_length,
            starts: vec![0],
            receptive_field: video_length,
            frame_stride,
            degraded: true,
        });
    }

    let starts: Vec<usize> = (0..=video_length - params.window_length)
        .step_by(params.window_stride)
        .collect();
    debug!(
        "plan_windows length={} windows={} window_length={} stride={}",
        video_length,
        starts.len(),
        params.window_length,
        params.window_stride
    );
    Ok(WindowPlan {
        video_length,
        starts,
        receptive_field: params.window_length,
        frame_stride: params.frame_stride,
        degraded: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(window_length: usize, window_stride: usize, seq_length: usize) -> ProposalParams {
        ProposalParams {
            window_length,
            window_stride,
            seq_length,
            ..Default::default()
        }
    }

    #[test]
    fn windows_fit_inside_video() {
        let plan = plan_windows(600, &params(512, 64, 32)).unwrap();
        assert_eq!(plan.starts, vec![0, 64]);
        assert_eq!(plan.receptive_field, 512);
        assert_eq!(plan.frame_stride, 8);
        assert!(!plan.degraded);

        let plan = plan_windows(512, &params(512, 64, 32)).unwrap();
        assert_eq!(plan.starts, vec![0]);

        let plan = plan_windows(1000, &params(100, 300, 32)).unwrap();
        assert_eq!(plan.starts, vec![0, 300, 600, 900]);
    }

    #[test]
    fn short_video_degrades_to_single_window() {
        let plan = plan_windows(300, &params(512, 64, 32)).unwrap();
        assert!(plan.degraded);
        assert_eq!(plan.starts, vec![0]);
        assert_eq!(plan.receptive_field, 300);
        assert_eq!(plan.frame_stride, 9);
    }

    #[test]
    fn video_shorter_than_sequence_is_rejected() {
        assert!(matches!(
            plan_windows(31, &params(512, 64, 32)),
            Err(ProposalError::VideoTooShort {
                video_length: 31,
                minimum: 32
            })
        ));
    }

    #[test]
    fn degraded_stride_of_zero_is_rejected() {
        let p = ProposalParams {
            feature_resolution: 16,
            ..params(512, 64, 32)
        };
        assert!(matches!(
            plan_windows(40, &p),
            Err(ProposalError::VideoTooShort { minimum: 48, .. })
        ));
    }
}
