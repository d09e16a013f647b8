//! Pairwise overlap measures between boundary-represented segment tables.
//!
//! Both functions expect `target` to be the short table (ground truth or the
//! accepted detections) and `test` the long one; the outer loop runs over
//! targets so each pass touches one contiguous column of `test`.
use super::repr::ensure_pairs;
use crate::error::Result;
use nalgebra::DMatrix;

/// Number of frames covered by an inclusive `(start, end)` segment.
#[inline]
pub fn segment_length(start: f64, end: f64) -> f64 {
    end - start + 1.0
}

/// Length of the intersection of two inclusive segments, clipped at zero.
#[inline]
pub fn intersection_length(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[1].min(b[1]) - a[0].max(b[0]) + 1.0).max(0.0)
}

/// Intersection intervals between every target/test pair.
///
/// Intervals are stored even when empty; an empty intersection shows up as
/// `end < start`.
#[derive(Clone, Debug)]
pub struct Intersection {
    /// `[m, n]` interval starts.
    pub start: DMatrix<f64>,
    /// `[m, n]` interval ends.
    pub end: DMatrix<f64>,
    /// `[m, n]` intersection length over target length, when requested.
    pub ratio: Option<DMatrix<f64>>,
}

impl Intersection {
    pub fn interval(&self, target: usize, test: usize) -> [f64; 2] {
        [self.start[(target, test)], self.end[(target, test)]]
    }

    pub fn is_empty(&self, target: usize, test: usize) -> bool {
        self.end[(target, test)] < self.start[(target, test)]
    }

    pub fn shape(&self) -> (usize, usize) {
        self.start.shape()
    }
}

/// Computes `[max(starts), min(ends)]` for every target/test pair.
///
/// With `want_ratio`, also returns the clipped intersection length divided by
/// the target's length.
pub fn intersection(
    target: &DMatrix<f64>,
    test: &DMatrix<f64>,
    want_ratio: bool,
) -> Result<Intersection> {
    ensure_pairs(target, "target segments")?;
    ensure_pairs(test, "test segments")?;
    let (m, n) = (target.nrows(), test.nrows());

    let mut start = DMatrix::zeros(m, n);
    let mut end = DMatrix::zeros(m, n);
    let mut ratio = want_ratio.then(|| DMatrix::zeros(m, n));

    for i in 0..m {
        let (t0, t1) = (target[(i, 0)], target[(i, 1)]);
        let target_len = segment_length(t0, t1);
        for j in 0..n {
            let lo = t0.max(test[(j, 0)]);
            let hi = t1.min(test[(j, 1)]);
            start[(i, j)] = lo;
            end[(i, j)] = hi;
            if let Some(ratio) = ratio.as_mut() {
                ratio[(i, j)] = (hi - lo + 1.0).max(0.0) / target_len;
            }
        }
    }

    Ok(Intersection { start, end, ratio })
}

/// Temporal intersection-over-union for every target/test pair.
///
/// Precondition: every segment has length >= 1 (`end >= start`). Degenerate
/// inputs can divide by zero and yield non-finite values.
pub fn iou(target: &DMatrix<f64>, test: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    ensure_pairs(target, "target segments")?;
    ensure_pairs(test, "test segments")?;
    let (m, n) = (target.nrows(), test.nrows());

    let mut out = DMatrix::zeros(m, n);
    for i in 0..m {
        let t = [target[(i, 0)], target[(i, 1)]];
        let target_len = segment_length(t[0], t[1]);
        for j in 0..n {
            let s = [test[(j, 0)], test[(j, 1)]];
            let inter = intersection_length(t, s);
            let union = segment_length(s[0], s[1]) + target_len - inter;
            out[(i, j)] = inter / union;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProposalError;
    use crate::segment::segments_from_pairs;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn intersection_intervals() {
        let target = segments_from_pairs(&[[5.0, 15.0]]);
        let test = segments_from_pairs(&[[1.0, 10.0], [5.0, 20.0], [16.0, 25.0]]);
        let out = intersection(&target, &test, false).unwrap();
        assert_eq!(out.shape(), (1, 3));
        assert_eq!(out.interval(0, 0), [5.0, 10.0]);
        assert_eq!(out.interval(0, 1), [5.0, 15.0]);
        assert_eq!(out.interval(0, 2), [16.0, 15.0]);
        assert!(out.is_empty(0, 2));
        assert!(out.ratio.is_none());
    }

    #[test]
    fn intersection_ratio_over_target() {
        let target = segments_from_pairs(&[[5.0, 15.0]]);
        let test = segments_from_pairs(&[[1.0, 10.0], [16.0, 25.0]]);
        let out = intersection(&target, &test, true).unwrap();
        let ratio = out.ratio.unwrap();
        assert_eq!(ratio.shape(), (1, 2));
        assert!(approx_eq(ratio[(0, 0)], 6.0 / 11.0));
        assert_eq!(ratio[(0, 1)], 0.0);
    }

    #[test]
    fn intersection_rejects_bad_shape() {
        let target = DMatrix::<f64>::zeros(1, 1);
        let test = segments_from_pairs(&[[1.0, 10.0]]);
        assert!(matches!(
            intersection(&target, &test, false),
            Err(ProposalError::InvalidShape(_))
        ));
    }

    #[test]
    fn iou_reference_values() {
        let a = segments_from_pairs(&[[1.0, 10.0], [5.0, 20.0], [16.0, 25.0]]);
        let b = segments_from_pairs(&[[1.0, 10.0], [1.0, 30.0], [10.0, 20.0], [20.0, 30.0]]);
        let rst = iou(&a, &b).unwrap();
        assert_eq!(rst.shape(), (3, 4));
        // equal
        assert_eq!(rst[(0, 0)], 1.0);
        // disjoint
        assert_eq!(rst[(0, 3)], 0.0);
        // contained
        assert!(approx_eq(rst[(2, 1)], 10.0 / 30.0));
        // partial, to the left
        assert!(approx_eq(rst[(2, 2)], 5.0 / 16.0));
        // partial, to the right
        assert!(approx_eq(rst[(2, 3)], 6.0 / 15.0));
    }

    #[test]
    fn iou_rejects_bad_shape() {
        let a = segments_from_pairs(&[[1.0, 10.0]]);
        let b = DMatrix::<f64>::zeros(4, 1);
        assert!(matches!(iou(&a, &b), Err(ProposalError::InvalidShape(_))));
    }
}
