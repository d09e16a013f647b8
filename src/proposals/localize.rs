use crate::error::Result;
use crate::scorer::WindowCandidates;
use crate::segment::{SegmentBatch, SegmentRepr};

/// Maps one window's normalized candidates to absolute boundary segments.
///
/// Centre and duration are clipped to `[0, 1]` and scaled by
/// `receptive_field`, converted to inclusive `(start, end)` bounds, truncated
/// to whole frames and clamped to the window before adding `f_init`. Candidates
/// that collapse to `end <= start` are kept here and discarded by suppression.
pub fn localize_window(
    candidates: &WindowCandidates,
    f_init: usize,
    receptive_field: usize,
) -> Result<SegmentBatch> {
    let scale = receptive_field as f64;
    let last_frame = scale - 1.0;

    let local = candidates.locations.map(|v| v.clamp(0.0, 1.0) * scale);
    let boundary = SegmentBatch::new(SegmentRepr::CenterDuration, local)?
        .convert(SegmentRepr::Boundary)?;

    let mut segments = boundary.segments().map(f64::trunc);
    for mut row in segments.row_iter_mut() {
        row[0] = row[0].clamp(0.0, last_frame);
        row[1] = row[1].min(last_frame);
    }

    Ok(SegmentBatch::new(SegmentRepr::Boundary, segments)?
        .with_scores(candidates.scores.clone())?
        .shifted(f_init as f64))
}
