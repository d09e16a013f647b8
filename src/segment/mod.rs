//! Temporal segment algebra.
//!
//! - [`repr`]: the three two-column conventions and conversions between them.
//! - [`overlap`]: pairwise intersection and temporal IoU.
//! - [`nms`]: greedy non-maximum suppression over scored segments.
//! - [`SegmentBatch`]: a table tagged with its representation and scores.
//!
//! Everything here is a pure function of its inputs; tables are
//! `nalgebra::DMatrix<f64>` with exactly two columns and are never mutated in
//! place.

mod batch;
pub mod nms;
pub mod overlap;
pub mod repr;

pub use batch::SegmentBatch;
pub use nms::{non_maximum_suppression, NmsParams, NmsScores, OverlapMeasure, Suppressed};
pub use overlap::{intersection, iou, Intersection};
pub use repr::{convert, parse_conversion, segment_pairs, segments_from_pairs, SegmentRepr};
