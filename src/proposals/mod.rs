//! Sliding-window proposal generation.
//!
//! - [`params`]: tunables with JSON defaults.
//! - [`planning`]: window starts for a video length, including the
//!   single-window fallback for short videos.
//! - [`localize`]: window-relative candidates to absolute frames.
//! - [`pipeline`]: the [`ProposalGenerator`] orchestrating a full run.
pub mod localize;
pub mod params;
pub mod pipeline;
pub mod planning;

pub use localize::localize_window;
pub use params::ProposalParams;
pub use pipeline::ProposalGenerator;
pub use planning::{plan_windows, WindowPlan};
