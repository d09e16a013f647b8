#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod proposals;
pub mod types;

// Building blocks – public for tools and custom pipelines.
pub mod config;
pub mod features;
pub mod io;
pub mod pooling;
pub mod scorer;
pub mod segment;

// --- High-level re-exports -------------------------------------------------

// Main entry points: generator + results.
pub use crate::error::{ProposalError, Result};
pub use crate::proposals::{ProposalGenerator, ProposalParams};
pub use crate::types::{Proposal, ProposalSet};

// Collaborator contracts.
pub use crate::features::FeatureStore;
pub use crate::scorer::Scorer;

// Run diagnostics returned by the generator.
pub use crate::diagnostics::{ProposalReport, ProposalTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use temporal_proposals::prelude::*;
/// use nalgebra::DMatrix;
///
/// # fn main() -> temporal_proposals::Result<()> {
/// let store = InMemoryFeatureStore::new()
///     .with_video("v1", DMatrix::from_element(600, 500, 0.0f32));
/// let scorer = |batch: &FeatureBatch| -> ScorerOutput {
///     Ok((0..batch.len())
///         .map(|_| WindowCandidates::from_pairs(&[[0.5, 0.5]; 64], vec![0.5; 64]))
///         .collect::<temporal_proposals::Result<Vec<_>>>()?)
/// };
///
/// let generator = ProposalGenerator::new(ProposalParams::default(), scorer)?;
/// let report = generator.generate_with_report(&store, "v1")?;
/// println!("kept={} windows={}", report.proposals.len(), report.trace.plan.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::features::{FeatureBatch, InMemoryFeatureStore, JsonFeatureStore};
    pub use crate::scorer::{LookupScorer, ScorerOutput, WindowCandidates};
    pub use crate::segment::{NmsParams, OverlapMeasure, SegmentRepr};
    pub use crate::{FeatureStore, ProposalGenerator, ProposalParams, ProposalSet, Scorer};
}
