//! Feature access and per-window aggregation.
//!
//! - [`store`]: the [`FeatureStore`] collaborator contract plus in-memory and
//!   JSON-backed implementations.
//! - [`aggregator`]: samples each window's rows and pools them into a
//!   [`FeatureBatch`] ready for scoring.

pub mod aggregator;
pub mod store;

pub use aggregator::{AggregatorParams, FeatureBatch, WindowedAggregator};
pub use store::{
    features_from_rows, FeatureStore, InMemoryFeatureStore, JsonFeatureStore, StoreError,
};
