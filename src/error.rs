//! Error taxonomy shared by every stage of the proposal pipeline.
//!
//! Errors are raised at the boundary of the operation that detects them and
//! propagate unchanged; nothing in the crate downgrades an error into an empty
//! result. Collaborator failures (feature store, scorer) are opaque and carried
//! through as boxed sources.

use thiserror::Error;

/// Opaque error produced by an external collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ProposalError {
    /// Malformed input table (wrong column count, mismatched lengths, ...).
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("unsupported segment conversion: {0}")]
    UnsupportedConversion(String),

    #[error("unknown pooling type: {0}")]
    UnknownPoolType(String),

    #[error("unknown overlap measure: {0}")]
    UnknownMeasure(String),

    /// More pooling chunks requested than rows available.
    #[error("cannot pool {num_chunks} chunks from {rows} rows")]
    TooManyChunks { num_chunks: usize, rows: usize },

    #[error("empty window at frame {f_init} (length {window_length}, {available} frames available)")]
    EmptyWindow {
        f_init: usize,
        window_length: usize,
        available: usize,
    },

    /// Video shorter than the scorer's minimum span.
    #[error("video too short: {video_length} frames, at least {minimum} required")]
    VideoTooShort { video_length: usize, minimum: usize },

    #[error("feature store error: {0}")]
    Store(#[source] CollaboratorError),

    #[error("scorer error: {0}")]
    Scorer(#[source] CollaboratorError),
}

impl ProposalError {
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        ProposalError::InvalidShape(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ProposalError>;
