//! Fixed-size temporal pooling of variable-length feature sequences.
//!
//! [`pool_chunks`] splits `m` ordered rows into `n` contiguous chunks with
//! boundaries at `round(k / n * m)` and reduces each chunk to one row.
//! [`PoolingPolicy`] is the configuration-facing wrapper that the window
//! aggregator applies to every sampled window:
//!
//! | policy string       | output rows |
//! |---------------------|-------------|
//! | `""` / `"none"`     | all sampled rows |
//! | `"mean"`, `"max"`   | 1 |
//! | `"concat-n-mean"`   | `n` (per-chunk L2-normalized) |
use crate::error::{ProposalError, Result};
use nalgebra::{DMatrix, DVector, RowDVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Reduction applied over the rows of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    Mean,
    Max,
}

impl FromStr for PoolType {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(PoolType::Mean),
            "max" => Ok(PoolType::Max),
            other => Err(ProposalError::UnknownPoolType(other.to_string())),
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Mean => f.write_str("mean"),
            PoolType::Max => f.write_str("max"),
        }
    }
}

/// Chunk boundaries `round(cumsum(1/n) * m)`, ties rounded to even.
fn chunk_edges(rows: usize, num_chunks: usize) -> Vec<usize> {
    let step = 1.0 / num_chunks as f64;
    let mut edges = Vec::with_capacity(num_chunks + 1);
    edges.push(0);
    let mut acc = 0.0f64;
    for _ in 0..num_chunks {
        acc += step;
        let edge = (acc * rows as f64).round_ties_even() as usize;
        edges.push(edge.min(rows));
    }
    edges
}

fn reduce_rows(features: &DMatrix<f32>, rows: Range<usize>, pool_type: PoolType) -> RowDVector<f32> {
    let block = features.rows(rows.start, rows.len());
    let count = rows.len() as f32;
    RowDVector::from_iterator(
        features.ncols(),
        block.column_iter().map(|col| match pool_type {
            PoolType::Mean => col.sum() / count,
            PoolType::Max => col.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        }),
    )
}

/// Pools `features` (`m x d`) into `num_chunks x d`.
///
/// With `normalize_each`, every pooled row is divided by its L2 norm (a zero
/// norm is treated as one). With `normalize_total`, the result is additionally
/// divided by `num_chunks`.
pub fn pool_chunks(
    features: &DMatrix<f32>,
    num_chunks: usize,
    pool_type: PoolType,
    normalize_each: bool,
    normalize_total: bool,
) -> Result<DMatrix<f32>> {
    let (rows, dim) = features.shape();
    if num_chunks == 0 {
        return Err(ProposalError::invalid_shape("num_chunks must be at least 1"));
    }
    if num_chunks > rows {
        return Err(ProposalError::TooManyChunks { num_chunks, rows });
    }

    let edges = chunk_edges(rows, num_chunks);
    let mut pooled = DMatrix::zeros(num_chunks, dim);
    for (j, bounds) in edges.windows(2).enumerate() {
        if bounds[1] <= bounds[0] {
            return Err(ProposalError::TooManyChunks { num_chunks, rows });
        }
        let mut row = reduce_rows(features, bounds[0]..bounds[1], pool_type);
        if normalize_each {
            let norm = row.norm();
            row /= if norm == 0.0 { 1.0 } else { norm };
        }
        pooled.set_row(j, &row);
    }

    if normalize_total {
        pooled /= num_chunks as f32;
    }
    Ok(pooled)
}

/// Pools `features` into one flat vector of length `num_chunks * d`, chunks
/// laid out one after another.
pub fn pool(
    features: &DMatrix<f32>,
    num_chunks: usize,
    pool_type: PoolType,
    normalize_each: bool,
    normalize_total: bool,
) -> Result<DVector<f32>> {
    let pooled = pool_chunks(features, num_chunks, pool_type, normalize_each, normalize_total)?;
    // column-major storage of the transpose is the row-major layout we want
    Ok(DVector::from_iterator(
        pooled.len(),
        pooled.transpose().iter().copied(),
    ))
}

/// Pooling applied to every sampled window before scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoolingPolicy {
    /// Keep every sampled row.
    None,
    /// Collapse the window to a single row.
    Single(PoolType),
    /// `concat-<chunks>-<type>`: chunked pooling with per-chunk normalization.
    Concat { chunks: usize, pool_type: PoolType },
}

impl PoolingPolicy {
    /// Pools one window of sampled rows.
    pub fn apply(&self, sampled: &DMatrix<f32>) -> Result<DMatrix<f32>> {
        match *self {
            PoolingPolicy::None => Ok(sampled.clone()),
            PoolingPolicy::Single(pool_type) => {
                if sampled.nrows() == 0 {
                    return Err(ProposalError::TooManyChunks {
                        num_chunks: 1,
                        rows: 0,
                    });
                }
                let row = reduce_rows(sampled, 0..sampled.nrows(), pool_type);
                Ok(DMatrix::from_row_slice(1, row.len(), row.as_slice()))
            }
            PoolingPolicy::Concat { chunks, pool_type } => {
                pool_chunks(sampled, chunks, pool_type, true, false)
            }
        }
    }

    /// Rows produced for a window of `sampled_rows` sampled feature rows.
    pub fn output_rows(&self, sampled_rows: usize) -> usize {
        match *self {
            PoolingPolicy::None => sampled_rows,
            PoolingPolicy::Single(_) => 1,
            PoolingPolicy::Concat { chunks, .. } => chunks,
        }
    }
}

impl Default for PoolingPolicy {
    fn default() -> Self {
        PoolingPolicy::Concat {
            chunks: 32,
            pool_type: PoolType::Mean,
        }
    }
}

impl FromStr for PoolingPolicy {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self> {
        let policy = s.trim().to_ascii_lowercase();
        match policy.as_str() {
            "" | "none" => return Ok(PoolingPolicy::None),
            "mean" => return Ok(PoolingPolicy::Single(PoolType::Mean)),
            "max" => return Ok(PoolingPolicy::Single(PoolType::Max)),
            _ => {}
        }

        let unknown = || ProposalError::UnknownPoolType(s.to_string());
        let mut parts = policy.split('-');
        let (Some("concat"), Some(chunks), Some(pool_type), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unknown());
        };
        let chunks: usize = chunks.parse().map_err(|_| unknown())?;
        if chunks == 0 {
            return Err(unknown());
        }
        Ok(PoolingPolicy::Concat {
            chunks,
            pool_type: pool_type.parse()?,
        })
    }
}

impl TryFrom<String> for PoolingPolicy {
    type Error = ProposalError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PoolingPolicy> for String {
    fn from(value: PoolingPolicy) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PoolingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolingPolicy::None => f.write_str("none"),
            PoolingPolicy::Single(pool_type) => write!(f, "{pool_type}"),
            PoolingPolicy::Concat { chunks, pool_type } => write!(f, "concat-{chunks}-{pool_type}"),
        }
    }
}
