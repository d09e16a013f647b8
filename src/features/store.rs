//! Feature store collaborator: per-video dense feature tables.
//!
//! The pipeline only needs `read(video_id) -> rows x dim`. Two stores ship
//! with the crate: an in-memory map for tests and embedding, and a JSON-backed
//! store whose handle owns the loaded data until it is dropped.
use crate::error::CollaboratorError;
use log::debug;
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read-only access to per-frame visual features.
///
/// Implementations must tolerate concurrent reads of distinct videos when
/// shared across threads.
pub trait FeatureStore {
    /// Dense `rows x dim` feature table for `video_id`, one row per frame.
    fn read(&self, video_id: &str) -> Result<DMatrix<f32>, CollaboratorError>;
}

impl<T: FeatureStore + ?Sized> FeatureStore for &T {
    fn read(&self, video_id: &str) -> Result<DMatrix<f32>, CollaboratorError> {
        (**self).read(video_id)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("video `{0}` not found in feature store")]
    MissingVideo(String),

    #[error("video `{video_id}`: row {row} has {found} values, expected {expected}")]
    RaggedRows {
        video_id: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("failed to read feature store {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feature store {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Builds a `rows x dim` matrix from row vectors, rejecting ragged input.
pub fn features_from_rows(video_id: &str, rows: &[Vec<f32>]) -> Result<DMatrix<f32>, StoreError> {
    let dim = rows.first().map_or(0, Vec::len);
    if let Some((row, found)) = rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != dim)
    {
        return Err(StoreError::RaggedRows {
            video_id: video_id.to_string(),
            row,
            found,
            expected: dim,
        });
    }
    Ok(DMatrix::from_fn(rows.len(), dim, |r, c| rows[r][c]))
}

/// Feature tables held in memory, keyed by video id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryFeatureStore {
    videos: HashMap<String, DMatrix<f32>>,
}

impl InMemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, video_id: impl Into<String>, features: DMatrix<f32>) {
        self.videos.insert(video_id.into(), features);
    }

    pub fn with_video(mut self, video_id: impl Into<String>, features: DMatrix<f32>) -> Self {
        self.insert(video_id, features);
        self
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    fn get(&self, video_id: &str) -> Result<&DMatrix<f32>, StoreError> {
        self.videos
            .get(video_id)
            .ok_or_else(|| StoreError::MissingVideo(video_id.to_string()))
    }
}

impl FeatureStore for InMemoryFeatureStore {
    fn read(&self, video_id: &str) -> Result<DMatrix<f32>, CollaboratorError> {
        Ok(self.get(video_id)?.clone())
    }
}

/// Store handle over a JSON file mapping `video_id -> [[f32; dim]; rows]`.
///
/// The file is read once by [`JsonFeatureStore::open`]; the handle owns the
/// parsed tables and releases them when it goes out of scope, on every exit
/// path of the caller.
#[derive(Debug)]
pub struct JsonFeatureStore {
    path: PathBuf,
    inner: InMemoryFeatureStore,
}

impl JsonFeatureStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: HashMap<String, Vec<Vec<f32>>> =
            serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut inner = InMemoryFeatureStore::new();
        for (video_id, rows) in raw {
            let features = features_from_rows(&video_id, &rows)?;
            inner.insert(video_id, features);
        }
        debug!(
            "JsonFeatureStore::open path={} videos={}",
            path.display(),
            inner.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeatureStore for JsonFeatureStore {
    fn read(&self, video_id: &str) -> Result<DMatrix<f32>, CollaboratorError> {
        self.inner.read(video_id)
    }
}

impl Drop for JsonFeatureStore {
    fn drop(&mut self) {
        debug!("JsonFeatureStore::close path={}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_video_is_a_store_error() {
        let store = InMemoryFeatureStore::new().with_video("a", DMatrix::zeros(3, 2));
        assert_eq!(store.read("a").unwrap().shape(), (3, 2));
        let err = store.read("b").unwrap_err();
        let err = err.downcast_ref::<StoreError>().expect("store error");
        assert!(matches!(err, StoreError::MissingVideo(id) if id == "b"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            features_from_rows("v", &rows),
            Err(StoreError::RaggedRows { row: 1, found: 1, expected: 2, .. })
        ));
    }

    #[test]
    fn json_store_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"clip": [[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]}}"#).unwrap();

        let store = JsonFeatureStore::open(file.path()).unwrap();
        let features = store.read("clip").unwrap();
        assert_eq!(features.shape(), (3, 2));
        assert_eq!(features[(2, 1)], 5.0);
        assert!(store.read("other").is_err());
    }

    #[test]
    fn json_store_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            JsonFeatureStore::open(file.path()),
            Err(StoreError::Parse { .. })
        ));
    }
}
