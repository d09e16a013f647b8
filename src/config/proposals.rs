use crate::proposals::ProposalParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ProposalToolConfig {
    /// JSON feature store: `{ "<video_id>": [[f32; dim]; rows] }`.
    pub features: PathBuf,
    /// Precomputed per-window candidates replayed by the scorer.
    pub scores: PathBuf,
    pub video_id: String,
    #[serde(default)]
    pub params: ProposalParams,
    pub output: ProposalOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct ProposalOutputConfig {
    pub proposals_json: PathBuf,
    /// Optional full run trace.
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Overwrite existing output files.
    #[serde(default)]
    pub clobber: bool,
}

pub fn load_config(path: &Path) -> Result<ProposalToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
