use serde::{Deserialize, Serialize};

/// Scored action interval in absolute frame coordinates (inclusive bounds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub video_id: String,
    pub frame_start: i64,
    pub frame_end: i64,
    pub score: f64,
}

/// Final proposals of one video, sorted by descending score.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalSet {
    pub video_id: String,
    pub proposals: Vec<Proposal>,
}

impl ProposalSet {
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Best `k` proposals.
    pub fn top(&self, k: usize) -> &[Proposal] {
        &self.proposals[..k.min(self.proposals.len())]
    }
}
