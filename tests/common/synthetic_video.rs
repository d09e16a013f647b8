use nalgebra::DMatrix;
use temporal_proposals::features::{FeatureBatch, InMemoryFeatureStore};
use temporal_proposals::scorer::{ScorerOutput, WindowCandidates};

/// Dense per-frame features whose first column ramps from 0 to 1.
pub fn ramp_features(rows: usize, dim: usize) -> DMatrix<f32> {
    assert!(rows > 0 && dim > 0, "feature table must be non-empty");
    DMatrix::from_fn(rows, dim, |r, c| {
        if c == 0 {
            r as f32 / rows as f32
        } else {
            ((r + c) % 7) as f32 * 0.1
        }
    })
}

/// Store holding one ramp video per `(video_id, rows)` pair.
pub fn ramp_store(videos: &[(&str, usize)], dim: usize) -> InMemoryFeatureStore {
    videos
        .iter()
        .fold(InMemoryFeatureStore::new(), |store, &(id, rows)| {
            store.with_video(id, ramp_features(rows, dim))
        })
}

/// Candidates tiling the window: candidate `k` of `n` is centred at
/// `(k + 0.5) / n` with a duration cycling through a few widths, and scores
/// fall with `k`.
pub fn tiled_candidates(num_outputs: usize) -> WindowCandidates {
    let n = num_outputs as f64;
    let locations: Vec<[f64; 2]> = (0..num_outputs)
        .map(|k| {
            let width = 0.1 + 0.2 * (k % 4) as f64;
            [(k as f64 + 0.5) / n, width]
        })
        .collect();
    let scores = (0..num_outputs).map(|k| 1.0 - k as f64 / n).collect();
    WindowCandidates::from_pairs(&locations, scores).expect("tiled candidates are well formed")
}

/// Scorer returning [`tiled_candidates`] for every window.
pub fn tiled_scorer(num_outputs: usize) -> impl Fn(&FeatureBatch) -> ScorerOutput + Sync {
    move |batch: &FeatureBatch| Ok(vec![tiled_candidates(num_outputs); batch.len()])
}
