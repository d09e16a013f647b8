mod common;

use common::synthetic_video::{ramp_features, tiled_candidates};
use serde_json::json;
use std::fs;
use std::path::Path;
use temporal_proposals::config::proposals::load_config;
use temporal_proposals::features::JsonFeatureStore;
use temporal_proposals::io::write_json_output;
use temporal_proposals::scorer::{CandidateRecord, LookupError, LookupScorer};
use temporal_proposals::{ProposalError, ProposalGenerator, ProposalSet};

fn write_inputs(dir: &Path, rows: usize, windows: usize) {
    let features = ramp_features(rows, 3);
    let table: Vec<Vec<f32>> = features
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    fs::write(
        dir.join("features.json"),
        json!({ "v1": table }).to_string(),
    )
    .unwrap();

    let record = CandidateRecord::from(&tiled_candidates(8));
    fs::write(
        dir.join("scores.json"),
        serde_json::to_string(&vec![record; windows]).unwrap(),
    )
    .unwrap();

    let config = json!({
        "features": dir.join("features.json"),
        "scores": dir.join("scores.json"),
        "video_id": "v1",
        "params": {
            "window_length": 128,
            "window_stride": 32,
            "seq_length": 16,
            "frame_stride": 4,
            "pooling": "concat-16-max",
            "num_outputs": 8,
            "nms": { "overlap_threshold": 0.5, "measure": "overlap" }
        },
        "output": {
            "proposals_json": dir.join("out").join("proposals.json"),
            "report_json": dir.join("out").join("report.json")
        }
    });
    fs::write(dir.join("config.json"), config.to_string()).unwrap();
}

#[test]
fn config_drives_a_full_run() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    // 256 frames, windows at 0, 32, 64, 96, 128
    write_inputs(dir.path(), 256, 5);

    let config = load_config(&dir.path().join("config.json")).unwrap();
    assert_eq!(config.params.window_length, 128);
    assert!(!config.output.clobber);

    let store = JsonFeatureStore::open(&config.features).unwrap();
    let scorer = LookupScorer::load(&config.scores).unwrap();
    assert_eq!(scorer.len(), 5);

    let generator = ProposalGenerator::new(config.params, scorer).unwrap();
    let report = generator.generate_with_report(&store, &config.video_id).unwrap();
    assert_eq!(report.trace.plan.starts, vec![0, 32, 64, 96, 128]);
    assert_eq!(report.trace.batch_shape, (5, 16, 3));

    write_json_output(&config.output.proposals_json, &report.proposals, false).unwrap();
    let saved: ProposalSet =
        serde_json::from_str(&fs::read_to_string(&config.output.proposals_json).unwrap())
            .unwrap();
    assert_eq!(saved, report.proposals);

    let err = write_json_output(&config.output.proposals_json, &report.proposals, false)
        .unwrap_err();
    assert!(err.contains("already exists"));
    write_json_output(&config.output.proposals_json, &report.proposals, true).unwrap();

    let report_path = config.output.report_json.as_ref().unwrap();
    write_json_output(report_path, &report, false).unwrap();
    let trace: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(trace["trace"]["plan"]["receptiveField"], 128);
    assert_eq!(trace["trace"]["videoId"], "v1");
}

#[test]
fn replayed_scores_must_cover_every_window() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), 256, 2);

    let config = load_config(&dir.path().join("config.json")).unwrap();
    let store = JsonFeatureStore::open(&config.features).unwrap();
    let scorer = LookupScorer::load(&config.scores).unwrap();
    let generator = ProposalGenerator::new(config.params, scorer).unwrap();

    match generator.generate(&store, "v1").unwrap_err() {
        ProposalError::Scorer(source) => {
            let lookup = source.downcast_ref::<LookupError>().unwrap();
            assert!(matches!(
                lookup,
                LookupError::WindowCountMismatch {
                    available: 2,
                    requested: 5
                }
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn malformed_config_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "features": 3 }"#).unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(err.starts_with("Failed to parse config"));
    assert!(err.contains("broken.json"));
}
