use std::env;
use std::path::Path;
use temporal_proposals::config::proposals;
use temporal_proposals::features::JsonFeatureStore;
use temporal_proposals::io::write_json_output;
use temporal_proposals::scorer::LookupScorer;
use temporal_proposals::ProposalGenerator;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = proposals::load_config(Path::new(&config_path))?;

    let store = JsonFeatureStore::open(&config.features).map_err(|e| e.to_string())?;
    println!("Loaded features from {}", store.path().display());
    let scorer = LookupScorer::load(&config.scores)?;
    let generator = ProposalGenerator::new(config.params, scorer).map_err(|e| e.to_string())?;

    let report = generator
        .generate_with_report(&store, &config.video_id)
        .map_err(|e| format!("Failed to generate proposals for {}: {e}", config.video_id))?;

    write_json_output(
        &config.output.proposals_json,
        &report.proposals,
        config.output.clobber,
    )?;
    if let Some(path) = &config.output.report_json {
        write_json_output(path, &report, config.output.clobber)?;
    }

    if report.trace.degraded() {
        println!(
            "Video {} is shorter than one window; used a single window with frame stride {}",
            config.video_id, report.trace.plan.frame_stride
        );
    }
    println!(
        "Saved {} proposals ({} candidates from {} windows) to {}",
        report.proposals.len(),
        report.trace.candidates,
        report.trace.plan.len(),
        config.output.proposals_json.display()
    );
    println!("total_ms={:.3}", report.trace.timings.total_ms);

    Ok(())
}

fn usage() -> String {
    "Usage: generate_proposals <config.json>".to_string()
}

