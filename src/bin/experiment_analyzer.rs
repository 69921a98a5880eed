use anyhow::{Context, Result};
use experiment_engine::config::AppConfig;
use experiment_engine::domain::experiment::SampleObservation;
use experiment_engine::experiments::analyzer::analyze;
use experiment_engine::stats::bayesian::seeded_rng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, serde::Deserialize)]
struct ExperimentCounts {
    name: String,
    control: SampleObservation,
    treatment: SampleObservation,
}

/// Reads a JSON array of `{name, control, treatment}` counts from the path
/// given as the first argument (or stdin) and prints one report per entry.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = AppConfig::from_env();
    let settings = cfg.analyzer_settings();
    let mut rng = seeded_rng(cfg.rng_seed);

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
    };
    let experiments: Vec<ExperimentCounts> =
        serde_json::from_str(&raw).context("parsing experiment counts")?;

    let mut out = Vec::with_capacity(experiments.len());
    for exp in experiments {
        if let Err(e) = exp.control.validate().and_then(|_| exp.treatment.validate()) {
            tracing::warn!("skipping experiment={}: {}", exp.name, e);
            continue;
        }
        let report = analyze(exp.control, exp.treatment, &settings, &mut rng);
        tracing::info!(
            "experiment={} winner={:?} p_value={} recommendation={}",
            exp.name,
            report.winner,
            report.p_value,
            report.recommendation
        );
        out.push(serde_json::json!({"name": exp.name, "report": report}));
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
