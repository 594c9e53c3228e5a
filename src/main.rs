use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;

use h2h_signals::advanced_fetch::{AdvancedSource, HttpAdvancedSource, StaticAdvancedSource};
use h2h_signals::analysis::{AnalysisConfig, MatchDocument, analyze_match};
use h2h_signals::report::render_text;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let mut args = env::args().skip(1);
    let Some(match_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: h2h_signals <match.json> [advanced.json]");
        std::process::exit(2);
    };
    let advanced_path = args.next().map(PathBuf::from);

    let raw = fs::read_to_string(&match_path)
        .with_context(|| format!("read match document {}", match_path.display()))?;
    let doc = MatchDocument::from_json(&raw)?;
    tracing::info!(home = %doc.home_team, away = %doc.away_team, "loaded match document");

    let source: Option<Box<dyn AdvancedSource>> = match advanced_path {
        Some(path) => {
            let source = StaticAdvancedSource::from_file(&path)?;
            tracing::info!(payloads = source.len(), "using advanced payloads from file");
            Some(Box::new(source))
        }
        None => HttpAdvancedSource::from_env().map(|s| Box::new(s) as Box<dyn AdvancedSource>),
    };
    if source.is_none() {
        tracing::info!("no advanced source configured; series and scorers will be empty");
    }

    let cfg = AnalysisConfig::from_env();
    let analysis = analyze_match(&doc, source.as_deref(), &cfg);

    let json_output = env::var("REPORT_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_output {
        let json = serde_json::to_string_pretty(&analysis).context("serialize analysis")?;
        println!("{json}");
    } else {
        print!("{}", render_text(&analysis));
    }
    Ok(())
}

fn init_tracing() {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(stderr_layer)
        .init();
}
