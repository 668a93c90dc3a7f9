//! Scorecard CLI: read one request (or an array of requests) from a JSON file
//! and print the resulting scorecards as JSON.

use std::path::{Path, PathBuf};

use analysis_core::{Precision, ScoringConfig};
use anyhow::{bail, Context, Result};
use clap::Parser;
use composite_scoring::{ScorecardBuilder, ScorecardRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "scorecard",
    about = "Score symbols from technical, fundamental, YTD and sentiment inputs"
)]
struct Cli {
    /// Path to a JSON request, or a JSON array of requests.
    request: PathBuf,

    /// Rule tables to use: detailed or badge. Overrides SCORECARD_PRECISION.
    #[arg(long)]
    precision: Option<Precision>,

    /// Pretty-print the output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Batch(Vec<ScorecardRequest>),
    Single(ScorecardRequest),
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // Logs go to stderr so stdout stays parseable
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Requests in the file, and whether the file held an array.
fn load_requests(path: &Path) -> Result<(Vec<ScorecardRequest>, bool)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    parse_requests(&raw)
        .with_context(|| format!("Failed to parse request file {}", path.display()))
}

fn parse_requests(raw: &str) -> Result<(Vec<ScorecardRequest>, bool)> {
    let parsed: RequestFile = serde_json::from_str(raw)?;
    Ok(match parsed {
        RequestFile::Batch(requests) => (requests, true),
        RequestFile::Single(request) => (vec![request], false),
    })
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = ScoringConfig::from_env().context("Invalid SCORECARD_* configuration")?;
    if let Some(precision) = cli.precision {
        config = config.with_precision(precision);
    }
    info!(precision = ?config.precision, "Scoring configuration loaded");

    let (requests, is_batch) = load_requests(&cli.request)?;
    let builder = ScorecardBuilder::new(config);
    let results = builder.build_batch(&requests);

    let mut failures = 0usize;
    let outputs: Vec<Value> = requests
        .iter()
        .zip(results)
        .map(|(request, result)| match result {
            Ok(card) => serde_json::to_value(card).context("Failed to serialize scorecard"),
            Err(e) => {
                failures += 1;
                error!(symbol = %request.symbol, "Scorecard failed: {}", e);
                Ok(json!({ "symbol": request.symbol, "error": e.to_string() }))
            }
        })
        .collect::<Result<_>>()?;

    let output = if is_batch {
        Value::Array(outputs)
    } else {
        outputs.into_iter().next().unwrap_or(Value::Null)
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    if failures > 0 {
        bail!("{} of {} requests failed", failures, requests.len());
    }
    Ok(())
}
