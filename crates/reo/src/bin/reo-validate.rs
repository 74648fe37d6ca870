//! Command-line validator for scenario documents.

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use reo::config::{LayeredSettingsOptions, ValidatorSettings};
use reo::{RateSource, build_validator};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command-line options for the validator.
#[derive(Parser)]
#[command(name = "reo-validate", version)]
struct Cli {
    /// Path to the schema catalog
    #[arg(long)]
    schema: PathBuf,
    /// Scenario document to validate ("-" reads stdin)
    #[arg(long)]
    input: PathBuf,
    /// Extra settings file applied on top of the layered settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON5 file of rate documents used instead of the URDB service
    #[arg(long, conflicts_with = "offline")]
    rates: Option<PathBuf>,
    /// Skip rate lookups entirely
    #[arg(long)]
    offline: bool,
    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting validator (schema={}, config_set={}, offline={})",
        cli.schema.display(),
        cli.config.is_some(),
        cli.offline
    );

    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredSettingsOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered = ValidatorSettings::load_layered_with_options(options)
        .context("failed to load layered settings")?;
    debug!("layered settings loaded (layers={})", layered.layers.len());
    let settings = layered.settings;

    let rates = if cli.offline {
        RateSource::Offline
    } else if let Some(path) = cli.rates.clone() {
        RateSource::File(path)
    } else if settings.urdb.api_key.is_some() {
        RateSource::Service
    } else {
        warn!("no URDB api_key configured; rate lookups disabled");
        RateSource::Offline
    };
    let validator = build_validator(&settings, &cli.schema, &rates)?;

    let document = read_document(&cli.input)?;
    let outcome = validator.validate(document);
    let summary = outcome.summary();
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("failed to serialize result")?;
    println!("{rendered}");

    Ok(if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        info!("reading document from {}", path.display());
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&contents).context("input is not valid JSON")
}
