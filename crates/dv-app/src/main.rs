//! Command-line host: load events, compose the dashboard, emit the document

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dv_core::Configuration;
use dv_data::{load_dataset, CsvSource, Dataset, JsonSource, NullConfig, RecordSource, Schema};
use dv_views::{write_json, CompositionEngine};

#[derive(Parser)]
#[command(name = "quakeviz")]
#[command(about = "Compose a cross-filtered earthquake dashboard as a Vega-Lite document", long_about = None)]
struct Cli {
    /// Event data (.csv, .json or .geojson)
    #[arg(short, long, value_name = "FILE")]
    data: PathBuf,

    /// Configuration JSON; missing options take their defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Indent the document
    #[arg(long)]
    pretty: bool,

    /// Print the selection name to id map on stderr
    #[arg(long)]
    print_selections: bool,

    /// Extra cell text read as a missing value (repeatable)
    #[arg(long, value_name = "TEXT")]
    missing: Vec<String>,
}

/// Pick a record source from the file extension
fn source_for(path: &Path) -> Result<Box<dyn RecordSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvSource::new(path))),
        Some("json") | Some("geojson") => Ok(Box::new(JsonSource::new(path))),
        _ => bail!(
            "unsupported data file '{}': expected .csv, .json or .geojson",
            path.display()
        ),
    }
}

fn null_markers(extra: &[String]) -> NullConfig {
    extra
        .iter()
        .fold(NullConfig::default(), |nulls, marker| nulls.with_marker(marker.as_str()))
}

fn load(path: &Path, nulls: &NullConfig) -> Result<Dataset> {
    let source = source_for(path)?;
    load_dataset(source.as_ref(), &Schema::earthquake(), nulls)
        .with_context(|| format!("failed to load events from {}", path.display()))
}

fn read_config(path: Option<&Path>) -> Result<Configuration> {
    let Some(path) = path else {
        return Ok(Configuration::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid configuration {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let dataset = load(&cli.data, &null_markers(&cli.missing))?;
    let config = read_config(cli.config.as_deref())?;

    let composition = CompositionEngine::new()
        .compose(&dataset, &config)
        .context("composition failed")?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_json(&composition.spec, BufWriter::new(file), cli.pretty)?;
            info!("Wrote {}", path.display());
        }
        None => write_json(&composition.spec, io::stdout().lock(), cli.pretty)?,
    }

    if cli.print_selections {
        let mut stderr = io::stderr().lock();
        for (name, id) in &composition.selections {
            writeln!(stderr, "{name}\t{id}")?;
        }
    }

    Ok(())
}
