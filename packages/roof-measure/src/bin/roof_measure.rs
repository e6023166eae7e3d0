//! CLI for extracting roof measurements from a report on disk
//!
//! Runs the text path over the file and prints the report as JSON on stdout.
//! Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roof_measure::{ExtractionRequest, MeasurementPipeline, PipelineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roof-measure")]
#[command(about = "Extract roof measurements from an aerial-survey report")]
struct Cli {
    /// Report file to read
    path: PathBuf,

    /// Filename used to pick a simulated record (defaults to the file's name)
    #[arg(long)]
    filename: Option<String>,

    /// Skip extraction and print the simulated record
    #[arg(long)]
    simulate: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roof_measure=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::from_env().context("Failed to load configuration")?;
    let pipeline = MeasurementPipeline::new(config);

    let filename = cli.filename.clone().or_else(|| {
        cli.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    });

    let report = if cli.simulate {
        pipeline.simulate(filename.as_deref())
    } else {
        let document = std::fs::read(&cli.path)
            .with_context(|| format!("Failed to read {}", cli.path.display()))?;

        let mut request = ExtractionRequest::new().with_document(document);
        if let Some(name) = filename {
            request = request.with_filename(name);
        }

        pipeline
            .extract(request)
            .await
            .context("Failed to extract measurements")?
    };

    tracing::info!(
        authentic = report.authentic,
        method = ?report.method,
        "Extraction complete"
    );

    let json = if cli.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize report")?;

    println!("{}", json);
    Ok(())
}
