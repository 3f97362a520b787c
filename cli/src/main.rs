use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rptdoc_extract::{DataSourceLayout, Document, DocumenterConfig, ReportPipeline};
use rptdoc_snapshot::SnapshotLoader;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Parser)]
#[command(name = "rptdoc", version)]
#[command(about = "Write a plain-text definition of a report's structure")]
struct Cli {
    /// Report to document.
    input: PathBuf,
    /// Destination of the definition file.
    output: PathBuf,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where data-source facts are listed; overrides the configuration.
    #[arg(long, value_enum)]
    layout: Option<DataSourceLayout>,
    /// Also write the run report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Log extraction details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("An error occurred: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => DocumenterConfig::load(path)?,
        None => DocumenterConfig::default(),
    };
    if let Some(layout) = cli.layout {
        config = config.with_layout(layout);
    }
    debug!(?config, "Resolved configuration");

    println!("Processing: {}", display_name(&cli.input));

    let mut pipeline = ReportPipeline::new(SnapshotLoader::new(), config);
    let document = pipeline.run(&cli.input)?;

    fs::write(&cli.output, &document.text).map_err(|err| {
        format!(
            "Failed to write definition file '{}': {err}",
            cli.output.display()
        )
    })?;
    if let Some(report_path) = &cli.report {
        write_report(report_path, &document)?;
    }

    println!(
        "Successfully created definition file: {}",
        cli.output.display()
    );
    Ok(())
}

fn write_report(path: &Path, document: &Document) -> CliResult<()> {
    let json = serde_json::to_string_pretty(&document.report)?;
    fs::write(path, json)
        .map_err(|err| format!("Failed to write run report '{}': {err}", path.display()))?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
