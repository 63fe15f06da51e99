use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use meteor_report::app::ports::ReportSinkPort;
use meteor_report::app::ReportUseCase;
use meteor_report::config::Config;
use meteor_report::infra::country_registry::CountryMapping;
use meteor_report::infra::offline_geocoder::OfflineGeocoder;
use meteor_report::infra::report_writer::WriterReportSink;
use meteor_report::observability::{self, metrics};
use meteor_report::pipeline::processing::enrich::Resolution;

#[derive(Parser)]
#[command(name = "meteor_report")]
#[command(about = "Meteorite landings report: coordinate cleaning, country enrichment, destructiveness ranking")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to meteor_report.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print every checkpoint
    Report {
        /// Landings CSV; overrides METEOR_INPUT_PATH and the config file
        #[arg(long)]
        input: Option<PathBuf>,
        /// Rows shown per checkpoint
        #[arg(long)]
        rows: Option<usize>,
        /// Geocode every row even when coordinates repeat
        #[arg(long)]
        no_memoize: bool,
    },
    /// Resolve one coordinate pair to a country
    Lookup {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        long: f64,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = observability::init_logging();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env();
    metrics::init();

    match cli.command {
        Commands::Report {
            input,
            rows,
            no_memoize,
        } => {
            if let Some(input) = input {
                config.input.path = input;
            }
            if let Some(rows) = rows {
                config.report.rows = rows;
            }
            if no_memoize {
                config.enrich.memoize = false;
            }
            config.validate()?;

            info!(input = %config.input.path.display(), "Starting meteorite report");
            let geocoder = OfflineGeocoder::new();
            let use_case = ReportUseCase::new(&config, &geocoder, CountryMapping::global());
            let mut sink = WriterReportSink::stdout();
            let summary = use_case
                .run(&mut sink)
                .with_context(|| format!("Report over {} failed", config.input.path.display()))?;

            info!(
                rows = summary.ingest.rows_read,
                coerced = summary.ingest.rows_coerced,
                unknown_countries = summary.enrich.unknown(),
                destructive = summary.destructive,
                countries = summary.countries,
                "Report complete"
            );

            if let Some(path) = &config.observability.metrics_snapshot {
                metrics::write_snapshot(path).context("Failed to write metrics snapshot")?;
            }
        }
        Commands::Lookup { lat, long } => {
            let geocoder = OfflineGeocoder::new();
            let use_case = ReportUseCase::new(&config, &geocoder, CountryMapping::global());
            let resolution = use_case.lookup(lat, long);
            if !matches!(resolution, Resolution::Resolved(_)) {
                warn!(?resolution, "Coordinates did not resolve to a country");
            }
            let mut sink = WriterReportSink::stdout();
            sink.write_line(&format!("({}, {}) -> {}", lat, long, resolution.country()))?;
        }
    }

    Ok(())
}
