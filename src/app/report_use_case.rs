use std::time::Instant;
use tracing::{info, info_span};

use crate::app::ports::{ReportSinkPort, ReverseGeocoderPort};
use crate::config::Config;
use crate::domain::RawMeteorite;
use crate::error::Result;
use crate::infra::country_registry::CountryMapping;
use crate::observability::metrics;
use crate::pipeline::ingestion::{IngestStats, LandingsReader, ReaderOptions};
use crate::pipeline::processing::enrich::Resolution;
use crate::pipeline::processing::{
    aggregate_by_country, normalize_all, CountryEnricher, DestructivenessScorer, EnrichStats,
};
use crate::report;

/// What a run did, beyond what the report shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ingest: IngestStats,
    pub enrich: EnrichStats,
    pub destructive: usize,
    pub countries: usize,
}

/// Runs the five pipeline stages and writes a checkpoint after each.
pub struct ReportUseCase<'a> {
    config: &'a Config,
    geocoder: &'a dyn ReverseGeocoderPort,
    countries: &'a CountryMapping,
}

impl<'a> ReportUseCase<'a> {
    pub fn new(
        config: &'a Config,
        geocoder: &'a dyn ReverseGeocoderPort,
        countries: &'a CountryMapping,
    ) -> Self {
        Self {
            config,
            geocoder,
            countries,
        }
    }

    /// Read the configured input and report on it.
    ///
    /// Only reading can fail; every later stage degrades instead.
    pub fn run(&self, sink: &mut dyn ReportSinkPort) -> Result<RunSummary> {
        let started = Instant::now();
        let reader = LandingsReader::new(ReaderOptions {
            lenient_year: self.config.ingest.lenient_year,
        });
        let (records, ingest) = reader.read_path(&self.config.input.path)?;
        let mut summary = self.run_records(records, sink)?;
        summary.ingest = ingest;

        let elapsed = started.elapsed().as_secs_f64();
        metrics::run::completed(elapsed);
        info!("Report finished in {:.2}s", elapsed);
        Ok(summary)
    }

    /// Report on records that were already read
    pub fn run_records(
        &self,
        records: Vec<RawMeteorite>,
        sink: &mut dyn ReportSinkPort,
    ) -> Result<RunSummary> {
        let rows = self.config.report.rows;

        let oldest = report::oldest(&records, rows);
        sink.write_section(report::TITLE_OLDEST, &report::raw_table(&oldest))?;

        let cleaned = {
            let _span = info_span!("normalize").entered();
            normalize_all(records)
        };
        sink.write_section(report::TITLE_CLEANED, &report::cleaned_table(&cleaned, rows))?;

        let (enriched, enrich_stats) = {
            let _span = info_span!("enrich").entered();
            let mut enricher = CountryEnricher::new(self.geocoder, self.countries)
                .with_memoization(self.config.enrich.memoize);
            let enriched = enricher.enrich_all(cleaned);
            (enriched, enricher.stats().clone())
        };
        sink.write_section(report::TITLE_ENRICHED, &report::enriched_table(&enriched, rows))?;

        let destructive = {
            let _span = info_span!("score").entered();
            DestructivenessScorer::new(self.config.scoring.clone()).rank(enriched)
        };
        sink.write_section(
            report::TITLE_DESTRUCTIVE,
            &report::destructive_table(&destructive, rows),
        )?;

        let impacts = aggregate_by_country(&destructive);
        sink.write_section(report::TITLE_COUNTRIES, &report::country_table(&impacts, rows))?;

        Ok(RunSummary {
            ingest: IngestStats::default(),
            enrich: enrich_stats,
            destructive: destructive.len(),
            countries: impacts.len(),
        })
    }

    /// Resolve a single coordinate pair the same way the enrichment stage does
    pub fn lookup(&self, lat: f64, long: f64) -> Resolution {
        CountryEnricher::new(self.geocoder, self.countries).resolve(Some(lat), Some(long))
    }
}
