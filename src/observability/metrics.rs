//! Metrics for the report pipeline
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op, so stages can record unconditionally (tests included).

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::Result;

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Run
    RunDuration,

    // Ingest metrics
    IngestRowsRead,
    IngestRowsCoerced,
    IngestShortRows,
    IngestDuration,

    // Normalize metrics
    NormalizeRowsProcessed,
    NormalizeMissingCoordinates,

    // Enrich metrics
    EnrichLookups,
    EnrichCacheHits,
    EnrichResolved,
    EnrichUnknown,
    EnrichDuration,

    // Score metrics
    ScoreRowsScored,
    ScoreRowsFiltered,

    // Aggregate metrics
    AggregateCountries,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RunDuration => "meteor_run_duration_seconds",

            MetricName::IngestRowsRead => "meteor_ingest_rows_read_total",
            MetricName::IngestRowsCoerced => "meteor_ingest_rows_coerced_total",
            MetricName::IngestShortRows => "meteor_ingest_short_rows_total",
            MetricName::IngestDuration => "meteor_ingest_duration_seconds",

            MetricName::NormalizeRowsProcessed => "meteor_normalize_rows_processed_total",
            MetricName::NormalizeMissingCoordinates => "meteor_normalize_missing_coordinates_total",

            MetricName::EnrichLookups => "meteor_enrich_lookups_total",
            MetricName::EnrichCacheHits => "meteor_enrich_cache_hits_total",
            MetricName::EnrichResolved => "meteor_enrich_resolved_total",
            MetricName::EnrichUnknown => "meteor_enrich_unknown_total",
            MetricName::EnrichDuration => "meteor_enrich_duration_seconds",

            MetricName::ScoreRowsScored => "meteor_score_rows_scored_total",
            MetricName::ScoreRowsFiltered => "meteor_score_rows_filtered_total",

            MetricName::AggregateCountries => "meteor_aggregate_countries",
        }
    }
}

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the in-process Prometheus recorder. Idempotent.
pub fn init() {
    HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    });
}

/// Render the current metrics in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().and_then(Option::as_ref).map(PrometheusHandle::render)
}

/// Write the rendered snapshot to `path`
pub fn write_snapshot(path: &Path) -> Result<()> {
    match render() {
        Some(body) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, body)?;
            info!("Wrote metrics snapshot to {}", path.display());
        }
        None => warn!("Metrics snapshot requested but no recorder is installed"),
    }
    Ok(())
}

pub mod run {
    use super::MetricName;

    pub fn completed(duration_secs: f64) {
        ::metrics::histogram!(MetricName::RunDuration.as_str()).record(duration_secs);
    }
}

pub mod ingest {
    use super::MetricName;

    pub fn rows_read(count: usize) {
        ::metrics::counter!(MetricName::IngestRowsRead.as_str()).increment(count as u64);
    }

    pub fn rows_coerced(count: usize) {
        ::metrics::counter!(MetricName::IngestRowsCoerced.as_str()).increment(count as u64);
    }

    pub fn short_rows(count: usize) {
        ::metrics::counter!(MetricName::IngestShortRows.as_str()).increment(count as u64);
    }

    pub fn duration(duration_secs: f64) {
        ::metrics::histogram!(MetricName::IngestDuration.as_str()).record(duration_secs);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn rows_processed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRowsProcessed.as_str()).increment(count as u64);
    }

    pub fn missing_coordinates(count: usize) {
        ::metrics::counter!(MetricName::NormalizeMissingCoordinates.as_str()).increment(count as u64);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn lookup_performed() {
        ::metrics::counter!(MetricName::EnrichLookups.as_str()).increment(1);
    }

    pub fn cache_hit() {
        ::metrics::counter!(MetricName::EnrichCacheHits.as_str()).increment(1);
    }

    pub fn resolved() {
        ::metrics::counter!(MetricName::EnrichResolved.as_str()).increment(1);
    }

    /// Count a row that fell back to the sentinel, labelled by why
    pub fn unknown(reason: &'static str) {
        ::metrics::counter!(MetricName::EnrichUnknown.as_str(), "reason" => reason).increment(1);
    }

    pub fn duration(duration_secs: f64) {
        ::metrics::histogram!(MetricName::EnrichDuration.as_str()).record(duration_secs);
    }
}

pub mod score {
    use super::MetricName;

    pub fn rows_scored(count: usize) {
        ::metrics::counter!(MetricName::ScoreRowsScored.as_str()).increment(count as u64);
    }

    pub fn rows_filtered(count: usize) {
        ::metrics::counter!(MetricName::ScoreRowsFiltered.as_str()).increment(count as u64);
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn countries(count: usize) {
        ::metrics::gauge!(MetricName::AggregateCountries.as_str()).set(count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_follow_convention() {
        let names = [
            MetricName::IngestRowsRead,
            MetricName::EnrichUnknown,
            MetricName::ScoreRowsScored,
            MetricName::AggregateCountries,
        ];
        for name in names {
            assert!(name.as_str().starts_with("meteor_"));
            assert_eq!(name.to_string(), name.as_str());
        }
        assert!(MetricName::EnrichLookups.as_str().ends_with("_total"));
        assert!(MetricName::IngestDuration.as_str().ends_with("_seconds"));
    }

    #[test]
    fn test_installed_recorder_captures_phase_metrics() {
        init();
        ingest::rows_read(3);
        enrich::unknown("lookup_failed");

        let body = render().expect("recorder installed");
        assert!(body.contains(MetricName::IngestRowsRead.as_str()));
        assert!(body.contains(MetricName::EnrichUnknown.as_str()));
        assert!(body.contains("reason=\"lookup_failed\""));
    }

    #[test]
    fn test_snapshot_file_holds_rendered_metrics() {
        init();
        aggregate::countries(4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics/snapshot.prom");
        write_snapshot(&path).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains(MetricName::AggregateCountries.as_str()));
    }

    #[test]
    fn test_recording_is_always_safe() {
        ingest::rows_read(3);
        enrich::unknown("missing_coordinates");
        aggregate::countries(2);
    }
}
