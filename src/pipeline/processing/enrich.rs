use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::app::ports::ReverseGeocoderPort;
use crate::constants::UNKNOWN_COUNTRY;
use crate::domain::{EnrichedMeteorite, Meteorite};
use crate::infra::country_registry::CountryMapping;
use crate::observability::metrics;

/// How a coordinate pair was resolved to a country
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Display name from the country table
    Resolved(String),
    MissingCoordinates,
    OutOfRange,
    /// The geocoder returned an error
    LookupFailed,
    /// The geocoder answered with a code the country table does not know
    UnmappedCode(String),
}

impl Resolution {
    /// The country value written to the row
    pub fn country(&self) -> &str {
        match self {
            Resolution::Resolved(name) => name,
            _ => UNKNOWN_COUNTRY,
        }
    }

    fn reason(&self) -> Option<&'static str> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::MissingCoordinates => Some("missing_coordinates"),
            Resolution::OutOfRange => Some("out_of_range"),
            Resolution::LookupFailed => Some("lookup_failed"),
            Resolution::UnmappedCode(_) => Some("unmapped_code"),
        }
    }
}

/// Why rows ended up `Unknown`; never shown in the report itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichStats {
    pub rows: usize,
    pub resolved: usize,
    pub missing_coordinates: usize,
    pub out_of_range: usize,
    pub lookup_failed: usize,
    pub unmapped_code: usize,
    /// Calls that actually reached the geocoder
    pub lookups: usize,
    pub cache_hits: usize,
}

impl EnrichStats {
    pub fn unknown(&self) -> usize {
        self.rows - self.resolved
    }

    fn record(&mut self, resolution: &Resolution) {
        self.rows += 1;
        match resolution {
            Resolution::Resolved(_) => self.resolved += 1,
            Resolution::MissingCoordinates => self.missing_coordinates += 1,
            Resolution::OutOfRange => self.out_of_range += 1,
            Resolution::LookupFailed => self.lookup_failed += 1,
            Resolution::UnmappedCode(_) => self.unmapped_code += 1,
        }
    }
}

/// Tags rows with the country their coordinates fall in.
///
/// Every failure collapses to the `Unknown` sentinel; nothing here returns an
/// error. Identical coordinate pairs hit the geocoder once when memoization is
/// on.
pub struct CountryEnricher<'a> {
    geocoder: &'a dyn ReverseGeocoderPort,
    countries: &'a CountryMapping,
    memoize: bool,
    /// Geocoder answers keyed by the bit patterns of (lat, long); `None` is a failed lookup
    cache: HashMap<(u64, u64), Option<String>>,
    stats: EnrichStats,
}

impl<'a> CountryEnricher<'a> {
    pub fn new(geocoder: &'a dyn ReverseGeocoderPort, countries: &'a CountryMapping) -> Self {
        Self {
            geocoder,
            countries,
            memoize: true,
            cache: HashMap::new(),
            stats: EnrichStats::default(),
        }
    }

    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn stats(&self) -> &EnrichStats {
        &self.stats
    }

    /// Resolve a coordinate pair, recording the outcome in the stats
    pub fn resolve(&mut self, lat: Option<f64>, long: Option<f64>) -> Resolution {
        let resolution = match (lat, long) {
            (Some(lat), Some(long)) => self.resolve_point(lat, long),
            _ => {
                debug!(?lat, ?long, "Coordinates missing");
                Resolution::MissingCoordinates
            }
        };
        self.stats.record(&resolution);
        if let Some(reason) = resolution.reason() {
            metrics::enrich::unknown(reason);
        } else {
            metrics::enrich::resolved();
        }
        resolution
    }

    fn resolve_point(&mut self, lat: f64, long: f64) -> Resolution {
        if !in_range(lat, long) {
            debug!(lat, long, "Coordinates out of range");
            return Resolution::OutOfRange;
        }
        let code = match self.lookup(lat, long) {
            Some(code) => code,
            None => return Resolution::LookupFailed,
        };
        match self.countries.name_for(&code) {
            Some(name) => Resolution::Resolved(name.to_string()),
            None => {
                debug!(lat, long, code = %code, "Country code not in table");
                Resolution::UnmappedCode(code)
            }
        }
    }

    fn lookup(&mut self, lat: f64, long: f64) -> Option<String> {
        let key = (lat.to_bits(), long.to_bits());
        if self.memoize {
            if let Some(cached) = self.cache.get(&key) {
                self.stats.cache_hits += 1;
                metrics::enrich::cache_hit();
                return cached.clone();
            }
        }

        self.stats.lookups += 1;
        metrics::enrich::lookup_performed();
        let answer = match self.geocoder.country_code(lat, long) {
            Ok(code) => Some(code),
            Err(e) => {
                debug!(lat, long, error = %e, "Reverse geocoding failed");
                None
            }
        };
        if self.memoize {
            self.cache.insert(key, answer.clone());
        }
        answer
    }

    pub fn enrich(&mut self, meteorite: Meteorite) -> EnrichedMeteorite {
        let resolution = self.resolve(meteorite.lat, meteorite.long);
        EnrichedMeteorite {
            country: resolution.country().to_string(),
            meteorite,
        }
    }

    /// Enrich every record in order
    pub fn enrich_all(&mut self, records: Vec<Meteorite>) -> Vec<EnrichedMeteorite> {
        let started = Instant::now();
        let enriched: Vec<EnrichedMeteorite> =
            records.into_iter().map(|record| self.enrich(record)).collect();
        let elapsed = started.elapsed().as_secs_f64();
        metrics::enrich::duration(elapsed);

        let stats = &self.stats;
        info!(
            rows = stats.rows,
            resolved = stats.resolved,
            unknown = stats.unknown(),
            lookups = stats.lookups,
            cache_hits = stats.cache_hits,
            "Enriched countries in {:.3}s",
            elapsed
        );
        if stats.unknown() > 0 {
            info!(
                missing_coordinates = stats.missing_coordinates,
                out_of_range = stats.out_of_range,
                lookup_failed = stats.lookup_failed,
                unmapped_code = stats.unmapped_code,
                "Rows resolved to {}",
                UNKNOWN_COUNTRY
            );
        }
        enriched
    }
}

fn in_range(lat: f64, long: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&long)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, Result};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Northern hemisphere is "AA", southern "BB", the equator fails,
    /// and longitudes past 170 answer with an unmapped code.
    struct StubGeocoder {
        calls: AtomicUsize,
    }

    impl StubGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ReverseGeocoderPort for StubGeocoder {
        fn country_code(&self, lat: f64, long: f64) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if lat == 0.0 {
                return Err(ReportError::Geocode {
                    lat,
                    long,
                    message: "no data".to_string(),
                });
            }
            if long > 170.0 {
                return Ok("ZZ".to_string());
            }
            Ok(if lat > 0.0 { "AA" } else { "BB" }.to_string())
        }
    }

    fn countries() -> CountryMapping {
        [("AA", "Northland"), ("BB", "Southland")].into_iter().collect()
    }

    fn at(lat: Option<f64>, long: Option<f64>) -> Meteorite {
        Meteorite {
            id: Some("1".to_string()),
            lat,
            long,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolves_mapped_code() {
        let geocoder = StubGeocoder::new();
        let countries = countries();
        let mut enricher = CountryEnricher::new(&geocoder, &countries);
        let row = enricher.enrich(at(Some(10.0), Some(20.0)));
        assert_eq!(row.country, "Northland");
        assert_eq!(row.meteorite.id.as_deref(), Some("1"));
        assert_eq!(enricher.stats().resolved, 1);
    }

    #[test]
    fn test_every_failure_becomes_unknown() {
        let geocoder = StubGeocoder::new();
        let countries = countries();
        let mut enricher = CountryEnricher::new(&geocoder, &countries);

        let rows = enricher.enrich_all(vec![
            at(None, None),
            at(Some(10.0), None),
            at(Some(95.0), Some(0.0)),
            at(Some(10.0), Some(-181.0)),
            at(Some(0.0), Some(5.0)),
            at(Some(10.0), Some(175.0)),
        ]);

        assert!(rows.iter().all(|row| row.country == "Unknown"));
        let stats = enricher.stats();
        assert_eq!(stats.rows, 6);
        assert_eq!(stats.missing_coordinates, 2);
        assert_eq!(stats.out_of_range, 2);
        assert_eq!(stats.lookup_failed, 1);
        assert_eq!(stats.unmapped_code, 1);
        assert_eq!(stats.unknown(), 6);
        // Range and presence checks never reach the geocoder
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_failure_reason_is_logged_at_debug() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let geocoder = StubGeocoder::new();
        let countries = countries();
        tracing::subscriber::with_default(subscriber, || {
            let mut enricher = CountryEnricher::new(&geocoder, &countries);
            enricher.enrich_all(vec![
                at(None, Some(1.0)),
                at(Some(95.0), Some(0.0)),
                at(Some(0.0), Some(5.0)),
                at(Some(10.0), Some(175.0)),
            ]);
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        for message in [
            "Coordinates missing",
            "Coordinates out of range",
            "Reverse geocoding failed",
            "Country code not in table",
        ] {
            let line = output.lines().find(|l| l.contains(message));
            assert!(line.is_some_and(|l| l.contains("DEBUG")), "{} not logged", message);
        }
    }

    #[test]
    fn test_failure_does_not_stop_later_rows() {
        let geocoder = StubGeocoder::new();
        let countries = countries();
        let mut enricher = CountryEnricher::new(&geocoder, &countries);
        let rows = enricher.enrich_all(vec![
            at(Some(0.0), Some(1.0)),
            at(Some(-10.0), Some(1.0)),
        ]);
        assert_eq!(rows[0].country, "Unknown");
        assert_eq!(rows[1].country, "Southland");
    }

    #[test]
    fn test_memoization_skips_repeat_lookups_without_changing_output() {
        let input = vec![
            at(Some(10.0), Some(20.0)),
            at(Some(10.0), Some(20.0)),
            at(Some(0.0), Some(3.0)),
            at(Some(0.0), Some(3.0)),
            at(Some(-5.0), Some(20.0)),
        ];
        let countries = countries();

        let cached_geocoder = StubGeocoder::new();
        let mut cached = CountryEnricher::new(&cached_geocoder, &countries);
        let with_cache = cached.enrich_all(input.clone());

        let plain_geocoder = StubGeocoder::new();
        let mut plain = CountryEnricher::new(&plain_geocoder, &countries).with_memoization(false);
        let without_cache = plain.enrich_all(input);

        assert_eq!(with_cache, without_cache);
        assert_eq!(cached_geocoder.calls.load(Ordering::SeqCst), 3);
        assert_eq!(plain_geocoder.calls.load(Ordering::SeqCst), 5);
        assert_eq!(cached.stats().cache_hits, 2);
        assert_eq!(cached.stats().lookup_failed, 2);
        assert_eq!(plain.stats().cache_hits, 0);
    }

    #[test]
    fn test_boundary_coordinates_are_in_range() {
        assert!(in_range(90.0, 180.0));
        assert!(in_range(-90.0, -180.0));
        assert!(!in_range(90.0001, 0.0));
    }
}
