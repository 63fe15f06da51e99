use chrono::{Datelike, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::constants::SCHEMA_WIDTH;
use crate::domain::RawMeteorite;
use crate::error::Result;
use crate::observability::metrics;

/// Timestamp layout used by the NASA export for the year column
const EXPORT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Fall back to parsing the year out of an export timestamp
    pub lenient_year: bool,
}

/// Counters collected while binding rows to the schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestStats {
    pub rows_read: usize,
    /// Rows where at least one non-empty field failed coercion and became null
    pub rows_coerced: usize,
    /// Rows with fewer fields than the schema
    pub short_rows: usize,
}

/// Schema-bound reader for the landings dataset.
///
/// Columns are bound by position: name, id, nametype, recclass, mass (g),
/// fall, year, reclat, reclong, GeoLocation. The header row is skipped, never
/// matched. A field that cannot be coerced to its column type becomes `None`.
pub struct LandingsReader {
    options: ReaderOptions,
}

impl LandingsReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Read every record from the file at `path`.
    ///
    /// A missing or unreadable file is an error; bad field values are not.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_path(&self, path: &Path) -> Result<(Vec<RawMeteorite>, IngestStats)> {
        let started = Instant::now();
        let file = File::open(path)?;
        let result = self.read_from(file)?;
        let elapsed = started.elapsed().as_secs_f64();
        metrics::ingest::duration(elapsed);
        info!(
            rows = result.1.rows_read,
            coerced = result.1.rows_coerced,
            short = result.1.short_rows,
            "Read landings in {:.3}s",
            elapsed
        );
        Ok(result)
    }

    /// Read every record from an arbitrary source with a header row
    pub fn read_from<R: Read>(&self, source: R) -> Result<(Vec<RawMeteorite>, IngestStats)> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let mut records = Vec::new();
        let mut stats = IngestStats::default();
        let mut row = ByteRecord::new();

        while reader.read_byte_record(&mut row)? {
            stats.rows_read += 1;
            if row.len() < SCHEMA_WIDTH {
                stats.short_rows += 1;
            }
            let (record, coerced) = self.bind(&row);
            if coerced {
                stats.rows_coerced += 1;
                debug!(line = row.position().map(|p| p.line()), "Field coercion produced nulls");
            }
            records.push(record);
        }

        metrics::ingest::rows_read(stats.rows_read);
        metrics::ingest::rows_coerced(stats.rows_coerced);
        metrics::ingest::short_rows(stats.short_rows);
        Ok((records, stats))
    }

    /// Bind one row to the schema. The flag reports whether any coercion failed.
    fn bind(&self, row: &ByteRecord) -> (RawMeteorite, bool) {
        let field = |index: usize| field_at(row, index);

        let mass_field = field(4);
        let year_field = field(6);
        let mass_grams = mass_field.as_deref().and_then(parse_number);
        let year = year_field
            .as_deref()
            .and_then(|raw| parse_year(raw, self.options.lenient_year));

        let coerced = (is_present(mass_field.as_deref()) && mass_grams.is_none())
            || (is_present(year_field.as_deref()) && year.is_none());

        let record = RawMeteorite {
            name: field(0).and_then(text),
            id: field(1).and_then(text),
            nametype: field(2).and_then(text),
            recclass: field(3).and_then(text),
            mass_grams,
            fall: field(5).and_then(text),
            year,
            reclat: field(7).and_then(text),
            reclong: field(8).and_then(text),
            geolocation: field(9).and_then(text),
        };
        (record, coerced)
    }
}

impl Default for LandingsReader {
    fn default() -> Self {
        Self::new(ReaderOptions::default())
    }
}

fn field_at(row: &ByteRecord, index: usize) -> Option<Cow<'_, str>> {
    row.get(index).map(String::from_utf8_lossy)
}

fn is_present(raw: Option<&str>) -> bool {
    raw.map_or(false, |value| !value.trim().is_empty())
}

/// Empty text fields read as null; anything else is kept verbatim
fn text(raw: Cow<'_, str>) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.into_owned())
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_year(raw: &str, lenient: bool) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    if lenient {
        return NaiveDateTime::parse_from_str(trimmed, EXPORT_TIMESTAMP_FORMAT)
            .ok()
            .map(|timestamp| timestamp.year());
    }
    None
}
