use crate::error::Result;
use crate::report::Table;

/// Point lookup against a reverse geocoder.
pub trait ReverseGeocoderPort: Send + Sync {
    /// Two-letter country code of the place nearest to `(lat, long)`
    fn country_code(&self, lat: f64, long: f64) -> Result<String>;
}

/// Destination for the report checkpoints
pub trait ReportSinkPort {
    fn write_section(&mut self, title: &str, table: &Table) -> Result<()>;

    /// Plain text output, e.g. a single lookup answer
    fn write_line(&mut self, line: &str) -> Result<()>;
}
