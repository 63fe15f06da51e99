use reverse_geocoder::ReverseGeocoder;
use std::time::Instant;
use tracing::info;

use crate::app::ports::ReverseGeocoderPort;
use crate::error::{ReportError, Result};

/// Offline reverse geocoder backed by the GeoNames cities table embedded in
/// the `reverse_geocoder` crate.
///
/// Each call is an exact nearest-neighbour search for a single point.
pub struct OfflineGeocoder {
    inner: ReverseGeocoder,
}

impl OfflineGeocoder {
    /// Build the search tree. This loads the embedded table and takes a moment.
    pub fn new() -> Self {
        let started = Instant::now();
        let inner = ReverseGeocoder::new();
        info!("Loaded offline geocoder in {:.2}s", started.elapsed().as_secs_f64());
        Self { inner }
    }
}

impl Default for OfflineGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseGeocoderPort for OfflineGeocoder {
    fn country_code(&self, lat: f64, long: f64) -> Result<String> {
        if !lat.is_finite() || !long.is_finite() {
            return Err(ReportError::Geocode {
                lat,
                long,
                message: "coordinates are not finite".to_string(),
            });
        }
        let result = self.inner.search((lat, long));
        let code = result.record.cc.trim();
        if code.is_empty() {
            return Err(ReportError::Geocode {
                lat,
                long,
                message: format!("nearest place '{}' has no country code", result.record.name),
            });
        }
        Ok(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_known_fall_site() {
        let geocoder = OfflineGeocoder::new();
        // Aachen, the first record of the landings dataset
        assert_eq!(geocoder.country_code(50.775, 6.08333).unwrap(), "DE");
    }

    #[test]
    fn test_rejects_nan() {
        let geocoder = OfflineGeocoder::new();
        assert!(geocoder.country_code(f64::NAN, 0.0).is_err());
    }
}
