//! Row shapes produced by each pipeline stage.
//!
//! Every stage consumes one of these and emits the next; nothing is mutated
//! in place once a stage has produced it.

/// A landing record exactly as bound from the input schema.
///
/// Fields that failed type coercion are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMeteorite {
    pub name: Option<String>,
    pub id: Option<String>,
    pub nametype: Option<String>,
    pub recclass: Option<String>,
    pub mass_grams: Option<f64>,
    pub fall: Option<String>,
    pub year: Option<i32>,
    pub reclat: Option<String>,
    pub reclong: Option<String>,
    /// Combined `(lat, long)` text; redundant with `reclat`/`reclong`
    pub geolocation: Option<String>,
}

/// A landing record after coordinate normalization.
///
/// `lat` and `long` are finite when present. The combined geolocation text
/// is gone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meteorite {
    pub name: Option<String>,
    pub id: Option<String>,
    pub nametype: Option<String>,
    pub recclass: Option<String>,
    pub mass_grams: Option<f64>,
    pub fall: Option<String>,
    pub year: Option<i32>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

impl Meteorite {
    /// Both coordinates, or `None` when either one is missing
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.long) {
            (Some(lat), Some(long)) => Some((lat, long)),
            _ => None,
        }
    }
}

/// A normalized record tagged with the country its coordinates fall in.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMeteorite {
    pub meteorite: Meteorite,
    /// Display name of the country, or the `Unknown` sentinel
    pub country: String,
}

/// An iron meteorite with known mass and its destructiveness score.
#[derive(Debug, Clone, PartialEq)]
pub struct DestructiveMeteorite {
    pub record: EnrichedMeteorite,
    pub mass_grams: f64,
    pub destruction_score: f64,
}

/// Per-country summary over destructive meteorites.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryImpact {
    pub country: String,
    pub total_impacts: usize,
    pub avg_mass: f64,
    pub max_mass: f64,
}
