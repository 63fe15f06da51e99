use tracing::{debug, info};

use crate::domain::{Meteorite, RawMeteorite};
use crate::observability::metrics;

/// Normalize one raw coordinate string.
///
/// Surrounding whitespace is trimmed, blank text is treated as missing, and
/// text that does not parse to a finite number becomes missing.
pub fn normalize_coordinate(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Turn a raw record into a normalized one: numeric coordinates, no
/// combined geolocation text.
pub fn normalize_record(raw: RawMeteorite) -> Meteorite {
    let lat = normalize_coordinate(raw.reclat.as_deref());
    let long = normalize_coordinate(raw.reclong.as_deref());
    if lat.is_none() != long.is_none() {
        debug!(id = ?raw.id, "Record has only one usable coordinate");
    }
    Meteorite {
        name: raw.name,
        id: raw.id,
        nametype: raw.nametype,
        recclass: raw.recclass,
        mass_grams: raw.mass_grams,
        fall: raw.fall,
        year: raw.year,
        lat,
        long,
    }
}

/// Normalize every record in order
pub fn normalize_all(records: Vec<RawMeteorite>) -> Vec<Meteorite> {
    let normalized: Vec<Meteorite> = records.into_iter().map(normalize_record).collect();
    let missing = normalized.iter().filter(|m| m.coordinates().is_none()).count();

    metrics::normalize::rows_processed(normalized.len());
    metrics::normalize::missing_coordinates(missing);
    info!(
        rows = normalized.len(),
        missing_coordinates = missing,
        "Normalized coordinates"
    );
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lat: Option<&str>, long: Option<&str>) -> RawMeteorite {
        RawMeteorite {
            name: Some("Test".to_string()),
            id: Some("1".to_string()),
            recclass: Some("Iron, IIAB".to_string()),
            mass_grams: Some(10.0),
            year: Some(1900),
            reclat: lat.map(str::to_string),
            reclong: long.map(str::to_string),
            geolocation: Some("(1.0, 2.0)".to_string()),
            ..Default::default()
        }
    }

    /// Re-express a normalized record in the raw text form
    fn as_raw(meteorite: &Meteorite) -> RawMeteorite {
        RawMeteorite {
            name: meteorite.name.clone(),
            id: meteorite.id.clone(),
            nametype: meteorite.nametype.clone(),
            recclass: meteorite.recclass.clone(),
            mass_grams: meteorite.mass_grams,
            fall: meteorite.fall.clone(),
            year: meteorite.year,
            reclat: meteorite.lat.map(|v| v.to_string()),
            reclong: meteorite.long.map(|v| v.to_string()),
            geolocation: None,
        }
    }

    #[test]
    fn test_trims_and_parses() {
        let m = normalize_record(raw(Some("  50.775 "), Some("\t6.08333")));
        assert_eq!(m.lat, Some(50.775));
        assert_eq!(m.long, Some(6.08333));
        assert_eq!(m.coordinates(), Some((50.775, 6.08333)));
    }

    #[test]
    fn test_blank_and_whitespace_become_missing() {
        for blank in ["", " ", "   \t "] {
            assert_eq!(normalize_coordinate(Some(blank)), None, "input {:?}", blank);
        }
        assert_eq!(normalize_coordinate(None), None);
    }

    #[test]
    fn test_unparseable_and_non_finite_become_missing() {
        assert_eq!(normalize_coordinate(Some("north")), None);
        assert_eq!(normalize_coordinate(Some("NaN")), None);
        assert_eq!(normalize_coordinate(Some("inf")), None);
        assert_eq!(normalize_coordinate(Some("-33.5")), Some(-33.5));
    }

    #[test]
    fn test_other_fields_carry_over() {
        let m = normalize_record(raw(Some("1"), None));
        assert_eq!(m.name.as_deref(), Some("Test"));
        assert_eq!(m.recclass.as_deref(), Some("Iron, IIAB"));
        assert_eq!(m.mass_grams, Some(10.0));
        assert_eq!(m.year, Some(1900));
        assert_eq!(m.lat, Some(1.0));
        assert_eq!(m.long, None);
        assert_eq!(m.coordinates(), None);
    }

    #[test]
    fn test_normalizing_twice_is_a_no_op() {
        let inputs = vec![
            raw(Some(" 50.775000 "), Some("6.083330")),
            raw(Some(""), Some("  ")),
            raw(Some("-84.0"), Some("abc")),
            raw(Some("0"), Some("-0.000001")),
        ];
        let once = normalize_all(inputs);
        let twice = normalize_all(once.iter().map(as_raw).collect());
        assert_eq!(once, twice);
    }
}
