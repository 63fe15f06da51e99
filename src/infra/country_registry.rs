use isocountry::CountryCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The ISO 3166-1 table, built on first use and never modified afterwards
static COUNTRY_MAPPING: Lazy<CountryMapping> = Lazy::new(CountryMapping::from_registry);

/// Read-only lookup from two-letter country code to display name.
#[derive(Debug, Clone, Default)]
pub struct CountryMapping {
    names: HashMap<String, String>,
}

impl CountryMapping {
    /// The process-wide table built from the ISO registry
    pub fn global() -> &'static CountryMapping {
        &COUNTRY_MAPPING
    }

    /// Build the table from every alpha-2 code in the ISO registry
    pub fn from_registry() -> Self {
        CountryCode::iter()
            .map(|code| (code.alpha2().to_string(), code.name().to_string()))
            .collect()
    }

    /// Lookup by exact code; codes are upper case (`"DE"`)
    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CountryMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_common_codes() {
        let mapping = CountryMapping::global();
        assert!(mapping.len() >= 240);
        assert_eq!(mapping.name_for("DE"), Some("Germany"));
        assert_eq!(mapping.name_for("FR"), Some("France"));
    }

    #[test]
    fn test_unmapped_code() {
        let mapping = CountryMapping::global();
        assert_eq!(mapping.name_for("XX"), None);
        assert_eq!(mapping.name_for(""), None);
        assert_eq!(mapping.name_for("de"), None);
    }

    #[test]
    fn test_from_pairs() {
        let mapping: CountryMapping = [("AA", "Atlantis")].into_iter().collect();
        assert_eq!(mapping.name_for("AA"), Some("Atlantis"));
        assert_eq!(mapping.len(), 1);
    }
}
