// Infrastructure adapters: geocoding, the country registry, and report output

pub mod country_registry;
pub mod offline_geocoder;
pub mod report_writer;
