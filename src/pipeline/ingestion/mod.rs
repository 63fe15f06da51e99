// Pipeline ingestion: schema-bound reading of the landings dataset

pub mod reader;

pub use reader::{IngestStats, LandingsReader, ReaderOptions};
