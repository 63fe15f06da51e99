// Pipeline processing: normalization, enrichment, scoring, and aggregation

pub mod aggregate;
pub mod destructiveness;
pub mod enrich;
pub mod normalize;

pub use aggregate::aggregate_by_country;
pub use destructiveness::{DestructivenessScorer, ScoringConfig};
pub use enrich::{CountryEnricher, EnrichStats};
pub use normalize::normalize_all;
