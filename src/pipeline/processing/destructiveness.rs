use serde::Deserialize;
use tracing::info;

use crate::domain::{DestructiveMeteorite, EnrichedMeteorite};
use crate::error::{ReportError, Result};
use crate::observability::metrics;

/// One classification rule: the first rule whose pattern occurs in the
/// classification decides the multiplier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiplierRule {
    pub pattern: String,
    pub multiplier: f64,
}

impl MultiplierRule {
    pub fn new(pattern: &str, multiplier: f64) -> Self {
        Self {
            pattern: pattern.to_string(),
            multiplier,
        }
    }
}

/// Scoring rules for the destructiveness heuristic.
///
/// The assumption behind the defaults: heavier meteorites carry more impact
/// energy, and metallic ones survive atmospheric entry better.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Only classifications containing this text are scored
    pub class_filter: String,
    pub base_factor: f64,
    /// Checked in order; `IIIAB` must come before `IIAB` since it contains it
    pub multipliers: Vec<MultiplierRule>,
    pub default_multiplier: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            class_filter: "Iron".to_string(),
            base_factor: 1.75,
            multipliers: vec![
                MultiplierRule::new("IIIAB", 1.5),
                MultiplierRule::new("IIAB", 1.25),
            ],
            default_multiplier: 1.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        if self.class_filter.is_empty() {
            return Err(ReportError::Config("scoring.class_filter must not be empty".to_string()));
        }
        if !self.base_factor.is_finite() || !self.default_multiplier.is_finite() {
            return Err(ReportError::Config("scoring factors must be finite".to_string()));
        }
        if let Some(rule) = self
            .multipliers
            .iter()
            .find(|rule| rule.pattern.is_empty() || !rule.multiplier.is_finite())
        {
            return Err(ReportError::Config(format!(
                "invalid scoring multiplier rule {:?}",
                rule
            )));
        }
        Ok(())
    }

    /// Multiplier for a classification string
    pub fn multiplier_for(&self, classification: &str) -> f64 {
        self.multipliers
            .iter()
            .find(|rule| classification.contains(&rule.pattern))
            .map_or(self.default_multiplier, |rule| rule.multiplier)
    }

    pub fn score(&self, mass_grams: f64, classification: &str) -> f64 {
        mass_grams * self.base_factor * self.multiplier_for(classification)
    }
}

/// Keeps iron meteorites with known mass and scores them
pub struct DestructivenessScorer {
    config: ScoringConfig,
}

impl DestructivenessScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one row, or `None` when it does not qualify
    pub fn score(&self, record: EnrichedMeteorite) -> Option<DestructiveMeteorite> {
        let mass_grams = record.meteorite.mass_grams?;
        let classification = record.meteorite.recclass.as_deref()?;
        if !classification.contains(self.config.class_filter.as_str()) {
            return None;
        }
        let destruction_score = self.config.score(mass_grams, classification);
        Some(DestructiveMeteorite {
            record,
            mass_grams,
            destruction_score,
        })
    }

    /// Score every qualifying row, highest score first.
    ///
    /// The sort is stable, so equal scores keep their input order. NaN scores
    /// rank above every number.
    pub fn rank(&self, records: Vec<EnrichedMeteorite>) -> Vec<DestructiveMeteorite> {
        let total = records.len();
        let mut scored: Vec<DestructiveMeteorite> =
            records.into_iter().filter_map(|record| self.score(record)).collect();
        scored.sort_by(|a, b| descending(a.destruction_score, b.destruction_score));

        metrics::score::rows_scored(scored.len());
        metrics::score::rows_filtered(total - scored.len());
        info!(scored = scored.len(), filtered = total - scored.len(), "Scored destructive meteorites");
        scored
    }
}

impl Default for DestructivenessScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn descending(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => b.total_cmp(&a),
    }
}
