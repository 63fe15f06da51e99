use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use tracing::info;

use crate::domain::{CountryImpact, DestructiveMeteorite};
use crate::observability::metrics;

/// Round half away from zero to two decimal places.
///
/// Rounds the shortest decimal form of `value`, so `1.005` becomes `1.01`
/// even though its binary value sits just below the midpoint. Values too
/// large for `Decimal` have no fractional part and pass through.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    match value.to_string().parse::<Decimal>() {
        Ok(decimal) => decimal
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(value),
        Err(_) => value,
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    total_mass: f64,
    max_mass: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, mass: f64) {
        self.count += 1;
        self.total_mass += mass;
        self.max_mass = Some(match self.max_mass {
            // NaN counts as the largest value
            Some(current) if current.is_nan() || current >= mass => current,
            _ => mass,
        });
    }
}

/// Group destructive meteorites by country.
///
/// Ordered by impact count, highest first; equal counts are ordered by
/// country name.
pub fn aggregate_by_country(records: &[DestructiveMeteorite]) -> Vec<CountryImpact> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for record in records {
        groups
            .entry(record.record.country.as_str())
            .or_default()
            .add(record.mass_grams);
    }

    let mut impacts: Vec<CountryImpact> = groups
        .into_iter()
        .map(|(country, acc)| CountryImpact {
            country: country.to_string(),
            total_impacts: acc.count,
            avg_mass: round2(acc.total_mass / acc.count as f64),
            max_mass: round2(acc.max_mass.unwrap_or_default()),
        })
        .collect();
    impacts.sort_by(|a, b| {
        b.total_impacts
            .cmp(&a.total_impacts)
            .then_with(|| a.country.cmp(&b.country))
    });

    metrics::aggregate::countries(impacts.len());
    info!(countries = impacts.len(), "Aggregated destructive impacts by country");
    impacts
}
