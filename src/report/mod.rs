//! Report checkpoints: which rows each stage shows and how they become tables.

pub mod table;

pub use table::{Cell, Table};

use crate::constants::*;
use crate::domain::{CountryImpact, DestructiveMeteorite, EnrichedMeteorite, Meteorite, RawMeteorite};

pub const TITLE_OLDEST: &str = "Oldest records:";
pub const TITLE_CLEANED: &str = "Drop geolocation (redundant with lat and long):";
pub const TITLE_ENRICHED: &str = "Add country from coordinates:";
pub const TITLE_DESTRUCTIVE: &str = "Most destructive meteorites:";
pub const TITLE_COUNTRIES: &str = "Countries with the most destructive meteorites recorded:";

const RAW_COLUMNS: [&str; 9] = [
    COL_NAME, COL_ID, COL_NAMETYPE, COL_RECCLASS, COL_MASS, COL_FALL, COL_YEAR, COL_RECLAT, COL_RECLONG,
];
const CLEAN_COLUMNS: [&str; 9] = [
    COL_NAME, COL_ID, COL_NAMETYPE, COL_RECCLASS, COL_MASS, COL_FALL, COL_YEAR, COL_LAT, COL_LONG,
];

/// The `limit` records with the earliest year, skipping rows without one.
///
/// Equal years keep file order.
pub fn oldest(records: &[RawMeteorite], limit: usize) -> Vec<&RawMeteorite> {
    let mut dated: Vec<&RawMeteorite> = records.iter().filter(|r| r.year.is_some()).collect();
    dated.sort_by_key(|r| r.year);
    dated.truncate(limit);
    dated
}

/// Raw rows without the combined geolocation column
pub fn raw_table(records: &[&RawMeteorite]) -> Table {
    let mut table = Table::new(&RAW_COLUMNS);
    for record in records {
        table.push_row(vec![
            Cell::text(record.name.as_deref()),
            Cell::text(record.id.as_deref()),
            Cell::text(record.nametype.as_deref()),
            Cell::text(record.recclass.as_deref()),
            Cell::float(record.mass_grams),
            Cell::text(record.fall.as_deref()),
            Cell::int(record.year.map(i64::from)),
            Cell::text(record.reclat.as_deref()),
            Cell::text(record.reclong.as_deref()),
        ]);
    }
    table
}

fn meteorite_cells(record: &Meteorite) -> Vec<Cell> {
    vec![
        Cell::text(record.name.as_deref()),
        Cell::text(record.id.as_deref()),
        Cell::text(record.nametype.as_deref()),
        Cell::text(record.recclass.as_deref()),
        Cell::float(record.mass_grams),
        Cell::text(record.fall.as_deref()),
        Cell::int(record.year.map(i64::from)),
        Cell::float(record.lat),
        Cell::float(record.long),
    ]
}

pub fn cleaned_table(records: &[Meteorite], limit: usize) -> Table {
    let mut table = Table::new(&CLEAN_COLUMNS);
    for record in records.iter().take(limit) {
        table.push_row(meteorite_cells(record));
    }
    table.with_total_rows(records.len())
}

fn enriched_cells(record: &EnrichedMeteorite) -> Vec<Cell> {
    let mut cells = meteorite_cells(&record.meteorite);
    cells.push(Cell::Text(record.country.clone()));
    cells
}

pub fn enriched_table(records: &[EnrichedMeteorite], limit: usize) -> Table {
    let mut columns = CLEAN_COLUMNS.to_vec();
    columns.push(COL_COUNTRY);
    let mut table = Table::new(&columns);
    for record in records.iter().take(limit) {
        table.push_row(enriched_cells(record));
    }
    table.with_total_rows(records.len())
}

pub fn destructive_table(records: &[DestructiveMeteorite], limit: usize) -> Table {
    let mut columns = CLEAN_COLUMNS.to_vec();
    columns.extend([COL_COUNTRY, COL_DESTRUCTION_SCORE]);
    let mut table = Table::new(&columns);
    for record in records.iter().take(limit) {
        let mut cells = enriched_cells(&record.record);
        cells.push(Cell::Float(record.destruction_score));
        table.push_row(cells);
    }
    table.with_total_rows(records.len())
}

pub fn country_table(impacts: &[CountryImpact], limit: usize) -> Table {
    let mut table = Table::new(&[COL_COUNTRY, COL_TOTAL_IMPACTS, COL_AVG_MASS, COL_MAX_MASS]);
    for impact in impacts.iter().take(limit) {
        table.push_row(vec![
            Cell::Text(impact.country.clone()),
            Cell::Int(impact.total_impacts as i64),
            Cell::Float(impact.avg_mass),
            Cell::Float(impact.max_mass),
        ]);
    }
    table.with_total_rows(impacts.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, year: Option<i32>) -> RawMeteorite {
        RawMeteorite {
            id: Some(id.to_string()),
            year,
            geolocation: Some("(1.0, 2.0)".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_oldest_skips_null_years_and_sorts_ascending() {
        let mut records = vec![raw("undated", None)];
        for (i, year) in [1950, 1880, 2001, 1880, 1700, 1999, 1815, 1920, 1600, 1990, 1850, 1901]
            .into_iter()
            .enumerate()
        {
            records.push(raw(&format!("r{}", i), Some(year)));
        }
        records.push(raw("undated-2", None));

        let oldest = oldest(&records, 10);
        assert_eq!(oldest.len(), 10);
        assert!(oldest.iter().all(|r| r.year.is_some()));
        let years: Vec<i32> = oldest.iter().map(|r| r.year.unwrap()).collect();
        let mut sorted = years.clone();
        sorted.sort();
        assert_eq!(years, sorted);
        assert_eq!(years[0], 1600);
        // Equal years keep file order
        assert_eq!(oldest[4].id.as_deref(), Some("r1"));
        assert_eq!(oldest[5].id.as_deref(), Some("r3"));
    }

    #[test]
    fn test_raw_table_drops_geolocation() {
        let records = vec![raw("1", Some(1880))];
        let refs: Vec<&RawMeteorite> = records.iter().collect();
        let table = raw_table(&refs);
        assert!(!table.columns().iter().any(|c| c == COL_GEOLOCATION));
        assert_eq!(table.columns().len(), 9);
        assert_eq!(table.rows()[0][6], Cell::Int(1880));
    }

    #[test]
    fn test_enriched_table_appends_country() {
        let records = vec![
            EnrichedMeteorite {
                meteorite: Meteorite {
                    lat: Some(50.775),
                    ..Default::default()
                },
                country: "Germany".to_string(),
            };
            12
        ];
        let table = enriched_table(&records, 10);
        assert_eq!(table.columns().last().map(String::as_str), Some(COL_COUNTRY));
        assert_eq!(table.rows().len(), 10);
        assert_eq!(table.rows()[0][7], Cell::Float(50.775));
        assert!(table.render().contains("only showing top 10 rows"));
    }

    #[test]
    fn test_country_table_columns() {
        let table = country_table(
            &[CountryImpact {
                country: "A".to_string(),
                total_impacts: 2,
                avg_mass: 200.0,
                max_mass: 300.0,
            }],
            10,
        );
        let rendered = table.render();
        assert!(rendered.contains("|country|total_impacts|avg_mass|max_mass|"));
        assert!(rendered.contains("|A      |2            |200.0   |300.0   |"));
    }
}
