/// Column names of the landings dataset, in file order.
/// Columns are bound by position, so these are only used for display.
pub const COL_NAME: &str = "name";
pub const COL_ID: &str = "id";
pub const COL_NAMETYPE: &str = "nametype";
pub const COL_RECCLASS: &str = "recclass";
pub const COL_MASS: &str = "mass (g)";
pub const COL_FALL: &str = "fall";
pub const COL_YEAR: &str = "year";
pub const COL_RECLAT: &str = "reclat";
pub const COL_RECLONG: &str = "reclong";
pub const COL_GEOLOCATION: &str = "GeoLocation";

// Derived columns
pub const COL_LAT: &str = "lat";
pub const COL_LONG: &str = "long";
pub const COL_COUNTRY: &str = "country";
pub const COL_DESTRUCTION_SCORE: &str = "destruction_score";
pub const COL_TOTAL_IMPACTS: &str = "total_impacts";
pub const COL_AVG_MASS: &str = "avg_mass";
pub const COL_MAX_MASS: &str = "max_mass";

/// Number of columns the reader binds; anything past this is ignored.
pub const SCHEMA_WIDTH: usize = 10;

/// Country value used whenever a row cannot be resolved to a mapped country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Defaults used when neither CLI, environment nor config file provide a value
pub const DEFAULT_INPUT_PATH: &str = "data/meteorites.csv";
pub const DEFAULT_CONFIG_PATH: &str = "meteor_report.toml";
pub const DEFAULT_REPORT_ROWS: usize = 10;

pub const INPUT_PATH_ENV: &str = "METEOR_INPUT_PATH";

/// Width of the `=` rule printed before every report checkpoint
pub const SEPARATOR_WIDTH: usize = 60;
