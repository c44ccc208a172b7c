/// Physical reference values and unit conversion constants shared across the
/// pipeline. Anything recalibration might touch lives in `CatalogConfig`; these
/// are the defaults it starts from.

// Unit conversions into the canonical units
pub const JUPITER_MASS_IN_EARTH: f64 = 317.8;
pub const JUPITER_RADIUS_IN_EARTH: f64 = 11.2;
pub const PARSEC_IN_LIGHT_YEARS: f64 = 3.26;
pub const DAYS_PER_YEAR: f64 = 365.25;
pub const HOURS_PER_DAY: f64 = 24.0;

// Solar references
pub const SUN_TEMPERATURE_K: f64 = 5778.0;

// Earth references used by the similarity index
pub const EARTH_RADIUS_RATIO: f64 = 1.0;
pub const EARTH_GRAVITY_RATIO: f64 = 1.0;
/// Earth's equilibrium temperature with a 0.3 bond albedo.
pub const EARTH_EQUILIBRIUM_TEMP_K: f64 = 254.6;

/// First confirmed exoplanet discovery year accepted by validation.
pub const FIRST_DISCOVERY_YEAR: i32 = 1989;

/// Tokens treated as "no value" in raw text cells (compared lowercased, trimmed).
pub const DEFAULT_MISSING_TOKENS: &[&str] = &[
    "", "unknown", "n/a", "na", "nan", "null", "none", "-", "--", "?",
];

// Raw source column names (NASA Exoplanet Archive layout)
pub const COL_PLANET_NAME: &str = "pl_name";
pub const COL_HOST_STAR: &str = "hostname";
pub const COL_DISCOVERY_METHOD: &str = "discoverymethod";
pub const COL_DISCOVERY_YEAR: &str = "disc_year";
pub const COL_MASS_EARTH: &str = "pl_bmasse";
pub const COL_MASS_JUPITER: &str = "pl_bmassj";
pub const COL_MIN_MASS_EARTH: &str = "pl_msinie";
pub const COL_MIN_MASS_JUPITER: &str = "pl_msinij";
pub const COL_RADIUS_EARTH: &str = "pl_rade";
pub const COL_RADIUS_JUPITER: &str = "pl_radj";
pub const COL_ORBITAL_PERIOD: &str = "pl_orbper";
pub const COL_SEMI_MAJOR_AXIS: &str = "pl_orbsmax";
pub const COL_DISTANCE_PC: &str = "sy_dist";
pub const COL_PARALLAX_MAS: &str = "sy_plx";
pub const COL_STAR_TEMPERATURE: &str = "st_teff";
pub const COL_STAR_RADIUS: &str = "st_rad";
pub const COL_STAR_LUMINOSITY: &str = "st_lum";
pub const COL_SPECTRAL_TYPE: &str = "st_spectype";

/// Record set location when no `--store` flag is given
pub const DEFAULT_STORE_PATH: &str = "data/planets.json";
/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "EXO_CATALOG_CONFIG";
