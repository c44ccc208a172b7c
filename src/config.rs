//! Externally overridable tables: unit conversions, classification
//! boundaries, habitability rule thresholds, validation ranges and category
//! constants. Every section falls back to its default when absent from the
//! TOML file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::domain::{PlanetType, StarType};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub units: UnitsConfig,
    pub classification: ClassificationConfig,
    pub habitability: HabitabilityConfig,
    pub esi: EsiConfig,
    pub validation: ValidationConfig,
    pub categories: CategoryConfig,
}

impl CatalogConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject tables the classifiers cannot consume.
    pub fn validate(&self) -> Result<()> {
        self.units.validate()?;
        self.classification.validate()?;
        self.habitability.validate()?;
        self.esi.validate()?;
        Ok(())
    }
}

// ============================================================================
// Units
// ============================================================================

/// How a raw number is transformed before the unit factor is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Linear,
    /// Raw value is log10 of the quantity
    Log10,
    /// Raw value is a parallax in milliarcseconds; yields parsecs
    ParallaxMas,
}

/// A raw column feeding a canonical field, with the unit its values carry
/// when they have no annotation of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub column: String,
    pub unit: String,
    #[serde(default)]
    pub scale: Scale,
    /// Marks minimum-mass (M sin i) columns
    #[serde(default)]
    pub minimum: bool,
}

impl SourceColumn {
    fn new(column: &str, unit: &str) -> Self {
        Self {
            column: column.to_string(),
            unit: unit.to_string(),
            scale: Scale::Linear,
            minimum: false,
        }
    }

    fn scaled(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    fn minimum(mut self) -> Self {
        self.minimum = true;
        self
    }
}

/// Source columns for one canonical field plus its unit → factor table.
/// Factors convert one unit into the canonical unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldUnits {
    pub columns: Vec<SourceColumn>,
    pub factors: BTreeMap<String, f64>,
}

impl FieldUnits {
    fn new(columns: Vec<SourceColumn>, factors: &[(&str, f64)]) -> Self {
        Self {
            columns,
            factors: factors
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Factor for a unit token; tolerates case, surrounding whitespace and a
    /// trailing plural "s".
    pub fn factor(&self, unit: &str) -> Option<f64> {
        let key = unit.trim().to_lowercase();
        if let Some(f) = self.factors.get(&key) {
            return Some(*f);
        }
        key.strip_suffix('s')
            .and_then(|singular| self.factors.get(singular.trim_end()))
            .copied()
    }

    fn validate(&self, field: &str) -> Result<()> {
        for (unit, factor) in &self.factors {
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(CatalogError::Config(format!(
                    "units.{}: factor for '{}' must be positive, got {}",
                    field, unit, factor
                )));
            }
        }
        for col in &self.columns {
            if self.factor(&col.unit).is_none() {
                return Err(CatalogError::Config(format!(
                    "units.{}: column '{}' uses unit '{}' with no conversion factor",
                    field, col.column, col.unit
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub missing_tokens: Vec<String>,
    pub name_columns: Vec<String>,
    pub host_star_columns: Vec<String>,
    pub discovery_method_columns: Vec<String>,
    pub discovery_year_columns: Vec<String>,
    pub spectral_type_columns: Vec<String>,
    pub mass: FieldUnits,
    pub radius: FieldUnits,
    pub gravity: FieldUnits,
    pub orbital_period: FieldUnits,
    pub semi_major_axis: FieldUnits,
    pub distance: FieldUnits,
    pub star_temperature: FieldUnits,
    pub star_radius: FieldUnits,
    pub star_luminosity: FieldUnits,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for UnitsConfig {
    fn default() -> Self {
        let jm = JUPITER_MASS_IN_EARTH;
        let jr = JUPITER_RADIUS_IN_EARTH;
        let pc = PARSEC_IN_LIGHT_YEARS;

        Self {
            missing_tokens: strings(DEFAULT_MISSING_TOKENS),
            name_columns: strings(&[COL_PLANET_NAME, "planet_name", "name"]),
            host_star_columns: strings(&[COL_HOST_STAR, "host_star"]),
            discovery_method_columns: strings(&[COL_DISCOVERY_METHOD, "discovery_method"]),
            discovery_year_columns: strings(&[COL_DISCOVERY_YEAR, "discovery_year"]),
            spectral_type_columns: strings(&[COL_SPECTRAL_TYPE, "spectral_type"]),
            mass: FieldUnits::new(
                vec![
                    SourceColumn::new(COL_MASS_EARTH, "earth"),
                    SourceColumn::new(COL_MASS_JUPITER, "jupiter"),
                    SourceColumn::new(COL_MIN_MASS_EARTH, "earth").minimum(),
                    SourceColumn::new(COL_MIN_MASS_JUPITER, "jupiter").minimum(),
                    SourceColumn::new("mass_ratio_raw", "earth"),
                ],
                &[
                    ("earth", 1.0),
                    ("earth mass", 1.0),
                    ("earth masses", 1.0),
                    ("me", 1.0),
                    ("m_earth", 1.0),
                    ("jupiter", jm),
                    ("jupiter mass", jm),
                    ("jupiter masses", jm),
                    ("mj", jm),
                    ("mjup", jm),
                    ("m_jup", jm),
                ],
            ),
            radius: FieldUnits::new(
                vec![
                    SourceColumn::new(COL_RADIUS_EARTH, "earth"),
                    SourceColumn::new(COL_RADIUS_JUPITER, "jupiter"),
                    SourceColumn::new("radius_ratio_raw", "earth"),
                ],
                &[
                    ("earth", 1.0),
                    ("earth radius", 1.0),
                    ("earth radii", 1.0),
                    ("re", 1.0),
                    ("r_earth", 1.0),
                    ("jupiter", jr),
                    ("jupiter radius", jr),
                    ("jupiter radii", jr),
                    ("rj", jr),
                    ("rjup", jr),
                    ("r_jup", jr),
                ],
            ),
            gravity: FieldUnits::new(
                vec![SourceColumn::new("gravity_ratio_raw", "earth")],
                &[("earth", 1.0), ("g", 1.0), ("earth gravity", 1.0)],
            ),
            orbital_period: FieldUnits::new(
                vec![
                    SourceColumn::new(COL_ORBITAL_PERIOD, "day"),
                    SourceColumn::new("orbital_period_raw", "day"),
                ],
                &[
                    ("day", 1.0),
                    ("d", 1.0),
                    ("hour", 1.0 / HOURS_PER_DAY),
                    ("hr", 1.0 / HOURS_PER_DAY),
                    ("h", 1.0 / HOURS_PER_DAY),
                    ("year", DAYS_PER_YEAR),
                    ("yr", DAYS_PER_YEAR),
                ],
            ),
            semi_major_axis: FieldUnits::new(
                vec![SourceColumn::new(COL_SEMI_MAJOR_AXIS, "au")],
                &[("au", 1.0), ("astronomical unit", 1.0)],
            ),
            distance: FieldUnits::new(
                vec![
                    SourceColumn::new(COL_DISTANCE_PC, "parsec"),
                    SourceColumn::new("distance_raw", "light year"),
                    SourceColumn::new(COL_PARALLAX_MAS, "parsec").scaled(Scale::ParallaxMas),
                ],
                &[
                    ("parsec", pc),
                    ("pc", pc),
                    ("light year", 1.0),
                    ("light-year", 1.0),
                    ("ly", 1.0),
                ],
            ),
            star_temperature: FieldUnits::new(
                vec![SourceColumn::new(COL_STAR_TEMPERATURE, "kelvin")],
                &[("kelvin", 1.0), ("k", 1.0)],
            ),
            star_radius: FieldUnits::new(
                vec![SourceColumn::new(COL_STAR_RADIUS, "solar")],
                &[("solar", 1.0), ("solar radius", 1.0), ("solar radii", 1.0), ("rsun", 1.0)],
            ),
            star_luminosity: FieldUnits::new(
                vec![SourceColumn::new(COL_STAR_LUMINOSITY, "solar").scaled(Scale::Log10)],
                &[("solar", 1.0), ("solar luminosity", 1.0), ("lsun", 1.0)],
            ),
        }
    }
}

impl UnitsConfig {
    fn validate(&self) -> Result<()> {
        if self.name_columns.is_empty() {
            return Err(CatalogError::Config(
                "units.name_columns must list at least one column".to_string(),
            ));
        }
        for (field, units) in self.numeric_fields() {
            units.validate(field)?;
        }
        Ok(())
    }

    pub fn numeric_fields(&self) -> [(&'static str, &FieldUnits); 9] {
        [
            ("mass", &self.mass),
            ("radius", &self.radius),
            ("gravity", &self.gravity),
            ("orbital_period", &self.orbital_period),
            ("semi_major_axis", &self.semi_major_axis),
            ("distance", &self.distance),
            ("star_temperature", &self.star_temperature),
            ("star_radius", &self.star_radius),
            ("star_luminosity", &self.star_luminosity),
        ]
    }

    pub fn is_missing_token(&self, text: &str) -> bool {
        let t = text.trim().to_lowercase();
        self.missing_tokens.iter().any(|m| m.trim().to_lowercase() == t)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// One row of the planet-type table. A planet falls into the first row whose
/// open bounds it stays below on both axes; `None` leaves an axis open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetTypeBoundary {
    pub planet_type: PlanetType,
    pub max_mass_earth: Option<f64>,
    pub max_radius_earth: Option<f64>,
}

/// One row of the star temperature table, ordered hottest first. A star
/// falls into the first row whose `min_temp_k` it exceeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarTemperatureBoundary {
    pub star_type: StarType,
    pub min_temp_k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub planet_types: Vec<PlanetTypeBoundary>,
    pub star_temperatures: Vec<StarTemperatureBoundary>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let row = |planet_type, mass: Option<f64>, radius: Option<f64>| PlanetTypeBoundary {
            planet_type,
            max_mass_earth: mass,
            max_radius_earth: radius,
        };
        let star = |star_type, min_temp_k| StarTemperatureBoundary {
            star_type,
            min_temp_k,
        };
        Self {
            planet_types: vec![
                row(PlanetType::Rocky, Some(2.0), Some(1.5)),
                row(PlanetType::SuperEarth, Some(10.0), Some(2.5)),
                row(PlanetType::NeptuneLike, Some(50.0), Some(6.0)),
                row(PlanetType::GasGiant, None, None),
            ],
            star_temperatures: vec![
                star(StarType::O, 30000.0),
                star(StarType::B, 10000.0),
                star(StarType::A, 7500.0),
                star(StarType::F, 6000.0),
                star(StarType::G, 5200.0),
                star(StarType::K, 3700.0),
                star(StarType::M, 2400.0),
                star(StarType::BrownDwarf, 0.0),
            ],
        }
    }
}

impl ClassificationConfig {
    fn validate(&self) -> Result<()> {
        if self.planet_types.is_empty() {
            return Err(CatalogError::Config(
                "classification.planet_types must not be empty".to_string(),
            ));
        }
        for pair in self.planet_types.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let widening = |x: Option<f64>, y: Option<f64>| match (x, y) {
                (Some(x), Some(y)) => x <= y,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => true,
            };
            if !widening(a.max_mass_earth, b.max_mass_earth)
                || !widening(a.max_radius_earth, b.max_radius_earth)
            {
                return Err(CatalogError::Config(format!(
                    "classification.planet_types: row '{}' must not be wider than the following row '{}'",
                    a.planet_type, b.planet_type
                )));
            }
        }
        for pair in self.star_temperatures.windows(2) {
            if pair[0].min_temp_k < pair[1].min_temp_k {
                return Err(CatalogError::Config(
                    "classification.star_temperatures must be ordered hottest first".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Habitability and ESI
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitabilityConfig {
    /// Reference stellar temperature for the zone polynomial
    pub reference_temp_k: f64,
    pub inner_sun_au: f64,
    pub outer_sun_au: f64,
    pub inner_a: f64,
    pub inner_b: f64,
    pub outer_a: f64,
    pub outer_b: f64,
    /// |hzd| at or below this is inside the zone
    pub zone_hzd: f64,
    /// Wider band accepted for "possibly habitable" around a suitable star
    pub extended_zone_hzd: f64,
    pub star_temp_min_k: f64,
    pub star_temp_max_k: f64,
    pub likely_esi: f64,
    pub possible_esi: f64,
    /// Teq = coefficient * L^(1/4) / sqrt(a)
    pub equilibrium_coefficient_k: f64,
    /// Estimate the orbit from the period (Kepler III, M = L^(1/4)) when absent
    pub estimate_orbit_from_period: bool,
}

impl Default for HabitabilityConfig {
    fn default() -> Self {
        Self {
            reference_temp_k: 5700.0,
            inner_sun_au: 0.72,
            outer_sun_au: 1.77,
            inner_a: 2.7619e-5,
            inner_b: 3.8095e-9,
            outer_a: 1.3786e-4,
            outer_b: 1.4286e-9,
            zone_hzd: 1.0,
            extended_zone_hzd: 1.5,
            star_temp_min_k: 2600.0,
            star_temp_max_k: 7200.0,
            likely_esi: 0.8,
            possible_esi: 0.6,
            equilibrium_coefficient_k: EARTH_EQUILIBRIUM_TEMP_K,
            estimate_orbit_from_period: true,
        }
    }
}

impl HabitabilityConfig {
    fn validate(&self) -> Result<()> {
        if self.star_temp_min_k >= self.star_temp_max_k {
            return Err(CatalogError::Config(
                "habitability.star_temp_min_k must be below star_temp_max_k".to_string(),
            ));
        }
        if self.possible_esi > self.likely_esi {
            return Err(CatalogError::Config(
                "habitability.possible_esi must not exceed likely_esi".to_string(),
            ));
        }
        if self.zone_hzd <= 0.0 || self.extended_zone_hzd < self.zone_hzd {
            return Err(CatalogError::Config(
                "habitability.extended_zone_hzd must be >= zone_hzd > 0".to_string(),
            ));
        }
        if self.inner_sun_au <= 0.0 || self.outer_sun_au <= self.inner_sun_au {
            return Err(CatalogError::Config(
                "habitability zone boundaries must satisfy 0 < inner < outer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Versioned Earth Similarity Index constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsiConfig {
    pub version: String,
    pub reference_radius: f64,
    pub reference_gravity: f64,
    pub reference_temp_k: f64,
    pub radius_weight: f64,
    pub gravity_weight: f64,
    pub temperature_weight: f64,
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            version: "esi-v1".to_string(),
            reference_radius: EARTH_RADIUS_RATIO,
            reference_gravity: EARTH_GRAVITY_RATIO,
            reference_temp_k: EARTH_EQUILIBRIUM_TEMP_K,
            radius_weight: 0.57,
            gravity_weight: 0.70,
            temperature_weight: 5.58,
        }
    }
}

impl EsiConfig {
    fn validate(&self) -> Result<()> {
        let refs = [
            self.reference_radius,
            self.reference_gravity,
            self.reference_temp_k,
        ];
        let weights = [
            self.radius_weight,
            self.gravity_weight,
            self.temperature_weight,
        ];
        if refs.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(CatalogError::Config(
                "esi reference values must be positive".to_string(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CatalogError::Config(
                "esi weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Validation ranges
// ============================================================================

/// Plausible range for a numeric field. Values outside it are demoted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// When true the minimum itself is rejected (strictly positive fields)
    #[serde(default)]
    pub min_exclusive: bool,
}

impl FieldRange {
    pub const fn non_negative(max: f64) -> Self {
        Self {
            min: Some(0.0),
            max: Some(max),
            min_exclusive: false,
        }
    }

    pub const fn positive(max: f64) -> Self {
        Self {
            min: Some(0.0),
            max: Some(max),
            min_exclusive: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let above_min = match self.min {
            Some(min) if self.min_exclusive => value > min,
            Some(min) => value >= min,
            None => true,
        };
        let below_max = self.max.map_or(true, |max| value <= max);
        above_min && below_max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub discovery_year_min: i32,
    /// Defaults to the current calendar year when unset
    pub discovery_year_max: Option<i32>,
    pub mass_earth: FieldRange,
    pub radius_earth: FieldRange,
    pub gravity_earth: FieldRange,
    pub orbital_period_days: FieldRange,
    pub semi_major_axis_au: FieldRange,
    pub distance_ly: FieldRange,
    pub star_temp_k: FieldRange,
    pub star_radius_solar: FieldRange,
    pub star_luminosity_solar: FieldRange,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            discovery_year_min: FIRST_DISCOVERY_YEAR,
            discovery_year_max: None,
            // 80 Jupiter masses is the hydrogen-burning limit
            mass_earth: FieldRange::non_negative(80.0 * JUPITER_MASS_IN_EARTH),
            radius_earth: FieldRange::non_negative(50.0),
            gravity_earth: FieldRange::non_negative(1000.0),
            orbital_period_days: FieldRange::positive(1.0e9),
            semi_major_axis_au: FieldRange::positive(1.0e5),
            distance_ly: FieldRange::non_negative(1.0e5),
            star_temp_k: FieldRange::positive(100_000.0),
            star_radius_solar: FieldRange::positive(5000.0),
            star_luminosity_solar: FieldRange::positive(1.0e8),
        }
    }
}

// ============================================================================
// Category filters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub earth_like_mass: (f64, f64),
    pub earth_like_radius: (f64, f64),
    pub super_earth_mass: (f64, f64),
    pub recent_years: u32,
    pub nearby_max_ly: f64,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            earth_like_mass: (0.5, 2.0),
            earth_like_radius: (0.8, 1.5),
            super_earth_mass: (1.0, 10.0),
            recent_years: 10,
            nearby_max_ly: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CatalogConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CatalogConfig::from_toml_str(
            r#"
            [habitability]
            likely_esi = 0.9

            [categories]
            recent_years = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.habitability.likely_esi, 0.9);
        assert_eq!(config.habitability.possible_esi, 0.6);
        assert_eq!(config.categories.recent_years, 5);
        assert_eq!(config.units.mass.factor("jupiter"), Some(JUPITER_MASS_IN_EARTH));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = CatalogConfig::default().to_toml_string().unwrap();
        let back = CatalogConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.classification, ClassificationConfig::default());
        assert_eq!(back.units, UnitsConfig::default());
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let mut config = CatalogConfig::default();
        config.units.mass.factors.insert("bogus".to_string(), 0.0);
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn test_rejects_unordered_planet_table() {
        let mut config = CatalogConfig::default();
        config.classification.planet_types.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unit_factor_lookup_is_lenient() {
        let units = UnitsConfig::default();
        assert_eq!(units.mass.factor("  Jupiter Masses "), Some(JUPITER_MASS_IN_EARTH));
        assert_eq!(units.orbital_period.factor("hours"), Some(1.0 / 24.0));
        assert_eq!(units.distance.factor("furlongs"), None);
    }

    #[test]
    fn test_field_range_bounds() {
        let positive = FieldRange::positive(10.0);
        assert!(!positive.contains(0.0));
        assert!(positive.contains(10.0));
        assert!(!positive.contains(f64::NAN));

        let non_negative = FieldRange::non_negative(10.0);
        assert!(non_negative.contains(0.0));
        assert!(!non_negative.contains(-0.1));
    }

    #[test]
    fn test_shipped_sample_matches_defaults() {
        let config =
            CatalogConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.toml")).unwrap();
        assert_eq!(config.classification, ClassificationConfig::default());
        assert_eq!(config.habitability, HabitabilityConfig::default());
        assert_eq!(config.esi, EsiConfig::default());
        assert_eq!(config.categories, CategoryConfig::default());
        assert_eq!(config.units.mass.factor("mjup"), Some(JUPITER_MASS_IN_EARTH));
        assert_eq!(config.units.radius, UnitsConfig::default().radius);
    }
}
