//! Ordered boundary tables and the one classifier that walks them.

use crate::config::{PlanetTypeBoundary, StarTemperatureBoundary};
use crate::domain::{PlanetType, StarType};

/// One row of a declarative threshold table.
pub trait Boundary {
    type Input: ?Sized;
    type Output;

    fn admits(&self, input: &Self::Input) -> bool;
    fn output(&self) -> Self::Output;
}

/// Output of the first row that admits `input`.
pub fn classify<B: Boundary>(table: &[B], input: &B::Input) -> Option<B::Output> {
    table.iter().find(|row| row.admits(input)).map(B::output)
}

/// Mass and radius, both as Earth ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassRadius {
    pub mass_earth: f64,
    pub radius_earth: f64,
}

impl Boundary for PlanetTypeBoundary {
    type Input = MassRadius;
    type Output = PlanetType;

    fn admits(&self, input: &MassRadius) -> bool {
        let below = |value: f64, max: Option<f64>| max.map_or(true, |m| value < m);
        below(input.mass_earth, self.max_mass_earth)
            && below(input.radius_earth, self.max_radius_earth)
    }

    fn output(&self) -> PlanetType {
        self.planet_type
    }
}

impl Boundary for StarTemperatureBoundary {
    type Input = f64;
    type Output = StarType;

    fn admits(&self, temp_k: &f64) -> bool {
        *temp_k > self.min_temp_k
    }

    fn output(&self) -> StarType {
        self.star_type
    }
}

/// Explanation bucket: values below `below` get `text`.
#[derive(Debug, Clone, Copy)]
pub struct TextBucket {
    pub below: f64,
    pub text: &'static str,
}

impl Boundary for TextBucket {
    type Input = f64;
    type Output = &'static str;

    fn admits(&self, value: &f64) -> bool {
        *value < self.below
    }

    fn output(&self) -> &'static str {
        self.text
    }
}

/// Planet type from both ratios; a partial pair is never guessed from.
pub fn planet_type(
    table: &[PlanetTypeBoundary],
    mass_earth: Option<f64>,
    radius_earth: Option<f64>,
) -> PlanetType {
    match (mass_earth, radius_earth) {
        (Some(mass_earth), Some(radius_earth)) => classify(
            table,
            &MassRadius {
                mass_earth,
                radius_earth,
            },
        )
        .unwrap_or(PlanetType::Unknown),
        _ => PlanetType::Unknown,
    }
}

/// Star type from the spectral letter, else from the temperature table.
pub fn star_type(
    table: &[StarTemperatureBoundary],
    spectral_type: Option<&str>,
    temp_k: Option<f64>,
) -> StarType {
    spectral_type
        .and_then(|s| s.trim().chars().next())
        .and_then(StarType::from_spectral_letter)
        .or_else(|| temp_k.and_then(|t| classify(table, &t)))
        .unwrap_or(StarType::Unknown)
}

/// True for giant luminosity classes (I, II, III), e.g. "K1 III".
pub fn is_giant(spectral_type: &str) -> bool {
    let class = spectral_type
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-' || c == '/')
        .trim_start();
    class.starts_with('I') && !class.starts_with("IV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationConfig;

    #[test]
    fn test_planet_type_boundaries() {
        let table = ClassificationConfig::default().planet_types;
        let pt = |m, r| planet_type(&table, Some(m), Some(r));
        assert_eq!(pt(1.0, 1.0), PlanetType::Rocky);
        assert_eq!(pt(1.9, 1.6), PlanetType::SuperEarth);
        assert_eq!(pt(2.0, 1.0), PlanetType::SuperEarth);
        assert_eq!(pt(17.0, 3.9), PlanetType::NeptuneLike);
        assert_eq!(pt(317.8, 11.2), PlanetType::GasGiant);
    }

    #[test]
    fn test_partial_inputs_are_unknown() {
        let table = ClassificationConfig::default().planet_types;
        assert_eq!(planet_type(&table, Some(1.0), None), PlanetType::Unknown);
        assert_eq!(planet_type(&table, None, Some(1.0)), PlanetType::Unknown);
    }

    #[test]
    fn test_star_type_prefers_spectral_letter() {
        let table = ClassificationConfig::default().star_temperatures;
        assert_eq!(star_type(&table, Some("M4.5 V"), Some(6000.0)), StarType::M);
        assert_eq!(star_type(&table, Some("L2"), None), StarType::BrownDwarf);
        assert_eq!(star_type(&table, None, Some(5778.0)), StarType::G);
        assert_eq!(star_type(&table, Some("?"), Some(3000.0)), StarType::M);
        assert_eq!(star_type(&table, None, Some(2000.0)), StarType::BrownDwarf);
        assert_eq!(star_type(&table, None, None), StarType::Unknown);
    }

    #[test]
    fn test_giant_luminosity_class() {
        assert!(is_giant("K1 III"));
        assert!(is_giant("G8III"));
        assert!(!is_giant("G2 V"));
        assert!(!is_giant("K0 IV"));
        assert!(!is_giant("M3"));
    }

    #[test]
    fn test_first_matching_bucket_wins() {
        let buckets = [
            TextBucket { below: 1.0, text: "small" },
            TextBucket { below: f64::INFINITY, text: "large" },
        ];
        assert_eq!(classify(&buckets, &0.5), Some("small"));
        assert_eq!(classify(&buckets, &1.0), Some("large"));
    }
}
