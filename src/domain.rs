//! Canonical catalog entities.
//!
//! Every numeric attribute is a [`Measure`]: either a validated value in its
//! canonical unit or an explicit `Unknown`. Nothing downstream ever sees a raw
//! string or a zero standing in for "missing".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric attribute that is either known or explicitly unknown.
///
/// Serialized as the bare value or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<T>", into = "Option<T>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub enum Measure<T = f64> {
    Known(T),
    #[default]
    Unknown,
}

impl<T: Copy> Measure<T> {
    pub fn known(value: T) -> Self {
        Measure::Known(value)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Measure::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Measure::Unknown)
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Measure::Known(v) => Some(*v),
            Measure::Unknown => None,
        }
    }

    pub fn map<U: Copy>(self, f: impl FnOnce(T) -> U) -> Measure<U> {
        match self {
            Measure::Known(v) => Measure::Known(f(v)),
            Measure::Unknown => Measure::Unknown,
        }
    }
}

impl<T> From<Option<T>> for Measure<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Measure::Known(v),
            None => Measure::Unknown,
        }
    }
}

impl<T> From<Measure<T>> for Option<T> {
    fn from(value: Measure<T>) -> Self {
        match value {
            Measure::Known(v) => Some(v),
            Measure::Unknown => None,
        }
    }
}

/// Mass class derived from mass and radius ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum PlanetType {
    Rocky,
    #[serde(rename = "Super-Earth")]
    SuperEarth,
    #[serde(rename = "Neptune-like")]
    NeptuneLike,
    #[serde(rename = "Gas Giant")]
    GasGiant,
    #[default]
    Unknown,
}

impl PlanetType {
    pub fn label(&self) -> &'static str {
        match self {
            PlanetType::Rocky => "Rocky",
            PlanetType::SuperEarth => "Super-Earth",
            PlanetType::NeptuneLike => "Neptune-like",
            PlanetType::GasGiant => "Gas Giant",
            PlanetType::Unknown => "Unknown",
        }
    }

    pub fn all() -> [PlanetType; 5] {
        [
            PlanetType::Rocky,
            PlanetType::SuperEarth,
            PlanetType::NeptuneLike,
            PlanetType::GasGiant,
            PlanetType::Unknown,
        ]
    }
}

/// Host star spectral class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StarType {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
    #[serde(rename = "Brown Dwarf")]
    BrownDwarf,
    #[default]
    Unknown,
}

impl StarType {
    pub fn label(&self) -> &'static str {
        match self {
            StarType::O => "O",
            StarType::B => "B",
            StarType::A => "A",
            StarType::F => "F",
            StarType::G => "G",
            StarType::K => "K",
            StarType::M => "M",
            StarType::BrownDwarf => "Brown Dwarf",
            StarType::Unknown => "Unknown",
        }
    }

    pub fn all() -> [StarType; 9] {
        [
            StarType::O,
            StarType::B,
            StarType::A,
            StarType::F,
            StarType::G,
            StarType::K,
            StarType::M,
            StarType::BrownDwarf,
            StarType::Unknown,
        ]
    }

    /// Spectral class from the leading letter of a spectral type string.
    pub fn from_spectral_letter(letter: char) -> Option<StarType> {
        match letter.to_ascii_uppercase() {
            'O' => Some(StarType::O),
            'B' => Some(StarType::B),
            'A' => Some(StarType::A),
            'F' => Some(StarType::F),
            'G' => Some(StarType::G),
            'K' => Some(StarType::K),
            'M' => Some(StarType::M),
            'L' | 'T' | 'Y' => Some(StarType::BrownDwarf),
            _ => None,
        }
    }
}

/// Habitability assessment. `InsufficientData` is distinct from `NotHabitable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Habitability {
    #[serde(rename = "Likely Habitable")]
    LikelyHabitable,
    #[serde(rename = "Possibly Habitable")]
    PossiblyHabitable,
    #[serde(rename = "Not Habitable")]
    NotHabitable,
    #[default]
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Habitability {
    pub fn label(&self) -> &'static str {
        match self {
            Habitability::LikelyHabitable => "Likely Habitable",
            Habitability::PossiblyHabitable => "Possibly Habitable",
            Habitability::NotHabitable => "Not Habitable",
            Habitability::InsufficientData => "Insufficient Data",
        }
    }

    pub fn all() -> [Habitability; 4] {
        [
            Habitability::LikelyHabitable,
            Habitability::PossiblyHabitable,
            Habitability::NotHabitable,
            Habitability::InsufficientData,
        ]
    }

    pub fn is_habitable(&self) -> bool {
        matches!(
            self,
            Habitability::LikelyHabitable | Habitability::PossiblyHabitable
        )
    }
}

/// Case-insensitive match against a label, ignoring spaces, dashes and underscores.
fn loose_eq(label: &str, input: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect()
    };
    squash(label) == squash(input)
}

macro_rules! labelled_enum {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::all()
                    .into_iter()
                    .find(|v| loose_eq(v.label(), s) || loose_eq(&format!("{:?}", v), s))
                    .ok_or_else(|| format!("unrecognized value '{}'", s))
            }
        }
    };
}

labelled_enum!(PlanetType);
labelled_enum!(StarType);
labelled_enum!(Habitability);

/// Physical attributes in canonical units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalProperties {
    /// Mass as a ratio to Earth's
    pub mass_earth: Measure,
    /// True when the mass came from a minimum-mass (M sin i) column
    #[serde(default)]
    pub minimum_mass: bool,
    pub radius_earth: Measure,
    pub gravity_earth: Measure,
    pub orbital_period_days: Measure,
    pub semi_major_axis_au: Measure,
    pub distance_ly: Measure,
    pub star_temp_k: Measure,
    pub star_radius_solar: Measure,
    pub star_luminosity_solar: Measure,
    pub spectral_type: Option<String>,
}

/// Habitable-zone geometry around the host star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitableZone {
    pub inner_au: f64,
    pub outer_au: f64,
    /// Signed distance from the zone centre in half-widths; |hzd| <= 1 is inside
    pub hzd: f64,
    /// Orbital distance the zone was evaluated at
    pub orbit_au: f64,
    /// True when the orbit was estimated from the period rather than measured
    pub orbit_estimated: bool,
}

/// Classification fields, always recomputed from the physical fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub planet_type: PlanetType,
    pub star_type: StarType,
    pub habitability: Habitability,
    /// Measured gravity, or mass / radius² when only those are known
    pub surface_gravity_earth: Measure,
    pub esi: Measure,
    pub equilibrium_temp_k: Measure,
    pub habitable_zone: Option<HabitableZone>,
}

/// Layman explanations, one per attribute category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Explanations {
    pub distance: Option<String>,
    pub size: Option<String>,
    pub mass: Option<String>,
    pub gravity: Option<String>,
    pub year_length: Option<String>,
    pub star_type: Option<String>,
    pub planet_type: Option<String>,
    pub habitability: Option<String>,
}

/// One planet in the normalized catalog. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPlanet {
    pub name: String,
    pub host_star: Option<String>,
    pub discovery_method: Option<String>,
    pub discovery_year: Measure<i32>,
    pub physical: PhysicalProperties,
    pub derived: DerivedMetrics,
    pub explanations: Explanations,
}

impl NormalizedPlanet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_serializes_as_value_or_null() {
        let known: Measure = Measure::known(1.5);
        let unknown: Measure = Measure::Unknown;
        assert_eq!(serde_json::to_string(&known).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "null");

        let back: Measure = serde_json::from_str("null").unwrap();
        assert!(back.is_unknown());
    }

    #[test]
    fn test_enum_labels_parse_loosely() {
        assert_eq!("gas giant".parse::<PlanetType>().unwrap(), PlanetType::GasGiant);
        assert_eq!("super_earth".parse::<PlanetType>().unwrap(), PlanetType::SuperEarth);
        assert_eq!("Neptune-like".parse::<PlanetType>().unwrap(), PlanetType::NeptuneLike);
        assert_eq!("brown dwarf".parse::<StarType>().unwrap(), StarType::BrownDwarf);
        assert_eq!(
            "insufficient data".parse::<Habitability>().unwrap(),
            Habitability::InsufficientData
        );
        assert!("rock".parse::<PlanetType>().is_err());
    }

    #[test]
    fn test_insufficient_data_is_not_habitable_category() {
        assert!(!Habitability::InsufficientData.is_habitable());
        assert!(Habitability::PossiblyHabitable.is_habitable());
    }
}
