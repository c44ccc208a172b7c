use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::{NormalizedPlanet, PlanetType, StarType};
use crate::error::QueryError;

/// How a field can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: exact or fuzzy match
    Text,
    /// Numeric: range queries, exact match on a parsed number
    Numeric,
    /// Closed set of labels: exact or fuzzy match
    Enumerated,
}

/// A queryable attribute of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanetField {
    Name,
    HostStar,
    DiscoveryMethod,
    SpectralType,
    DiscoveryYear,
    Mass,
    Radius,
    /// Measured gravity, or the mass/radius² estimate
    Gravity,
    OrbitalPeriod,
    SemiMajorAxis,
    Distance,
    StarTemperature,
    StarRadius,
    StarLuminosity,
    Esi,
    EquilibriumTemperature,
    PlanetType,
    StarType,
    Habitability,
}

/// A field's value on one planet, used for sorting and matching.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Missing,
}

impl FieldValue<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Ascending order over known values. Text compares case-insensitively.
    /// Missing values are not ordered here; callers place them last.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
            (FieldValue::Missing, _) => Ordering::Greater,
            (_, FieldValue::Missing) => Ordering::Less,
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl PlanetField {
    pub fn all() -> [PlanetField; 19] {
        [
            PlanetField::Name,
            PlanetField::HostStar,
            PlanetField::DiscoveryMethod,
            PlanetField::SpectralType,
            PlanetField::DiscoveryYear,
            PlanetField::Mass,
            PlanetField::Radius,
            PlanetField::Gravity,
            PlanetField::OrbitalPeriod,
            PlanetField::SemiMajorAxis,
            PlanetField::Distance,
            PlanetField::StarTemperature,
            PlanetField::StarRadius,
            PlanetField::StarLuminosity,
            PlanetField::Esi,
            PlanetField::EquilibriumTemperature,
            PlanetField::PlanetType,
            PlanetField::StarType,
            PlanetField::Habitability,
        ]
    }

    /// Canonical key, matching the field's name in the serialized planet
    pub fn key(&self) -> &'static str {
        match self {
            PlanetField::Name => "name",
            PlanetField::HostStar => "host_star",
            PlanetField::DiscoveryMethod => "discovery_method",
            PlanetField::SpectralType => "spectral_type",
            PlanetField::DiscoveryYear => "discovery_year",
            PlanetField::Mass => "mass_earth",
            PlanetField::Radius => "radius_earth",
            PlanetField::Gravity => "surface_gravity_earth",
            PlanetField::OrbitalPeriod => "orbital_period_days",
            PlanetField::SemiMajorAxis => "semi_major_axis_au",
            PlanetField::Distance => "distance_ly",
            PlanetField::StarTemperature => "star_temp_k",
            PlanetField::StarRadius => "star_radius_solar",
            PlanetField::StarLuminosity => "star_luminosity_solar",
            PlanetField::Esi => "esi",
            PlanetField::EquilibriumTemperature => "equilibrium_temp_k",
            PlanetField::PlanetType => "planet_type",
            PlanetField::StarType => "star_type",
            PlanetField::Habitability => "habitability",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            PlanetField::Name => &["planet_name", "pl_name"],
            PlanetField::HostStar => &["hostname", "host"],
            PlanetField::DiscoveryMethod => &["method", "discoverymethod"],
            PlanetField::SpectralType => &["st_spectype"],
            PlanetField::DiscoveryYear => &["year", "disc_year"],
            PlanetField::Mass => &["mass", "earth_mass_ratio"],
            PlanetField::Radius => &["radius", "earth_radius_ratio"],
            PlanetField::Gravity => &["gravity", "gravity_earth", "earth_gravity_ratio"],
            PlanetField::OrbitalPeriod => &["orbital_period", "period"],
            PlanetField::SemiMajorAxis => &["semi_major_axis", "orbit"],
            PlanetField::Distance => &["distance", "distance_value"],
            PlanetField::StarTemperature => &["star_temperature", "star_temp"],
            PlanetField::StarRadius => &["star_radius"],
            PlanetField::StarLuminosity => &["star_luminosity"],
            PlanetField::Esi => &["earth_similarity"],
            PlanetField::EquilibriumTemperature => &["equilibrium_temperature"],
            PlanetField::PlanetType => &["type"],
            PlanetField::StarType => &[],
            PlanetField::Habitability => &["assessment"],
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            PlanetField::Name
            | PlanetField::HostStar
            | PlanetField::DiscoveryMethod
            | PlanetField::SpectralType => FieldKind::Text,
            PlanetField::PlanetType | PlanetField::StarType | PlanetField::Habitability => {
                FieldKind::Enumerated
            }
            _ => FieldKind::Numeric,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == FieldKind::Numeric
    }

    /// Numeric value, `None` when unknown or not a numeric field.
    pub fn number(&self, p: &NormalizedPlanet) -> Option<f64> {
        let phys = &p.physical;
        match self {
            PlanetField::DiscoveryYear => p.discovery_year.value().map(f64::from),
            PlanetField::Mass => phys.mass_earth.value(),
            PlanetField::Radius => phys.radius_earth.value(),
            PlanetField::Gravity => p.derived.surface_gravity_earth.value(),
            PlanetField::OrbitalPeriod => phys.orbital_period_days.value(),
            PlanetField::SemiMajorAxis => phys.semi_major_axis_au.value(),
            PlanetField::Distance => phys.distance_ly.value(),
            PlanetField::StarTemperature => phys.star_temp_k.value(),
            PlanetField::StarRadius => phys.star_radius_solar.value(),
            PlanetField::StarLuminosity => phys.star_luminosity_solar.value(),
            PlanetField::Esi => p.derived.esi.value(),
            PlanetField::EquilibriumTemperature => p.derived.equilibrium_temp_k.value(),
            _ => None,
        }
    }

    /// Text value, `None` when absent or numeric. Unknown planet and star
    /// types count as absent.
    pub fn text<'a>(&self, p: &'a NormalizedPlanet) -> Option<&'a str> {
        match self {
            PlanetField::Name => Some(p.name.as_str()),
            PlanetField::HostStar => p.host_star.as_deref(),
            PlanetField::DiscoveryMethod => p.discovery_method.as_deref(),
            PlanetField::SpectralType => p.physical.spectral_type.as_deref(),
            PlanetField::PlanetType => match p.derived.planet_type {
                PlanetType::Unknown => None,
                t => Some(t.label()),
            },
            PlanetField::StarType => match p.derived.star_type {
                StarType::Unknown => None,
                t => Some(t.label()),
            },
            PlanetField::Habitability => Some(p.derived.habitability.label()),
            _ => None,
        }
    }

    pub fn value<'a>(&self, p: &'a NormalizedPlanet) -> FieldValue<'a> {
        if self.is_numeric() {
            self.number(p).map_or(FieldValue::Missing, FieldValue::Number)
        } else {
            self.text(p).map_or(FieldValue::Missing, FieldValue::Text)
        }
    }
}

fn squash(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

impl FromStr for PlanetField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        PlanetField::all()
            .into_iter()
            .find(|f| f.key() == wanted || f.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| QueryError::UnknownField(s.trim().to_string()))
    }
}

impl fmt::Display for PlanetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for PlanetField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}
