//! Pure predicates over a single planet. Categories are compositions of the
//! exact and range primitives, so each can be checked against one planet in
//! isolation.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::field::{FieldKind, PlanetField};
use crate::config::CategoryConfig;
use crate::domain::{Habitability, NormalizedPlanet, PlanetType, StarType};
use crate::error::QueryError;

/// Value an exact match compares against, already parsed for its field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExactValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    All,
    Equals {
        field: PlanetField,
        value: ExactValue,
    },
    Contains {
        field: PlanetField,
        term: String,
    },
    /// Inclusive bounds; `None` leaves that side open. Unknown values never match.
    Range {
        field: PlanetField,
        lower: Option<f64>,
        upper: Option<f64>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Exact match. Enumerated values are checked against their label set,
    /// excluding the Unknown planet and star types. Text compares
    /// case-insensitively and numbers must parse.
    pub fn equals(field: PlanetField, value: &str) -> Result<Self, QueryError> {
        let invalid = || QueryError::InvalidValue {
            field: field.key().to_string(),
            value: value.to_string(),
        };
        let value = match field {
            // Unknown types read as missing, so an exact match on them could never hit
            PlanetField::PlanetType => match value.parse::<PlanetType>() {
                Ok(PlanetType::Unknown) | Err(_) => return Err(invalid()),
                Ok(t) => ExactValue::Text(t.label().to_string()),
            },
            PlanetField::StarType => match value.parse::<StarType>() {
                Ok(StarType::Unknown) | Err(_) => return Err(invalid()),
                Ok(t) => ExactValue::Text(t.label().to_string()),
            },
            PlanetField::Habitability => ExactValue::Text(
                value
                    .parse::<Habitability>()
                    .map_err(|_| invalid())?
                    .label()
                    .to_string(),
            ),
            f if f.is_numeric() => {
                let n: f64 = value.trim().parse().map_err(|_| invalid())?;
                if !n.is_finite() {
                    return Err(QueryError::NonFiniteBound(field.key().to_string()));
                }
                ExactValue::Number(n)
            }
            _ => ExactValue::Text(value.trim().to_string()),
        };
        Ok(Predicate::Equals { field, value })
    }

    /// Case-insensitive substring match on a text or enumerated field.
    pub fn contains(field: PlanetField, term: &str) -> Result<Self, QueryError> {
        if field.kind() == FieldKind::Numeric {
            return Err(QueryError::FieldNotText(field.key().to_string()));
        }
        let term = term.trim();
        if term.is_empty() {
            return Err(QueryError::EmptySearchTerm);
        }
        Ok(Predicate::Contains {
            field,
            term: term.to_lowercase(),
        })
    }

    pub fn range(
        field: PlanetField,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<Self, QueryError> {
        if !field.is_numeric() {
            return Err(QueryError::FieldNotNumeric(field.key().to_string()));
        }
        if lower.into_iter().chain(upper).any(|b| !b.is_finite()) {
            return Err(QueryError::NonFiniteBound(field.key().to_string()));
        }
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(QueryError::InvalidRange {
                    field: field.key().to_string(),
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Predicate::Range {
            field,
            lower,
            upper,
        })
    }

    pub fn matches(&self, p: &NormalizedPlanet) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { field, value } => match value {
                ExactValue::Number(n) => field.number(p) == Some(*n),
                ExactValue::Text(t) => field
                    .text(p)
                    .map_or(false, |v| v.trim().to_lowercase() == t.to_lowercase()),
            },
            Predicate::Contains { field, term } => field
                .text(p)
                .map_or(false, |v| v.to_lowercase().contains(term.as_str())),
            Predicate::Range {
                field,
                lower,
                upper,
            } => field.number(p).map_or(false, |v| {
                lower.map_or(true, |lo| v >= lo) && upper.map_or(true, |hi| v <= hi)
            }),
            Predicate::And(parts) => parts.iter().all(|part| part.matches(p)),
            Predicate::Or(parts) => parts.iter().any(|part| part.matches(p)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: &Option<f64>| b.map_or("*".to_string(), |v| v.to_string());
        let join = |parts: &[Predicate], sep: &str| {
            parts
                .iter()
                .map(|p| format!("({})", p))
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self {
            Predicate::All => write!(f, "all"),
            Predicate::Equals { field, value } => match value {
                ExactValue::Text(t) => write!(f, "{} = '{}'", field, t),
                ExactValue::Number(n) => write!(f, "{} = {}", field, n),
            },
            Predicate::Contains { field, term } => write!(f, "{} contains '{}'", field, term),
            Predicate::Range {
                field,
                lower,
                upper,
            } => write!(f, "{} in [{}, {}]", field, bound(lower), bound(upper)),
            Predicate::And(parts) => f.write_str(&join(parts, " and ")),
            Predicate::Or(parts) => f.write_str(&join(parts, " or ")),
        }
    }
}

/// Predefined named filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Category {
    EarthLike,
    GasGiant,
    /// Likely or possibly habitable; insufficient data never qualifies
    HabitableZone,
    /// Discovered in or after `current_year - years`
    RecentlyDiscovered { years: Option<u32> },
    OrbitalRange {
        min_days: Option<f64>,
        max_days: Option<f64>,
    },
    Nearby { max_ly: Option<f64> },
    HabitableSuperEarths,
}

impl Category {
    pub fn all_names() -> [&'static str; 7] {
        [
            "earth-like",
            "gas-giant",
            "habitable-zone",
            "recently-discovered",
            "orbital-range",
            "nearby",
            "habitable-super-earths",
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::EarthLike => "earth-like",
            Category::GasGiant => "gas-giant",
            Category::HabitableZone => "habitable-zone",
            Category::RecentlyDiscovered { .. } => "recently-discovered",
            Category::OrbitalRange { .. } => "orbital-range",
            Category::Nearby { .. } => "nearby",
            Category::HabitableSuperEarths => "habitable-super-earths",
        }
    }

    /// Resolve to a predicate. `current_year` anchors the recent window.
    pub fn predicate(
        &self,
        config: &CategoryConfig,
        current_year: i32,
    ) -> Result<Predicate, QueryError> {
        let between = |field, (lo, hi): (f64, f64)| Predicate::range(field, Some(lo), Some(hi));

        Ok(match *self {
            Category::EarthLike => Predicate::And(vec![
                between(PlanetField::Mass, config.earth_like_mass)?,
                between(PlanetField::Radius, config.earth_like_radius)?,
            ]),
            Category::GasGiant => {
                Predicate::equals(PlanetField::PlanetType, PlanetType::GasGiant.label())?
            }
            Category::HabitableZone => habitable()?,
            Category::RecentlyDiscovered { years } => {
                let years = years.unwrap_or(config.recent_years);
                let since = i64::from(current_year) - i64::from(years);
                Predicate::range(PlanetField::DiscoveryYear, Some(since as f64), None)?
            }
            Category::OrbitalRange { min_days, max_days } => {
                Predicate::range(PlanetField::OrbitalPeriod, min_days, max_days)?
            }
            Category::Nearby { max_ly } => Predicate::range(
                PlanetField::Distance,
                None,
                Some(max_ly.unwrap_or(config.nearby_max_ly)),
            )?,
            Category::HabitableSuperEarths => Predicate::And(vec![
                habitable()?,
                between(PlanetField::Mass, config.super_earth_mass)?,
            ]),
        })
    }
}

fn habitable() -> Result<Predicate, QueryError> {
    Ok(Predicate::Or(vec![
        Predicate::equals(PlanetField::Habitability, Habitability::LikelyHabitable.label())?,
        Predicate::equals(PlanetField::Habitability, Habitability::PossiblyHabitable.label())?,
    ]))
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = QueryError;

    /// Parses a category name; parameterized categories take their defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "earthlike" => Ok(Category::EarthLike),
            "gasgiant" | "gasgiants" => Ok(Category::GasGiant),
            "habitablezone" | "habitable" => Ok(Category::HabitableZone),
            "recentlydiscovered" | "recent" => Ok(Category::RecentlyDiscovered { years: None }),
            "orbitalrange" => Ok(Category::OrbitalRange {
                min_days: None,
                max_days: None,
            }),
            "nearby" => Ok(Category::Nearby { max_ly: None }),
            "habitablesuperearths" | "habitablesuperearth" => Ok(Category::HabitableSuperEarths),
            _ => Err(QueryError::UnknownCategory(s.trim().to_string())),
        }
    }
}
