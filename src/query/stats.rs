//! Aggregate statistics. Unknown values are left out of every denominator
//! except completeness, which is populated ÷ total.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::field::PlanetField;
use crate::domain::NormalizedPlanet;
use crate::pipeline::processing::enrich::classify::{classify, TextBucket};

const fn bucket(below: f64, text: &'static str) -> TextBucket {
    TextBucket { below, text }
}

// Buckets are half-open: [previous bound, below)
static DISTANCE_HISTOGRAM: [TextBucket; 6] = [
    bucket(10.0, "< 10 ly"),
    bucket(50.0, "10-50 ly"),
    bucket(100.0, "50-100 ly"),
    bucket(500.0, "100-500 ly"),
    bucket(1000.0, "500-1000 ly"),
    bucket(f64::INFINITY, ">= 1000 ly"),
];

static PERIOD_HISTOGRAM: [TextBucket; 5] = [
    bucket(10.0, "< 10 days"),
    bucket(100.0, "10-100 days"),
    bucket(365.0, "100-365 days"),
    bucket(1000.0, "1-3 years"),
    bucket(f64::INFINITY, "> 3 years"),
];

static MASS_HISTOGRAM: [TextBucket; 6] = [
    bucket(0.5, "< 0.5 Earth"),
    bucket(2.0, "Earth-like (0.5-2)"),
    bucket(10.0, "Super-Earth (2-10)"),
    bucket(50.0, "Neptune-like (10-50)"),
    bucket(318.0, "Saturn-like (50-318)"),
    bucket(f64::INFINITY, "Jupiter+ (>= 318)"),
];

/// Fields summarized with mean/median/extremes
const SUMMARIZED: [PlanetField; 9] = [
    PlanetField::Mass,
    PlanetField::Radius,
    PlanetField::Gravity,
    PlanetField::OrbitalPeriod,
    PlanetField::Distance,
    PlanetField::StarTemperature,
    PlanetField::DiscoveryYear,
    PlanetField::Esi,
    PlanetField::EquilibriumTemperature,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub planet: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Planets with the field known
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<Extreme>,
    pub max: Option<Extreme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_planets: usize,
    /// Likely or possibly habitable
    pub habitable_count: usize,
    pub numeric: BTreeMap<String, NumericSummary>,
    /// Percentage of planets with the field populated, 0-100
    pub completeness: BTreeMap<String, f64>,
    pub planet_types: Vec<LabelCount>,
    pub star_types: Vec<LabelCount>,
    pub discovery_methods: Vec<LabelCount>,
    pub habitability: Vec<LabelCount>,
    pub discovery_decades: Vec<LabelCount>,
    pub distance_histogram: Vec<LabelCount>,
    pub orbital_period_histogram: Vec<LabelCount>,
    pub mass_histogram: Vec<LabelCount>,
}

impl Statistics {
    pub fn compute<'a>(planets: impl IntoIterator<Item = &'a NormalizedPlanet>) -> Self {
        let planets: Vec<&NormalizedPlanet> = planets.into_iter().collect();
        let total = planets.len();

        let numeric = SUMMARIZED
            .iter()
            .map(|f| (f.key().to_string(), summarize(&planets, *f)))
            .collect();

        let completeness = PlanetField::all()
            .iter()
            .map(|f| {
                let populated = planets.iter().filter(|p| !f.value(p).is_missing()).count();
                (f.key().to_string(), percentage(populated, total))
            })
            .collect();

        let mut decades: BTreeMap<i32, usize> = BTreeMap::new();
        for year in planets.iter().filter_map(|p| p.discovery_year.value()) {
            *decades.entry(year.div_euclid(10) * 10).or_default() += 1;
        }

        Self {
            total_planets: total,
            habitable_count: planets
                .iter()
                .filter(|p| p.derived.habitability.is_habitable())
                .count(),
            numeric,
            completeness,
            planet_types: tally(&planets, PlanetField::PlanetType),
            star_types: tally(&planets, PlanetField::StarType),
            discovery_methods: tally(&planets, PlanetField::DiscoveryMethod),
            habitability: tally(&planets, PlanetField::Habitability),
            discovery_decades: decades
                .into_iter()
                .map(|(decade, count)| LabelCount {
                    label: format!("{}s", decade),
                    count,
                })
                .collect(),
            distance_histogram: histogram(&planets, PlanetField::Distance, &DISTANCE_HISTOGRAM),
            orbital_period_histogram: histogram(
                &planets,
                PlanetField::OrbitalPeriod,
                &PERIOD_HISTOGRAM,
            ),
            mass_histogram: histogram(&planets, PlanetField::Mass, &MASS_HISTOGRAM),
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

fn summarize(planets: &[&NormalizedPlanet], field: PlanetField) -> NumericSummary {
    let mut values: Vec<(f64, &str)> = planets
        .iter()
        .filter_map(|p| field.number(p).map(|v| (v, p.name.as_str())))
        .collect();
    if values.is_empty() {
        return NumericSummary {
            count: 0,
            mean: None,
            median: None,
            min: None,
            max: None,
        };
    }
    values.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let n = values.len();
    let mean = values.iter().map(|(v, _)| v).sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        values[n / 2].0
    } else {
        (values[n / 2 - 1].0 + values[n / 2].0) / 2.0
    };
    let extreme = |(value, name): (f64, &str)| Extreme {
        planet: name.to_string(),
        value,
    };

    NumericSummary {
        count: n,
        mean: Some(mean),
        median: Some(median),
        min: values.first().copied().map(extreme),
        max: values.last().copied().map(extreme),
    }
}

/// Counts per label, most common first, ties by label.
fn tally(planets: &[&NormalizedPlanet], field: PlanetField) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in planets.iter().filter_map(|p| field.text(p)) {
        *counts.entry(label).or_default() += 1;
    }
    let mut out: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Every bucket of `table`, including empty ones, in table order.
fn histogram(planets: &[&NormalizedPlanet], field: PlanetField, table: &[TextBucket]) -> Vec<LabelCount> {
    let mut out: Vec<LabelCount> = table
        .iter()
        .map(|b| LabelCount {
            label: b.text.to_string(),
            count: 0,
        })
        .collect();
    for value in planets.iter().filter_map(|p| field.number(p)) {
        if let Some(label) = classify(table, &value) {
            if let Some(slot) = out.iter_mut().find(|c| c.label == label) {
                slot.count += 1;
            }
        }
    }
    out
}
