//! Numeric series for the report renderer. Every series holds only known
//! values; a planet missing an input is left out of that series alone.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::NormalizedPlanet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassRadiusPoint {
    pub planet: String,
    pub mass_earth: f64,
    pub radius_earth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsiRank {
    pub planet: String,
    pub esi: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReportSeries {
    pub mass_radius: Vec<MassRadiusPoint>,
    /// Ascending by year
    pub discovery_years: Vec<YearCount>,
    pub distances_ly: Vec<f64>,
    pub orbital_periods_days: Vec<f64>,
    /// Highest ESI first, ties by name
    pub esi_ranking: Vec<EsiRank>,
}

impl ReportSeries {
    pub fn build<'a>(planets: impl IntoIterator<Item = &'a NormalizedPlanet>) -> Self {
        let mut series = ReportSeries::default();
        let mut years: BTreeMap<i32, usize> = BTreeMap::new();

        for p in planets {
            let phys = &p.physical;
            if let (Some(mass_earth), Some(radius_earth)) =
                (phys.mass_earth.value(), phys.radius_earth.value())
            {
                series.mass_radius.push(MassRadiusPoint {
                    planet: p.name.clone(),
                    mass_earth,
                    radius_earth,
                });
            }
            if let Some(year) = p.discovery_year.value() {
                *years.entry(year).or_default() += 1;
            }
            series.distances_ly.extend(phys.distance_ly.value());
            series.orbital_periods_days.extend(phys.orbital_period_days.value());
            if let Some(esi) = p.derived.esi.value() {
                series.esi_ranking.push(EsiRank {
                    planet: p.name.clone(),
                    esi,
                });
            }
        }

        series.discovery_years = years
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect();
        series
            .esi_ranking
            .sort_by(|a, b| b.esi.total_cmp(&a.esi).then_with(|| a.planet.cmp(&b.planet)));
        series
    }
}
