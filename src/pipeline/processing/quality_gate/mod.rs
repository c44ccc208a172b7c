use chrono::{Datelike, Utc};
use tracing::debug;

use crate::config::{FieldRange, ValidationConfig};
use crate::domain::{Measure, NormalizedPlanet};
use crate::pipeline::events::{DemotionReason, PipelineEvent};
use crate::pipeline::processing::normalize::StageOutput;

/// Trait for the range checkpoint between normalization and enrichment
pub trait QualityGate: Send + Sync {
    /// Demote every populated field outside its plausible range. Never drops
    /// the planet.
    fn assess(&self, row: usize, planet: NormalizedPlanet) -> StageOutput;
}

/// Quality gate driven by the `[validation]` range table
pub struct DefaultQualityGate {
    pub config: ValidationConfig,
    /// Upper bound for discovery years when the config leaves it open
    current_year: i32,
}

impl DefaultQualityGate {
    /// Create a quality gate with the default ranges
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Create a quality gate with custom ranges
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            current_year: Utc::now().year(),
        }
    }

    /// Pin "now" for the discovery year check
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    fn year_ceiling(&self) -> i32 {
        self.config.discovery_year_max.unwrap_or(self.current_year)
    }

    fn check(
        row: usize,
        planet: &str,
        field: &str,
        value: &mut Measure,
        range: &FieldRange,
        events: &mut Vec<PipelineEvent>,
    ) {
        if let Measure::Known(v) = *value {
            if !range.contains(v) {
                debug!(row, planet, field, value = v, "Value outside plausible range");
                events.push(PipelineEvent::demoted(
                    row,
                    planet,
                    field,
                    DemotionReason::OutOfRange,
                    Some(v.to_string()),
                ));
                *value = Measure::Unknown;
            }
        }
    }
}

impl Default for DefaultQualityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityGate for DefaultQualityGate {
    fn assess(&self, row: usize, mut planet: NormalizedPlanet) -> StageOutput {
        let mut events = Vec::new();
        let name = planet.name.clone();
        let c = &self.config;
        let p = &mut planet.physical;

        let checks: [(&str, &mut Measure, &FieldRange); 9] = [
            ("mass_earth", &mut p.mass_earth, &c.mass_earth),
            ("radius_earth", &mut p.radius_earth, &c.radius_earth),
            ("gravity_earth", &mut p.gravity_earth, &c.gravity_earth),
            ("orbital_period_days", &mut p.orbital_period_days, &c.orbital_period_days),
            ("semi_major_axis_au", &mut p.semi_major_axis_au, &c.semi_major_axis_au),
            ("distance_ly", &mut p.distance_ly, &c.distance_ly),
            ("star_temp_k", &mut p.star_temp_k, &c.star_temp_k),
            ("star_radius_solar", &mut p.star_radius_solar, &c.star_radius_solar),
            (
                "star_luminosity_solar",
                &mut p.star_luminosity_solar,
                &c.star_luminosity_solar,
            ),
        ];
        for (field, value, range) in checks {
            Self::check(row, &name, field, value, range, &mut events);
        }
        if p.mass_earth.is_unknown() {
            p.minimum_mass = false;
        }

        if let Measure::Known(year) = planet.discovery_year {
            if year < c.discovery_year_min || year > self.year_ceiling() {
                debug!(row, planet = %name, year, "Discovery year outside plausible range");
                events.push(PipelineEvent::demoted(
                    row,
                    &name,
                    "discovery_year",
                    DemotionReason::OutOfRange,
                    Some(year.to_string()),
                ));
                planet.discovery_year = Measure::Unknown;
            }
        }

        StageOutput { planet, events }
    }
}
