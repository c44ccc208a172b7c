pub mod units;

use serde_json::Value;
use tracing::debug;

use crate::config::{FieldUnits, UnitsConfig};
use crate::domain::{Measure, NormalizedPlanet};
use crate::pipeline::events::{DemotionReason, PipelineEvent};
use crate::pipeline::ingestion::RawRecord;
use units::{parse_cell, render_raw, FieldParse};

/// A planet produced by a processing stage, with the events the stage logged.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub planet: NormalizedPlanet,
    pub events: Vec<PipelineEvent>,
}

/// Trait for turning raw catalog rows into canonical planets
pub trait Normalizer: Send + Sync {
    /// Normalize one row. `Err` carries the rejection event for rows with no
    /// usable planet name; every other problem demotes a single field.
    fn normalize(&self, record: &RawRecord) -> Result<StageOutput, PipelineEvent>;
}

/// Column-table driven normalizer
pub struct DefaultNormalizer {
    units: UnitsConfig,
}

impl DefaultNormalizer {
    pub fn new(units: UnitsConfig) -> Self {
        Self { units }
    }

    /// First non-missing text value across `columns`.
    fn text(&self, record: &RawRecord, columns: &[String]) -> Option<String> {
        columns.iter().find_map(|col| {
            let text = match record.get(col)? {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            if self.units.is_missing_token(&text) {
                None
            } else {
                Some(text)
            }
        })
    }

    /// Walk the field's source columns in order; the first known value wins.
    /// Returns the value and whether it came from a minimum-mass column.
    fn numeric(
        &self,
        record: &RawRecord,
        planet: &str,
        field: &str,
        units: &FieldUnits,
        events: &mut Vec<PipelineEvent>,
    ) -> (Measure, bool) {
        for column in &units.columns {
            let Some(raw) = record.get(&column.column) else {
                continue;
            };
            match parse_cell(raw, column, units, |s| self.units.is_missing_token(s)) {
                FieldParse::Value(v) => return (Measure::Known(v), column.minimum),
                FieldParse::Missing => {}
                FieldParse::Malformed(text) => {
                    debug!(row = record.row, field, column = %column.column, "Malformed numeric cell");
                    events.push(PipelineEvent::demoted(
                        record.row,
                        planet,
                        field,
                        DemotionReason::Malformed,
                        Some(text),
                    ));
                }
                FieldParse::UnknownUnit(unit) => {
                    debug!(row = record.row, field, unit = %unit, "No conversion factor for unit");
                    events.push(PipelineEvent::demoted(
                        record.row,
                        planet,
                        field,
                        DemotionReason::UnknownUnit,
                        Some(render_raw(raw)),
                    ));
                }
            }
        }
        (Measure::Unknown, false)
    }

    fn discovery_year(
        &self,
        record: &RawRecord,
        planet: &str,
        events: &mut Vec<PipelineEvent>,
    ) -> Measure<i32> {
        for col in &self.units.discovery_year_columns {
            let Some(raw) = record.get(col) else {
                continue;
            };
            let number = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) if self.units.is_missing_token(s) => continue,
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(y) if y.is_finite() && y.fract() == 0.0 && y.abs() <= i32::MAX as f64 => {
                    return Measure::Known(y as i32);
                }
                Some(y) if y.is_finite() => events.push(PipelineEvent::demoted(
                    record.row,
                    planet,
                    "discovery_year",
                    DemotionReason::NotIntegral,
                    Some(render_raw(raw)),
                )),
                _ => events.push(PipelineEvent::demoted(
                    record.row,
                    planet,
                    "discovery_year",
                    DemotionReason::Malformed,
                    Some(render_raw(raw)),
                )),
            }
        }
        Measure::Unknown
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new(UnitsConfig::default())
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, record: &RawRecord) -> Result<StageOutput, PipelineEvent> {
        if !record.is_object() {
            return Err(PipelineEvent::rejected(record.row, "row is not an object"));
        }
        let name = self
            .text(record, &self.units.name_columns)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PipelineEvent::rejected(record.row, "missing planet name"))?;

        let mut events = Vec::new();
        let mut planet = NormalizedPlanet::new(name);
        planet.host_star = self.text(record, &self.units.host_star_columns);
        planet.discovery_method = self.text(record, &self.units.discovery_method_columns);
        planet.discovery_year = self.discovery_year(record, &planet.name, &mut events);

        let units = &self.units;
        let name = planet.name.clone();
        let p = &mut planet.physical;
        let (mass, minimum) = self.numeric(record, &name, "mass_earth", &units.mass, &mut events);
        p.mass_earth = mass;
        p.minimum_mass = minimum;
        p.radius_earth = self.numeric(record, &name, "radius_earth", &units.radius, &mut events).0;
        p.gravity_earth = self.numeric(record, &name, "gravity_earth", &units.gravity, &mut events).0;
        p.orbital_period_days = self
            .numeric(record, &name, "orbital_period_days", &units.orbital_period, &mut events)
            .0;
        p.semi_major_axis_au = self
            .numeric(record, &name, "semi_major_axis_au", &units.semi_major_axis, &mut events)
            .0;
        p.distance_ly = self.numeric(record, &name, "distance_ly", &units.distance, &mut events).0;
        p.star_temp_k = self
            .numeric(record, &name, "star_temp_k", &units.star_temperature, &mut events)
            .0;
        p.star_radius_solar = self
            .numeric(record, &name, "star_radius_solar", &units.star_radius, &mut events)
            .0;
        p.star_luminosity_solar = self
            .numeric(record, &name, "star_luminosity_solar", &units.star_luminosity, &mut events)
            .0;
        p.spectral_type = self.text(record, &units.spectral_type_columns);

        Ok(StageOutput { planet, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{JUPITER_MASS_IN_EARTH, PARSEC_IN_LIGHT_YEARS};
    use serde_json::json;

    fn normalize(value: Value) -> Result<StageOutput, PipelineEvent> {
        DefaultNormalizer::default().normalize(&RawRecord::new(7, value))
    }

    #[test]
    fn test_rejects_rows_without_a_name() {
        for row in [json!({"pl_rade": 1.0}), json!({"pl_name": "  "}), json!({"pl_name": "N/A"})] {
            match normalize(row) {
                Err(PipelineEvent::Rejected { row, .. }) => assert_eq!(row, 7),
                other => panic!("expected rejection, got {:?}", other),
            }
        }
        assert!(normalize(json!("just a string")).is_err());
    }

    #[test]
    fn test_converts_nasa_columns() {
        let out = normalize(json!({
            "pl_name": "Kepler-22 b",
            "hostname": "Kepler-22",
            "discoverymethod": "Transit",
            "disc_year": 2011,
            "pl_bmassj": 0.1,
            "pl_rade": 2.1,
            "pl_orbper": "289.86",
            "sy_dist": 10.0,
            "st_teff": 5518,
            "st_spectype": "G5 V"
        }))
        .unwrap();

        let p = &out.planet;
        assert_eq!(p.name, "Kepler-22 b");
        assert_eq!(p.host_star.as_deref(), Some("Kepler-22"));
        assert_eq!(p.discovery_year, Measure::Known(2011));
        assert_eq!(p.physical.mass_earth, Measure::Known(0.1 * JUPITER_MASS_IN_EARTH));
        assert_eq!(p.physical.orbital_period_days, Measure::Known(289.86));
        assert_eq!(p.physical.distance_ly, Measure::Known(10.0 * PARSEC_IN_LIGHT_YEARS));
        assert_eq!(p.physical.spectral_type.as_deref(), Some("G5 V"));
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_malformed_field_is_demoted_not_rejected() {
        let out = normalize(json!({
            "pl_name": "X b",
            "pl_rade": "large",
            "pl_orbper": "3 fortnights",
            "sy_dist": ""
        }))
        .unwrap();

        assert!(out.planet.physical.radius_earth.is_unknown());
        assert!(out.planet.physical.orbital_period_days.is_unknown());
        assert!(out.planet.physical.distance_ly.is_unknown());
        let reasons: Vec<_> = out
            .events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::FieldDemoted { field, reason, .. } => Some((field.as_str(), *reason)),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("radius_earth", DemotionReason::Malformed),
                ("orbital_period_days", DemotionReason::UnknownUnit),
            ]
        );
    }

    #[test]
    fn test_later_column_fills_in_and_flags_minimum_mass() {
        let out = normalize(json!({
            "pl_name": "HD 1 b",
            "pl_bmasse": null,
            "pl_msinie": 12.5
        }))
        .unwrap();
        assert_eq!(out.planet.physical.mass_earth, Measure::Known(12.5));
        assert!(out.planet.physical.minimum_mass);
    }

    #[test]
    fn test_fractional_discovery_year_is_demoted() {
        let out = normalize(json!({"pl_name": "Y b", "disc_year": "2014.5"})).unwrap();
        assert!(out.planet.discovery_year.is_unknown());
        assert!(matches!(
            out.events[0],
            PipelineEvent::FieldDemoted {
                reason: DemotionReason::NotIntegral,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_tokens_are_unknown_not_zero() {
        let out = normalize(json!({"pl_name": "Z b", "pl_bmasse": "unknown", "pl_rade": 0}))
            .unwrap();
        assert!(out.planet.physical.mass_earth.is_unknown());
        assert_eq!(out.planet.physical.radius_earth, Measure::Known(0.0));
    }
}
