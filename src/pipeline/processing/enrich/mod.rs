pub mod classify;
pub mod esi;
pub mod explain;
pub mod habitability;

use crate::config::{ClassificationConfig, EsiConfig, HabitabilityConfig};
use crate::domain::{DerivedMetrics, Habitability, Measure, NormalizedPlanet, PlanetType};
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::processing::normalize::StageOutput;

/// Trait for computing derived metrics from validated physical fields
pub trait Enricher: Send + Sync {
    /// Recompute every derived field. Reads only `planet.physical` and the
    /// identity fields, so enriching twice gives the same planet.
    fn enrich(&self, planet: NormalizedPlanet) -> StageOutput;
}

/// Enricher driven by the classification, habitability and ESI tables
#[derive(Debug, Clone, Default)]
pub struct DefaultEnricher {
    pub classification: ClassificationConfig,
    pub habitability: HabitabilityConfig,
    pub esi: EsiConfig,
}

impl DefaultEnricher {
    pub fn new(
        classification: ClassificationConfig,
        habitability: HabitabilityConfig,
        esi: EsiConfig,
    ) -> Self {
        Self {
            classification,
            habitability,
            esi,
        }
    }

    fn derive(&self, planet: &NormalizedPlanet, events: &mut Vec<PipelineEvent>) -> DerivedMetrics {
        let p = &planet.physical;
        let name = planet.name.as_str();
        let mass = p.mass_earth.value();
        let radius = p.radius_earth.value();
        let star_temp = p.star_temp_k.value();

        let planet_type = classify::planet_type(&self.classification.planet_types, mass, radius);
        let star_type = classify::star_type(
            &self.classification.star_temperatures,
            p.spectral_type.as_deref(),
            star_temp,
        );

        let gravity = p
            .gravity_earth
            .value()
            .or_else(|| match (mass, radius) {
                (Some(m), Some(r)) if r > 0.0 => Some(m / (r * r)),
                _ => None,
            })
            .filter(|g| g.is_finite());

        let luminosity = habitability::luminosity(
            p.star_luminosity_solar.value(),
            p.star_radius_solar.value(),
            star_temp,
        );
        let (orbit, orbit_estimated) = match (p.semi_major_axis_au.value(), luminosity) {
            (Some(a), _) => (Some(a), false),
            (None, Some(l)) if self.habitability.estimate_orbit_from_period => (
                p.orbital_period_days
                    .value()
                    .and_then(|days| habitability::orbit_from_period(days, l)),
                true,
            ),
            _ => (None, false),
        };

        let equilibrium = match (luminosity, orbit) {
            (Some(l), Some(a)) => habitability::equilibrium_temperature(&self.habitability, l, a),
            _ => None,
        };
        let zone = match (luminosity, star_temp, orbit) {
            (Some(l), Some(t), Some(a)) => {
                habitability::habitable_zone(&self.habitability, l, t, a, orbit_estimated)
            }
            _ => None,
        };

        let esi = match (radius, gravity, equilibrium) {
            (Some(r), Some(g), Some(t)) => esi::earth_similarity(&self.esi, r, g, t),
            _ => None,
        };
        if esi.is_none() {
            let mut missing = Vec::new();
            if radius.is_none() {
                missing.push("radius_earth");
            }
            if gravity.is_none() {
                missing.push("surface_gravity_earth");
            }
            if equilibrium.is_none() {
                missing.push("equilibrium_temp_k");
            }
            events.push(PipelineEvent::insufficient(name, "esi", &missing));
        }

        if planet_type == PlanetType::Unknown {
            let mut missing = Vec::new();
            if mass.is_none() {
                missing.push("mass_earth");
            }
            if radius.is_none() {
                missing.push("radius_earth");
            }
            if !missing.is_empty() {
                events.push(PipelineEvent::insufficient(name, "planet_type", &missing));
            }
        }

        let hzd = zone.map(|z| z.hzd);
        let assessment = habitability::assess(&self.habitability, star_temp, hzd, esi);
        if assessment == Habitability::InsufficientData {
            let mut missing = Vec::new();
            if star_temp.is_none() {
                missing.push("star_temp_k");
            }
            if hzd.is_none() {
                missing.push("habitable_zone");
            }
            if esi.is_none() {
                missing.push("esi");
            }
            events.push(PipelineEvent::insufficient(name, "habitability", &missing));
        }

        DerivedMetrics {
            planet_type,
            star_type,
            habitability: assessment,
            surface_gravity_earth: Measure::from(gravity),
            esi: Measure::from(esi),
            equilibrium_temp_k: Measure::from(equilibrium),
            habitable_zone: zone,
        }
    }
}

impl Enricher for DefaultEnricher {
    fn enrich(&self, mut planet: NormalizedPlanet) -> StageOutput {
        let mut events = Vec::new();
        planet.derived = self.derive(&planet, &mut events);
        planet.explanations = explain::explain(&planet);
        StageOutput { planet, events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StarType;

    fn earth_twin() -> NormalizedPlanet {
        let mut p = NormalizedPlanet::new("Twin b");
        p.physical.mass_earth = Measure::Known(1.0);
        p.physical.radius_earth = Measure::Known(1.0);
        p.physical.semi_major_axis_au = Measure::Known(1.0);
        p.physical.orbital_period_days = Measure::Known(365.25);
        p.physical.star_temp_k = Measure::Known(5778.0);
        p.physical.star_radius_solar = Measure::Known(1.0);
        p
    }

    #[test]
    fn test_earth_twin_is_likely_habitable() {
        let out = DefaultEnricher::default().enrich(earth_twin());
        let d = &out.planet.derived;
        assert_eq!(d.planet_type, PlanetType::Rocky);
        assert_eq!(d.star_type, StarType::G);
        assert_eq!(d.surface_gravity_earth, Measure::Known(1.0));
        let esi = d.esi.value().unwrap();
        assert!(esi > 0.95 && esi <= 1.0);
        assert_eq!(d.habitability, Habitability::LikelyHabitable);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_missing_radius_leaves_metrics_unknown() {
        let mut p = earth_twin();
        p.physical.radius_earth = Measure::Unknown;
        let out = DefaultEnricher::default().enrich(p);
        let d = &out.planet.derived;
        assert_eq!(d.planet_type, PlanetType::Unknown);
        assert!(d.esi.is_unknown());
        assert!(d.surface_gravity_earth.is_unknown());
        assert_eq!(d.habitability, Habitability::InsufficientData);
        assert!(out.events.iter().any(|e| matches!(
            e,
            PipelineEvent::DerivationInsufficient { metric, .. } if metric == "esi"
        )));
    }

    #[test]
    fn test_orbit_estimated_from_period() {
        let mut p = earth_twin();
        p.physical.semi_major_axis_au = Measure::Unknown;
        let zone = DefaultEnricher::default()
            .enrich(p)
            .planet
            .derived
            .habitable_zone
            .unwrap();
        assert!(zone.orbit_estimated);
        assert!((zone.orbit_au - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_enrich_is_idempotent_and_ignores_stale_derived_fields() {
        let enricher = DefaultEnricher::default();
        let mut stale = earth_twin();
        stale.derived.planet_type = PlanetType::GasGiant;
        stale.derived.esi = Measure::Known(0.1);

        let once = enricher.enrich(stale).planet;
        let twice = enricher.enrich(once.clone()).planet;
        assert_eq!(once, twice);
        assert_eq!(once.derived.planet_type, PlanetType::Rocky);
    }

    #[test]
    fn test_vanishing_radius_leaves_gravity_and_esi_unknown() {
        let mut p = earth_twin();
        p.physical.radius_earth = Measure::Known(1e-200);
        let out = DefaultEnricher::default().enrich(p);
        let d = &out.planet.derived;
        assert!(d.surface_gravity_earth.is_unknown());
        assert!(d.esi.is_unknown());
        assert_eq!(d.habitability, Habitability::InsufficientData);
        assert!(out.planet.explanations.gravity.is_none());
        assert!(out.events.iter().any(|e| matches!(
            e,
            PipelineEvent::DerivationInsufficient { metric, .. } if metric == "esi"
        )));
    }

    #[test]
    fn test_measured_gravity_wins_over_derived() {
        let mut p = earth_twin();
        p.physical.gravity_earth = Measure::Known(0.9);
        let d = DefaultEnricher::default().enrich(p).planet.derived;
        assert_eq!(d.surface_gravity_earth, Measure::Known(0.9));
    }
}
