use crate::config::HabitabilityConfig;
use crate::constants::{DAYS_PER_YEAR, SUN_TEMPERATURE_K};
use crate::domain::{Habitability, HabitableZone};

/// Luminosity in solar units: measured, else R² (T / T☉)⁴.
pub fn luminosity(measured: Option<f64>, star_radius: Option<f64>, star_temp_k: Option<f64>) -> Option<f64> {
    measured.or_else(|| match (star_radius, star_temp_k) {
        (Some(r), Some(t)) if r > 0.0 && t > 0.0 => Some(r * r * (t / SUN_TEMPERATURE_K).powi(4)),
        _ => None,
    })
}

/// Inner and outer habitable-zone edges in AU. `None` when the temperature
/// polynomial leaves the fit's valid domain.
pub fn zone_edges(config: &HabitabilityConfig, luminosity: f64, star_temp_k: f64) -> Option<(f64, f64)> {
    let dt = star_temp_k - config.reference_temp_k;
    let edge = |sun_au: f64, a: f64, b: f64| {
        let denom = 1.0 + a * dt - b * dt * dt;
        if denom <= 0.0 || luminosity <= 0.0 {
            None
        } else {
            Some(sun_au * (luminosity / denom).sqrt())
        }
    };
    let inner = edge(config.inner_sun_au, config.inner_a, config.inner_b)?;
    let outer = edge(config.outer_sun_au, config.outer_a, config.outer_b)?;
    (inner.is_finite() && outer.is_finite() && outer > inner).then_some((inner, outer))
}

/// Semi-major axis from the period by Kepler's third law, with the stellar
/// mass taken as L^(1/4) solar masses.
pub fn orbit_from_period(period_days: f64, luminosity: f64) -> Option<f64> {
    if period_days <= 0.0 || luminosity <= 0.0 {
        return None;
    }
    let years = period_days / DAYS_PER_YEAR;
    let stellar_mass = luminosity.powf(0.25);
    Some((stellar_mass * years * years).cbrt())
}

/// Zone geometry at a given orbit.
pub fn habitable_zone(
    config: &HabitabilityConfig,
    luminosity: f64,
    star_temp_k: f64,
    orbit_au: f64,
    orbit_estimated: bool,
) -> Option<HabitableZone> {
    let (inner_au, outer_au) = zone_edges(config, luminosity, star_temp_k)?;
    let centre = (inner_au + outer_au) / 2.0;
    let half_width = (outer_au - inner_au) / 2.0;
    Some(HabitableZone {
        inner_au,
        outer_au,
        hzd: (orbit_au - centre) / half_width,
        orbit_au,
        orbit_estimated,
    })
}

/// Equilibrium temperature: coefficient · L^(1/4) / √a.
pub fn equilibrium_temperature(config: &HabitabilityConfig, luminosity: f64, orbit_au: f64) -> Option<f64> {
    if orbit_au <= 0.0 || luminosity < 0.0 {
        return None;
    }
    let t = config.equilibrium_coefficient_k * luminosity.powf(0.25) / orbit_au.sqrt();
    t.is_finite().then_some(t)
}

/// The assessment rule. Any missing input yields `InsufficientData`.
///
/// - Likely: inside the zone, star in the temperature band, ESI ≥ likely.
/// - Possibly: (inside the zone, or star in band and within the extended
///   band) and ESI ≥ possible.
/// - Otherwise not habitable.
pub fn assess(
    config: &HabitabilityConfig,
    star_temp_k: Option<f64>,
    hzd: Option<f64>,
    esi: Option<f64>,
) -> Habitability {
    let (Some(temp), Some(hzd), Some(esi)) = (star_temp_k, hzd, esi) else {
        return Habitability::InsufficientData;
    };

    let in_zone = hzd.abs() <= config.zone_hzd;
    let star_ok = (config.star_temp_min_k..=config.star_temp_max_k).contains(&temp);
    let near_zone = star_ok && hzd.abs() <= config.extended_zone_hzd;

    if in_zone && star_ok && esi >= config.likely_esi {
        Habitability::LikelyHabitable
    } else if (in_zone || near_zone) && esi >= config.possible_esi {
        Habitability::PossiblyHabitable
    } else {
        Habitability::NotHabitable
    }
}
