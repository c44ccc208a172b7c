//! Layman explanation templates. Presentation only: nothing here feeds back
//! into classification.

use super::classify::{classify, is_giant, TextBucket};
use crate::domain::{Explanations, Habitability, NormalizedPlanet, PlanetType, StarType};

const fn bucket(below: f64, text: &'static str) -> TextBucket {
    TextBucket { below, text }
}

static DISTANCE_BUCKETS: [TextBucket; 5] = [
    bucket(10.0, "It is one of our nearest neighbours among the stars."),
    bucket(50.0, "It is close by astronomical standards."),
    bucket(500.0, "Its light has travelled for centuries to reach us."),
    bucket(5000.0, "It is far beyond the stars visible to the naked eye."),
    bucket(f64::INFINITY, "It lies deep in the galaxy, far beyond any other planet we could visit."),
];

static SIZE_BUCKETS: [TextBucket; 6] = [
    bucket(0.8, "It is smaller than Earth, closer to Mars or Mercury in size."),
    bucket(1.25, "It is roughly the same size as Earth."),
    bucket(2.0, "It is somewhat larger than Earth."),
    bucket(6.0, "It is between Earth and Neptune in size."),
    bucket(15.0, "It is comparable to Neptune or Saturn in size."),
    bucket(f64::INFINITY, "It is at least as large as Jupiter."),
];

static MASS_BUCKETS: [TextBucket; 6] = [
    bucket(0.5, "It is lighter than Earth."),
    bucket(2.0, "It is close to Earth's mass."),
    bucket(10.0, "It is heavier than Earth, in the super-Earth range."),
    bucket(50.0, "It is in the range of Neptune-like planets."),
    bucket(318.0, "It is in the range of Saturn-like gas giants."),
    bucket(f64::INFINITY, "It is at least as massive as Jupiter."),
];

static GRAVITY_BUCKETS: [TextBucket; 5] = [
    bucket(0.5, "You would feel much lighter than on Earth."),
    bucket(0.9, "You would feel a little lighter than on Earth."),
    bucket(1.1, "It would feel much like standing on Earth."),
    bucket(2.0, "You would feel noticeably heavier than on Earth."),
    bucket(f64::INFINITY, "Standing upright would be a struggle."),
];

fn star_description(star_type: StarType, giant: bool) -> &'static str {
    match (star_type, giant) {
        (StarType::O, _) => "extremely hot O-type star",
        (StarType::B, _) => "very hot B-type star",
        (StarType::A, _) => "hot A-type star",
        (StarType::F, _) => "F-type star (hotter than our Sun)",
        (StarType::G, true) => "G-type giant star",
        (StarType::G, false) => "G-type star (similar to our Sun)",
        (StarType::K, true) => "K-type giant star",
        (StarType::K, false) => "K-type orange dwarf star",
        (StarType::M, true) => "M-type giant star",
        (StarType::M, false) => "M-type red dwarf star",
        (StarType::BrownDwarf, _) => "very cool brown dwarf",
        (StarType::Unknown, _) => "star of unknown type",
    }
}

fn with_bucket(sentence: String, table: &[TextBucket], value: f64) -> String {
    match classify(table, &value) {
        Some(text) => format!("{} {}", sentence, text),
        None => sentence,
    }
}

fn distance(p: &NormalizedPlanet) -> Option<String> {
    let d = p.physical.distance_ly.value()?;
    Some(with_bucket(
        format!("This planet is approximately {:.1} light years away from Earth.", d),
        &DISTANCE_BUCKETS,
        d,
    ))
}

fn size(p: &NormalizedPlanet) -> Option<String> {
    let r = p.physical.radius_earth.value()?;
    Some(with_bucket(
        format!("This planet is approximately {:.1} times the radius of Earth.", r),
        &SIZE_BUCKETS,
        r,
    ))
}

fn mass(p: &NormalizedPlanet) -> Option<String> {
    let m = p.physical.mass_earth.value()?;
    let sentence = if p.physical.minimum_mass {
        format!(
            "This planet has a minimum mass of approximately {:.1} times the mass of Earth; radial velocity measurements only bound it from below.",
            m
        )
    } else {
        format!("This planet has approximately {:.1} times the mass of Earth.", m)
    };
    Some(with_bucket(sentence, &MASS_BUCKETS, m))
}

fn gravity(p: &NormalizedPlanet) -> Option<String> {
    let g = p.derived.surface_gravity_earth.value()?;
    Some(with_bucket(
        format!(
            "The surface gravity on this planet would be approximately {:.1} times that of Earth.",
            g
        ),
        &GRAVITY_BUCKETS,
        g,
    ))
}

fn year_length(p: &NormalizedPlanet) -> Option<String> {
    let days = p.physical.orbital_period_days.value()?;
    Some(if days < 1.0 {
        format!(
            "A year on this planet lasts approximately {:.1} hours, which is much shorter than Earth's year.",
            days * 24.0
        )
    } else if days < 10.0 {
        format!(
            "A year on this planet lasts approximately {:.1} days, which is much shorter than Earth's year.",
            days
        )
    } else {
        format!(
            "A year on this planet lasts approximately {:.1} days (Earth's year is 365.25 days).",
            days
        )
    })
}

fn star_type(p: &NormalizedPlanet) -> Option<String> {
    let kind = p.derived.star_type;
    let temp = p.physical.star_temp_k.value();
    let giant = p.physical.spectral_type.as_deref().map_or(false, is_giant);
    match (kind, temp) {
        (StarType::Unknown, None) => None,
        (StarType::Unknown, Some(t)) => Some(format!(
            "This planet orbits a star with a temperature of {:.0} K (our Sun is about 5778 K).",
            t
        )),
        (k, Some(t)) => Some(format!(
            "This planet orbits a {} with a temperature of {:.0} K (our Sun is about 5778 K).",
            star_description(k, giant),
            t
        )),
        (k, None) => Some(format!("This planet orbits a {}.", star_description(k, giant))),
    }
}

fn planet_type(p: &NormalizedPlanet) -> String {
    match p.derived.planet_type {
        PlanetType::Unknown => {
            "Insufficient data to determine what kind of planet this is.".to_string()
        }
        PlanetType::Rocky => "This appears to be a rocky, Earth-like terrestrial planet.".to_string(),
        PlanetType::SuperEarth => {
            "This appears to be a super-Earth, larger than our planet but smaller than Neptune."
                .to_string()
        }
        PlanetType::NeptuneLike => "This appears to be a Neptune-like planet.".to_string(),
        PlanetType::GasGiant => "This appears to be a gas giant like Jupiter or Saturn.".to_string(),
    }
}

fn habitability(p: &NormalizedPlanet) -> String {
    let position = p.derived.habitable_zone.map(|zone| {
        if zone.hzd < -1.0 {
            "This planet is too close to its star (too hot)."
        } else if zone.hzd > 1.0 {
            "This planet is too far from its star (too cold)."
        } else {
            "This planet is within the habitable zone."
        }
    });
    let verdict = match p.derived.habitability {
        Habitability::LikelyHabitable => "Its size and temperature make it likely habitable.",
        Habitability::PossiblyHabitable => "It could possibly support liquid water.",
        Habitability::NotHabitable => "It is unlikely to be habitable.",
        Habitability::InsufficientData => "Insufficient data to determine habitability.",
    };
    match position {
        Some(pos) => format!("{} {}", pos, verdict),
        None => verdict.to_string(),
    }
}

/// Build every explanation for a planet whose derived fields are current.
pub fn explain(p: &NormalizedPlanet) -> Explanations {
    Explanations {
        distance: distance(p),
        size: size(p),
        mass: mass(p),
        gravity: gravity(p),
        year_length: year_length(p),
        star_type: star_type(p),
        planet_type: Some(planet_type(p)),
        habitability: Some(habitability(p)),
    }
}
