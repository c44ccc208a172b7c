use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

use exo_catalog::app::IngestUseCase;
use exo_catalog::config::CatalogConfig;
use exo_catalog::constants::{JUPITER_MASS_IN_EARTH, PARSEC_IN_LIGHT_YEARS};
use exo_catalog::pipeline::events::PipelineEvent;
use exo_catalog::pipeline::ingestion::{JsonFileSource, RawRecord};
use exo_catalog::pipeline::storage::{fingerprint, Catalog, JsonFilePlanetStore, PlanetStore};
use exo_catalog::query::{Category, PageRequest, PlanetField, QueryEngine};
use exo_catalog::{Habitability, Measure, Pipeline, PlanetType};

fn raw_rows() -> Vec<RawRecord> {
    vec![
        RawRecord::new(
            0,
            json!({
                "pl_name": "Kepler-442 b",
                "hostname": "Kepler-442",
                "discoverymethod": "Transit",
                "disc_year": 2015,
                "mass_ratio_raw": "1.0 (Jupiter masses)",
                "pl_rade": 1.34,
                "pl_orbper": 112.3,
                "sy_dist": 370.0,
                "st_teff": 4402,
                "st_rad": 0.6
            }),
        ),
        RawRecord::new(
            1,
            json!({
                "pl_name": "Empty Distance b",
                "disc_year": "2021",
                "distance_raw": "",
                "pl_bmasse": "3.1",
                "pl_rade": "n/a"
            }),
        ),
        RawRecord::new(2, json!({"hostname": "Nameless"})),
        RawRecord::new(
            3,
            json!({
                "pl_name": "Garbage b",
                "pl_bmasse": "heavy-ish",
                "pl_rade": {"nested": true},
                "pl_orbper": "-4",
                "st_teff": "5000 furlongs",
                "disc_year": 1850
            }),
        ),
        RawRecord::new(4, json!({"pl_name": "Twin b", "pl_bmasse": 1.0, "pl_rade": 1.0})),
        RawRecord::new(
            5,
            json!({"pl_name": "Twin b", "pl_bmasse": 5.0, "pl_rade": 1.7, "sy_dist": "12 pc"}),
        ),
    ]
}

#[test]
fn jupiter_mass_annotation_converts_exactly() {
    let output = Pipeline::default().run(&raw_rows());
    let kepler = output
        .planets
        .iter()
        .find(|p| p.name == "Kepler-442 b")
        .unwrap();
    assert_eq!(kepler.physical.mass_earth, Measure::Known(1.0 * JUPITER_MASS_IN_EARTH));
    assert_eq!(kepler.physical.distance_ly, Measure::Known(370.0 * PARSEC_IN_LIGHT_YEARS));
    assert_eq!(kepler.derived.planet_type, PlanetType::GasGiant);
}

#[test]
fn empty_distance_is_unknown_and_recent_filter_still_applies() {
    let output = Pipeline::default().run(&raw_rows());
    let planet = output
        .planets
        .iter()
        .find(|p| p.name == "Empty Distance b")
        .unwrap();
    assert!(planet.physical.distance_ly.is_unknown());
    assert!(planet.physical.radius_earth.is_unknown());
    assert_eq!(planet.derived.planet_type, PlanetType::Unknown);

    let catalog = Catalog::new();
    catalog.publish(output.planets).unwrap();
    let engine =
        QueryEngine::new(catalog.current(), CatalogConfig::default().categories).with_current_year(2024);
    let recent = engine
        .category(
            &Category::RecentlyDiscovered { years: Some(5) },
            &PageRequest::default(),
        )
        .unwrap();
    assert_eq!(recent.names(), vec!["Empty Distance b"]);
}

#[test]
fn malformed_fields_demote_without_rejecting_the_row() {
    let output = Pipeline::default().run(&raw_rows());
    let garbage = output.planets.iter().find(|p| p.name == "Garbage b").unwrap();
    assert!(garbage.physical.mass_earth.is_unknown());
    assert!(garbage.physical.radius_earth.is_unknown());
    assert!(garbage.physical.orbital_period_days.is_unknown());
    assert!(garbage.physical.star_temp_k.is_unknown());
    assert!(garbage.discovery_year.is_unknown());

    let demoted: Vec<_> = output
        .log
        .demotions_for("Garbage b")
        .into_iter()
        .map(|(field, _)| field)
        .collect();
    for field in ["mass_earth", "radius_earth", "orbital_period_days", "star_temp_k", "discovery_year"] {
        assert!(demoted.contains(&field), "{} not demoted", field);
    }

    assert_eq!(output.summary.rejected, 1);
    assert!(matches!(output.log.rejected().next(), Some(PipelineEvent::Rejected { row: 2, .. })));
}

#[test]
fn later_duplicate_wins_and_earlier_is_logged() {
    let output = Pipeline::default().run(&raw_rows());
    let twins: Vec<_> = output.planets.iter().filter(|p| p.name == "Twin b").collect();
    assert_eq!(twins.len(), 1);
    assert_eq!(twins[0].physical.mass_earth, Measure::Known(5.0));
    assert_eq!(twins[0].physical.radius_earth, Measure::Known(1.7));

    let superseded: Vec<_> = output.log.superseded().collect();
    assert_eq!(
        superseded,
        vec![&PipelineEvent::Superseded {
            planet: "Twin b".to_string(),
            superseded_row: 4,
            winning_row: 5,
        }]
    );
}

#[test]
fn derived_field_invariants_hold_for_every_planet() {
    let output = Pipeline::default().run(&raw_rows());
    for p in &output.planets {
        if p.physical.mass_earth.is_unknown() || p.physical.radius_earth.is_unknown() {
            assert_eq!(p.derived.planet_type, PlanetType::Unknown, "{}", p.name);
        }
        if let Some(esi) = p.derived.esi.value() {
            assert!((0.0..=1.0).contains(&esi), "{} esi {}", p.name, esi);
        }
    }
}

#[test]
fn vanishing_radius_leaves_esi_unknown() {
    let row = RawRecord::new(
        0,
        json!({
            "pl_name": "Speck b",
            "pl_bmasse": 1.0,
            "pl_rade": "1e-200",
            "pl_orbsmax": 1.0,
            "st_teff": 5778,
            "st_rad": 1.0
        }),
    );
    let output = Pipeline::default().run(&[row]);
    let speck = &output.planets[0];
    assert_eq!(speck.physical.radius_earth, Measure::Known(1e-200));
    assert!(speck.derived.surface_gravity_earth.is_unknown());
    assert!(speck.derived.esi.is_unknown());
    assert_eq!(speck.derived.habitability, Habitability::InsufficientData);
    assert!(speck.explanations.gravity.is_none());
}

#[test]
fn extreme_but_valid_inputs_keep_derived_values_finite() {
    let cases = [
        json!({"pl_name": "Tiny radius", "pl_bmasse": 1.0, "pl_rade": 1e-160, "pl_orbsmax": 1.0, "st_teff": 5778, "st_rad": 1.0}),
        json!({"pl_name": "Zero radius", "pl_bmasse": 1.0, "pl_rade": 0.0, "pl_orbsmax": 1.0, "st_teff": 5778, "st_rad": 1.0}),
        json!({"pl_name": "Zero mass", "pl_bmasse": 0.0, "pl_rade": 1.0, "pl_orbsmax": 1.0, "st_teff": 5778, "st_rad": 1.0}),
        json!({"pl_name": "Brown dwarf limit", "pl_bmassj": 79.9, "pl_rade": 1e-10, "pl_orbsmax": 1.0, "st_teff": 5778, "st_rad": 1.0}),
        json!({"pl_name": "Blazing host", "pl_bmasse": 1.0, "pl_rade": 1.0, "pl_orbsmax": 1.0, "st_teff": 5778, "st_lum": 7.9}),
        json!({"pl_name": "Hugging orbit", "pl_bmasse": 1.0, "pl_rade": 1.0, "pl_orbsmax": 1e-300, "st_teff": 5778, "st_rad": 1.0}),
        json!({"pl_name": "Hottest star", "pl_bmasse": 1.0, "pl_rade": 1.0, "pl_orbsmax": 1e5, "st_teff": 99999, "st_rad": 4999.0}),
        json!({"pl_name": "Period only", "pl_bmasse": 1.0, "pl_rade": 50.0, "pl_orbper": 1e-9, "st_teff": 2601, "st_rad": 1e-6}),
    ];
    let rows: Vec<_> = cases
        .into_iter()
        .enumerate()
        .map(|(i, value)| RawRecord::new(i, value))
        .collect();
    let output = Pipeline::default().run(&rows);
    assert_eq!(output.planets.len(), rows.len());

    for p in &output.planets {
        for field in PlanetField::all() {
            if let Some(value) = field.number(p) {
                assert!(value.is_finite(), "{} {} = {}", p.name, field, value);
            }
        }
        if let Some(esi) = p.derived.esi.value() {
            assert!((0.0..=1.0).contains(&esi), "{} esi {}", p.name, esi);
        } else {
            assert_ne!(p.derived.habitability, Habitability::LikelyHabitable, "{}", p.name);
            assert_ne!(p.derived.habitability, Habitability::PossiblyHabitable, "{}", p.name);
        }
        if let Some(zone) = &p.derived.habitable_zone {
            for x in [zone.inner_au, zone.outer_au, zone.hzd, zone.orbit_au] {
                assert!(x.is_finite(), "{} zone {:?}", p.name, zone);
            }
        }
    }
}

#[tokio::test]
async fn rerun_on_unchanged_input_is_byte_identical() -> Result<()> {
    let pipeline = Pipeline::default();
    let first = pipeline.run(&raw_rows());
    let second = pipeline.run_sharded(raw_rows(), 3).await?;
    assert_eq!(
        serde_json::to_vec(&first.planets)?,
        serde_json::to_vec(&second.planets)?
    );
    assert_eq!(fingerprint(&first.planets)?, fingerprint(&second.planets)?);
    Ok(())
}

#[tokio::test]
async fn file_source_to_file_store_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("raw.json");
    let rows: Vec<_> = raw_rows().into_iter().map(|r| r.value).collect();
    std::fs::write(&input, serde_json::to_vec(&rows)?)?;

    let store = Arc::new(JsonFilePlanetStore::new(dir.path().join("planets.json")));
    let catalog = Arc::new(Catalog::new());
    let use_case = IngestUseCase::new(Pipeline::default(), store.clone(), catalog.clone());

    let (first, _) = use_case.ingest(&JsonFileSource::new(&input)).await?;
    let (second, _) = use_case.ingest(&JsonFileSource::new(&input)).await?;
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(second.sequence, 2);
    assert_eq!(second.summary.planets, 4);

    let stored = store.load_all().await?;
    assert_eq!(fingerprint(&stored)?, second.fingerprint);
    assert_eq!(catalog.current().planets, stored);
    Ok(())
}
