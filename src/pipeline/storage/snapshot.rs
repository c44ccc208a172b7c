//! Published record set. Readers take an `Arc` to one generation and keep
//! reading it even while a newer one is published.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

use super::ensure_unique_names;
use crate::domain::NormalizedPlanet;
use crate::error::Result;
use crate::observability::metrics;

/// One complete, immutable snapshot of the normalized catalog
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub id: Uuid,
    /// 0 for the empty catalog, then +1 per publish
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the serialized planets, hex encoded
    pub fingerprint: String,
    pub planets: Vec<NormalizedPlanet>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Generation {
    fn build(mut planets: Vec<NormalizedPlanet>) -> Result<Self> {
        ensure_unique_names(&planets)?;
        planets.sort_by(|a, b| a.name.cmp(&b.name));
        let fingerprint = fingerprint(&planets)?;
        let by_name = planets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            sequence: 0,
            created_at: Utc::now(),
            fingerprint,
            planets,
            by_name,
        })
    }

    fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            created_at: Utc::now(),
            fingerprint: hex::encode(Sha256::digest(b"[]")),
            planets: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    /// Exact lookup by planet name
    pub fn get(&self, name: &str) -> Option<&NormalizedPlanet> {
        self.by_name.get(name).map(|&i| &self.planets[i])
    }
}

/// Hex SHA-256 over the JSON serialization of a record set.
pub fn fingerprint(planets: &[NormalizedPlanet]) -> Result<String> {
    let bytes = serde_json::to_vec(planets)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Holder of the current generation. `publish` builds the new generation
/// completely before swapping a single pointer.
#[derive(Debug)]
pub struct Catalog {
    current: RwLock<Arc<Generation>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::empty())),
        }
    }

    /// The generation readers should use right now
    pub fn current(&self) -> Arc<Generation> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the published record set. On error the previous generation
    /// stays current.
    pub fn publish(&self, planets: Vec<NormalizedPlanet>) -> Result<Arc<Generation>> {
        let mut built = Generation::build(planets)?;

        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        built.sequence = guard.sequence + 1;
        let next = Arc::new(built);
        *guard = Arc::clone(&next);
        drop(guard);

        info!(
            generation = %next.id,
            sequence = next.sequence,
            planets = next.len(),
            fingerprint = %next.fingerprint,
            "Published catalog generation"
        );
        metrics::catalog::generation_published(next.len());
        Ok(next)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measure;
    use crate::error::CatalogError;

    fn planet(name: &str, mass: f64) -> NormalizedPlanet {
        let mut p = NormalizedPlanet::new(name);
        p.physical.mass_earth = Measure::Known(mass);
        p
    }

    #[test]
    fn test_new_catalog_is_empty_generation_zero() {
        let catalog = Catalog::new();
        let current = catalog.current();
        assert_eq!(current.sequence, 0);
        assert!(current.is_empty());
        assert_eq!(current.fingerprint, fingerprint(&[]).unwrap());
    }

    #[test]
    fn test_old_readers_keep_their_generation() {
        let catalog = Catalog::new();
        catalog.publish(vec![planet("a", 1.0)]).unwrap();
        let reader = catalog.current();

        catalog.publish(vec![planet("b", 2.0), planet("c", 3.0)]).unwrap();
        assert_eq!(reader.len(), 1);
        assert!(reader.get("a").is_some());

        let latest = catalog.current();
        assert_eq!(latest.sequence, 2);
        assert_eq!(latest.len(), 2);
        assert!(latest.get("a").is_none());
    }

    #[test]
    fn test_fingerprint_is_order_independent_and_content_sensitive() {
        let catalog = Catalog::new();
        let first = catalog.publish(vec![planet("a", 1.0), planet("b", 2.0)]).unwrap();
        let second = catalog.publish(vec![planet("b", 2.0), planet("a", 1.0)]).unwrap();
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_ne!(first.id, second.id);

        let third = catalog.publish(vec![planet("a", 1.5), planet("b", 2.0)]).unwrap();
        assert_ne!(first.fingerprint, third.fingerprint);
    }

    #[test]
    fn test_failed_publish_keeps_current() {
        let catalog = Catalog::new();
        catalog.publish(vec![planet("a", 1.0)]).unwrap();
        let result = catalog.publish(vec![planet("x", 1.0), planet("x", 2.0)]);
        assert!(matches!(result, Err(CatalogError::DuplicateName(_))));
        assert_eq!(catalog.current().sequence, 1);
        assert!(catalog.current().get("a").is_some());
    }
}
