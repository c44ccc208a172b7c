// Persistence boundary: record set stores and the published catalog snapshot

pub mod in_memory;
pub mod json_file;
pub mod snapshot;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::NormalizedPlanet;
use crate::error::{CatalogError, Result};

pub use in_memory::InMemoryPlanetStore;
pub use json_file::JsonFilePlanetStore;
pub use snapshot::{fingerprint, Catalog, Generation};

/// Storage trait for the normalized record set. A write replaces the whole
/// set; there is no partial update.
#[async_trait]
pub trait PlanetStore: Send + Sync {
    /// Short backend label for logs and metrics
    fn backend(&self) -> &'static str;

    /// Replace the stored set. Fails without writing if two planets share a name.
    async fn replace_all(&self, planets: &[NormalizedPlanet]) -> Result<()>;

    /// The stored set, ordered by name
    async fn load_all(&self) -> Result<Vec<NormalizedPlanet>>;
}

/// Enforce the planet name uniqueness invariant.
pub fn ensure_unique_names(planets: &[NormalizedPlanet]) -> Result<()> {
    let mut seen = HashSet::with_capacity(planets.len());
    for planet in planets {
        if !seen.insert(planet.name.as_str()) {
            return Err(CatalogError::DuplicateName(planet.name.clone()));
        }
    }
    Ok(())
}
