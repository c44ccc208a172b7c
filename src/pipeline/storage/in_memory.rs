use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{ensure_unique_names, PlanetStore};
use crate::domain::NormalizedPlanet;
use crate::error::Result;

/// In-memory store for development and tests
#[derive(Clone, Default)]
pub struct InMemoryPlanetStore {
    planets: Arc<RwLock<Vec<NormalizedPlanet>>>,
}

impl InMemoryPlanetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanetStore for InMemoryPlanetStore {
    fn backend(&self) -> &'static str {
        "in_memory"
    }

    async fn replace_all(&self, planets: &[NormalizedPlanet]) -> Result<()> {
        ensure_unique_names(planets)?;
        let mut sorted = planets.to_vec();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut guard = self.planets.write().await;
        *guard = sorted;
        debug!("Stored {} planets in memory", guard.len());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<NormalizedPlanet>> {
        Ok(self.planets.read().await.clone())
    }
}
