use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{ensure_unique_names, PlanetStore};
use crate::domain::NormalizedPlanet;
use crate::error::Result;

/// Record set persisted as one pretty-printed JSON array. Writes go to a
/// sibling temp file that is then renamed over the target.
pub struct JsonFilePlanetStore {
    path: PathBuf,
}

impl JsonFilePlanetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PlanetStore for JsonFilePlanetStore {
    fn backend(&self) -> &'static str {
        "json_file"
    }

    async fn replace_all(&self, planets: &[NormalizedPlanet]) -> Result<()> {
        ensure_unique_names(planets)?;
        let mut sorted: Vec<&NormalizedPlanet> = planets.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        let body = serde_json::to_vec_pretty(&sorted)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &body).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        info!(
            path = %self.path.display(),
            planets = planets.len(),
            bytes = body.len(),
            "Wrote planet record set"
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<NormalizedPlanet>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "No stored record set yet");
            return Ok(Vec::new());
        }
        let body = tokio::fs::read(&self.path).await?;
        let mut planets: Vec<NormalizedPlanet> = serde_json::from_slice(&body)?;
        ensure_unique_names(&planets)?;
        planets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(planets)
    }
}
