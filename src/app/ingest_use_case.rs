use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::app::ports::EventLogPort;
use crate::observability::metrics;
use crate::pipeline::events::PipelineLog;
use crate::pipeline::ingestion::RowSource;
use crate::pipeline::storage::{Catalog, Generation, PlanetStore};
use crate::pipeline::{Pipeline, PipelineSummary};

/// What an ingest run produced
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub generation_id: Uuid,
    pub sequence: u64,
    pub fingerprint: String,
    pub summary: PipelineSummary,
}

/// Use case for a full catalog rebuild: read the source, run the pipeline,
/// persist the record set, then publish it as the new generation.
pub struct IngestUseCase {
    pipeline: Pipeline,
    store: Arc<dyn PlanetStore>,
    catalog: Arc<Catalog>,
    event_log: Option<Box<dyn EventLogPort>>,
    shards: usize,
}

impl IngestUseCase {
    pub fn new(pipeline: Pipeline, store: Arc<dyn PlanetStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            pipeline,
            store,
            catalog,
            event_log: None,
            shards: 1,
        }
    }

    pub fn with_event_log(mut self, event_log: Box<dyn EventLogPort>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    /// Rebuild the catalog from `source`. The store is written before the
    /// generation is published, so readers only ever see a persisted set.
    #[instrument(skip_all, fields(shards = self.shards, backend = self.store.backend()))]
    pub async fn ingest(&self, source: &dyn RowSource) -> Result<(IngestReport, PipelineLog)> {
        let rows = source.rows().context("Failed to read raw catalog source")?;
        info!(rows = rows.len(), "Read raw catalog rows");

        let output = self
            .pipeline
            .run_sharded(rows, self.shards)
            .await
            .context("Pipeline run failed")?;

        if let Some(event_log) = &self.event_log {
            event_log.write_events(&output.log.events).await?;
        }

        let backend = self.store.backend();
        if let Err(e) = self.store.replace_all(&output.planets).await {
            metrics::store::write_error(backend);
            return Err(e).context("Failed to persist normalized record set");
        }
        metrics::store::write_success(backend);

        let generation = self
            .catalog
            .publish(output.planets)
            .context("Failed to publish catalog generation")?;

        let report = IngestReport {
            generation_id: generation.id,
            sequence: generation.sequence,
            fingerprint: generation.fingerprint.clone(),
            summary: output.summary,
        };
        Ok((report, output.log))
    }

    /// Publish whatever the store currently holds
    pub async fn restore(&self) -> Result<Arc<Generation>> {
        let planets = self
            .store
            .load_all()
            .await
            .context("Failed to load stored record set")?;
        if planets.is_empty() {
            warn!(backend = self.store.backend(), "Store is empty; run ingest first");
        }
        self.catalog
            .publish(planets)
            .context("Failed to publish stored record set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::PipelineEvent;
    use crate::pipeline::ingestion::{RawRecord, VecSource};
    use crate::pipeline::storage::InMemoryPlanetStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct MockEventLog {
        events: Arc<tokio::sync::Mutex<Vec<PipelineEvent>>>,
    }

    #[async_trait]
    impl EventLogPort for MockEventLog {
        async fn write_events(&self, events: &[PipelineEvent]) -> Result<()> {
            self.events.lock().await.extend_from_slice(events);
            Ok(())
        }
    }

    fn source() -> VecSource {
        VecSource::new(vec![
            RawRecord::new(0, json!({"pl_name": "A b", "pl_bmasse": 1.0, "pl_rade": 1.0})),
            RawRecord::new(1, json!({"hostname": "nameless"})),
            RawRecord::new(2, json!({"pl_name": "B b", "pl_bmassj": 1.0})),
        ])
    }

    #[tokio::test]
    async fn test_ingest_persists_then_publishes() -> Result<()> {
        let store = Arc::new(InMemoryPlanetStore::new());
        let catalog = Arc::new(Catalog::new());
        let events = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let use_case = IngestUseCase::new(Pipeline::default(), store.clone(), catalog.clone())
            .with_event_log(Box::new(MockEventLog {
                events: events.clone(),
            }))
            .with_shards(2);

        let (report, log) = use_case.ingest(&source()).await?;
        assert_eq!(report.sequence, 1);
        assert_eq!(report.summary.planets, 2);
        assert_eq!(report.summary.rejected, 1);
        assert_eq!(store.load_all().await?.len(), 2);
        assert_eq!(catalog.current().fingerprint, report.fingerprint);
        assert_eq!(events.lock().await.len(), log.len());
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_republishes_stored_set() -> Result<()> {
        let store = Arc::new(InMemoryPlanetStore::new());
        let first = IngestUseCase::new(Pipeline::default(), store.clone(), Arc::new(Catalog::new()));
        let (report, _) = first.ingest(&source()).await?;

        let fresh = Arc::new(Catalog::new());
        let second = IngestUseCase::new(Pipeline::default(), store, fresh.clone());
        let generation = second.restore().await?;
        assert_eq!(generation.fingerprint, report.fingerprint);
        assert_eq!(fresh.current().len(), 2);
        Ok(())
    }
}
