use anyhow::Result;
use async_trait::async_trait;

use crate::pipeline::events::PipelineEvent;

/// Destination for the per-row event log of an ingest run
#[async_trait]
pub trait EventLogPort: Send + Sync {
    async fn write_events(&self, events: &[PipelineEvent]) -> Result<()>;
}
