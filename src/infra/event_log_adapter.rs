use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::EventLogPort;
use crate::pipeline::events::PipelineEvent;

/// Writes the event log as NDJSON, one event per line, replacing any
/// previous run's log.
pub struct FileEventLogAdapter {
    path: PathBuf,
}

impl FileEventLogAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventLogPort for FileEventLogAdapter {
    async fn write_events(&self, events: &[PipelineEvent]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let mut body = String::new();
        for event in events {
            body.push_str(&serde_json::to_string(event)?);
            body.push('\n');
        }
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write event log {}", self.path.display()))?;

        info!(path = %self.path.display(), events = events.len(), "Wrote pipeline event log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_one_line_per_event() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("logs").join("events.ndjson");
        let adapter = FileEventLogAdapter::new(&path);

        adapter
            .write_events(&[
                PipelineEvent::rejected(3, "missing planet name"),
                PipelineEvent::Superseded {
                    planet: "A b".to_string(),
                    superseded_row: 0,
                    winning_row: 4,
                },
            ])
            .await?;

        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(first["kind"], "rejected");
        assert_eq!(first["row"], 3);
        Ok(())
    }
}
