// Data processing pipeline: ingestion, processing, and storage

pub mod events;
pub mod ingestion;
pub mod processing;
pub mod storage;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::CatalogConfig;
use crate::domain::NormalizedPlanet;
use crate::error::{CatalogError, Result};
use crate::observability::metrics;
use events::{PipelineEvent, PipelineLog};
use ingestion::RawRecord;
use processing::{
    resolve_duplicates, DefaultEnricher, DefaultNormalizer, DefaultQualityGate, Enricher,
    Normalizer, QualityGate, RowPlanet,
};

/// Counts for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_rows: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub fields_demoted: usize,
    pub superseded: usize,
    pub derivations_insufficient: usize,
    pub planets: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Unique by name, ordered by name
    pub planets: Vec<NormalizedPlanet>,
    pub log: PipelineLog,
    pub summary: PipelineSummary,
}

/// Outcome of one raw row: the planet it produced, if any, and its events.
#[derive(Debug, Clone)]
struct RowOutcome {
    planet: Option<RowPlanet>,
    events: Vec<PipelineEvent>,
}

/// Normalize → validate → derive, per row, then duplicate resolution over
/// the merged batch.
#[derive(Clone)]
pub struct Pipeline {
    normalizer: Arc<dyn Normalizer>,
    quality_gate: Arc<dyn QualityGate>,
    enricher: Arc<dyn Enricher>,
}

impl Pipeline {
    pub fn new(
        normalizer: Arc<dyn Normalizer>,
        quality_gate: Arc<dyn QualityGate>,
        enricher: Arc<dyn Enricher>,
    ) -> Self {
        Self {
            normalizer,
            quality_gate,
            enricher,
        }
    }

    /// Pipeline built from the default stages configured by `config`
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            Arc::new(DefaultNormalizer::new(config.units.clone())),
            Arc::new(DefaultQualityGate::with_config(config.validation.clone())),
            Arc::new(DefaultEnricher::new(
                config.classification.clone(),
                config.habitability.clone(),
                config.esi.clone(),
            )),
        )
    }

    fn process_row(&self, record: &RawRecord) -> RowOutcome {
        let normalized = match self.normalizer.normalize(record) {
            Ok(out) => out,
            Err(rejection) => {
                debug!(row = record.row, "Row rejected");
                return RowOutcome {
                    planet: None,
                    events: vec![rejection],
                };
            }
        };

        let mut events = normalized.events;
        let assessed = self.quality_gate.assess(record.row, normalized.planet);
        events.extend(assessed.events);
        let enriched = self.enricher.enrich(assessed.planet);
        events.extend(enriched.events);

        RowOutcome {
            planet: Some(RowPlanet {
                row: record.row,
                planet: enriched.planet,
            }),
            events,
        }
    }

    /// Process one row on its own, outside a batch. `None` for a rejected row.
    pub fn process_one(&self, record: &RawRecord) -> (Option<NormalizedPlanet>, Vec<PipelineEvent>) {
        let outcome = self.process_row(record);
        (outcome.planet.map(|p| p.planet), outcome.events)
    }

    fn process_chunk(&self, rows: &[RawRecord]) -> Vec<RowOutcome> {
        rows.iter().map(|r| self.process_row(r)).collect()
    }

    /// Run the whole batch on the current thread.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: &[RawRecord]) -> PipelineOutput {
        let started = Instant::now();
        info!("Starting pipeline run");
        let outcomes = self.process_chunk(rows);
        self.finish(rows.len(), outcomes, started)
    }

    /// Run the batch split across `shards` blocking workers. Shard results are
    /// merged back in input order before duplicate resolution, so the output
    /// is identical to `run`.
    #[instrument(skip_all, fields(rows = rows.len(), shards = shards))]
    pub async fn run_sharded(&self, rows: Vec<RawRecord>, shards: usize) -> Result<PipelineOutput> {
        let started = Instant::now();
        let total = rows.len();
        let shards = shards.max(1);
        let chunk_size = total.div_ceil(shards).max(1);
        info!(chunk_size, "Starting sharded pipeline run");

        let handles: Vec<_> = rows
            .chunks(chunk_size)
            .map(|chunk| {
                let pipeline = self.clone();
                let chunk = chunk.to_vec();
                tokio::task::spawn_blocking(move || pipeline.process_chunk(&chunk))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(total);
        for handle in handles {
            let chunk = handle
                .await
                .map_err(|e| CatalogError::Worker(e.to_string()))?;
            outcomes.extend(chunk);
        }

        Ok(self.finish(total, outcomes, started))
    }

    fn finish(&self, total_rows: usize, outcomes: Vec<RowOutcome>, started: Instant) -> PipelineOutput {
        let mut log = PipelineLog::new();
        let mut rows = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            log.extend(outcome.events);
            if let Some(planet) = outcome.planet {
                rows.push(planet);
            }
        }
        let normalized = rows.len();

        let (planets, superseded) = resolve_duplicates(rows);
        log.extend(superseded);

        let summary = PipelineSummary {
            total_rows,
            normalized,
            rejected: log.rejected().count(),
            fields_demoted: log.demotions().count(),
            superseded: log.superseded().count(),
            derivations_insufficient: log.insufficient().count(),
            planets: planets.len(),
        };
        record_metrics(&log, &summary, started.elapsed().as_secs_f64());

        info!(
            total_rows = summary.total_rows,
            planets = summary.planets,
            rejected = summary.rejected,
            demoted = summary.fields_demoted,
            superseded = summary.superseded,
            "Pipeline run complete"
        );

        PipelineOutput {
            planets,
            log,
            summary,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

fn record_metrics(log: &PipelineLog, summary: &PipelineSummary, secs: f64) {
    metrics::normalize::records_processed(summary.normalized);
    metrics::normalize::records_rejected(summary.rejected);
    metrics::conflation::superseded(summary.superseded);
    for event in &log.events {
        match event {
            PipelineEvent::FieldDemoted { field, reason, .. } => {
                metrics::quality_gate::field_demoted(field, &reason.to_string())
            }
            PipelineEvent::DerivationInsufficient { metric, .. } => {
                metrics::enrich::insufficient(metric)
            }
            _ => {}
        }
    }
    metrics::pipeline::run_completed(summary.total_rows, secs);
}
