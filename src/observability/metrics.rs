//! Metrics for the catalog pipeline and query engine.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op. `init()` installs the Prometheus recorder
//! and keeps its handle so the exposition text can be rendered on demand.

use metrics::Unit;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeRecordsRejected,

    // Quality Gate metrics
    QualityGateFieldsDemoted,

    // Enrich metrics
    EnrichInsufficient,

    // Conflation metrics
    ConflationSuperseded,

    // Pipeline metrics
    PipelineRuns,
    PipelineDuration,
    PipelineBatchSize,

    // Catalog metrics
    CatalogGenerationsPublished,
    CatalogPlanets,

    // Store metrics
    StoreWritesSuccess,
    StoreWritesError,

    // Query metrics
    QueryRequests,
    QueryRejected,
    QueryDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRecordsProcessed => "exo_normalize_records_total",
            MetricName::NormalizeRecordsRejected => "exo_normalize_rejected_total",
            MetricName::QualityGateFieldsDemoted => "exo_quality_gate_fields_demoted_total",
            MetricName::EnrichInsufficient => "exo_enrich_insufficient_total",
            MetricName::ConflationSuperseded => "exo_conflation_superseded_total",
            MetricName::PipelineRuns => "exo_pipeline_runs_total",
            MetricName::PipelineDuration => "exo_pipeline_duration_seconds",
            MetricName::PipelineBatchSize => "exo_pipeline_batch_size",
            MetricName::CatalogGenerationsPublished => "exo_catalog_generations_published_total",
            MetricName::CatalogPlanets => "exo_catalog_planets",
            MetricName::StoreWritesSuccess => "exo_store_writes_success_total",
            MetricName::StoreWritesError => "exo_store_writes_error_total",
            MetricName::QueryRequests => "exo_query_requests_total",
            MetricName::QueryRejected => "exo_query_rejected_total",
            MetricName::QueryDuration => "exo_query_duration_seconds",
        }
    }

    /// All metric names, for listings
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeRecordsProcessed,
            NormalizeRecordsRejected,
            QualityGateFieldsDemoted,
            EnrichInsufficient,
            ConflationSuperseded,
            PipelineRuns,
            PipelineDuration,
            PipelineBatchSize,
            CatalogGenerationsPublished,
            CatalogPlanets,
            StoreWritesSuccess,
            StoreWritesError,
            QueryRequests,
            QueryRejected,
            QueryDuration,
        ]
        .into_iter()
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricName::PipelineDuration
            | MetricName::PipelineBatchSize
            | MetricName::QueryDuration => MetricKind::Histogram,
            MetricName::CatalogPlanets => MetricKind::Gauge,
            _ => MetricKind::Counter,
        }
    }

    /// (description, unit)
    pub fn metadata(&self) -> (&'static str, Option<Unit>) {
        match self {
            MetricName::NormalizeRecordsProcessed => ("Raw rows normalized", None),
            MetricName::NormalizeRecordsRejected => ("Raw rows rejected", None),
            MetricName::QualityGateFieldsDemoted => ("Fields demoted to unknown", None),
            MetricName::EnrichInsufficient => ("Derived metrics left unknown", None),
            MetricName::ConflationSuperseded => ("Duplicate rows superseded", None),
            MetricName::PipelineRuns => ("Pipeline runs", None),
            MetricName::PipelineDuration => ("Pipeline run duration", Some(Unit::Seconds)),
            MetricName::PipelineBatchSize => ("Raw rows per run", Some(Unit::Count)),
            MetricName::CatalogGenerationsPublished => ("Generations published", None),
            MetricName::CatalogPlanets => ("Planets in the published generation", Some(Unit::Count)),
            MetricName::StoreWritesSuccess => ("Successful record set writes", None),
            MetricName::StoreWritesError => ("Failed record set writes", None),
            MetricName::QueryRequests => ("Query requests by operation", None),
            MetricName::QueryRejected => ("Query requests rejected", None),
            MetricName::QueryDuration => ("Query duration", Some(Unit::Seconds)),
        }
    }

    fn describe(&self) {
        let name = self.as_str();
        let (description, unit) = self.metadata();
        match (self.kind(), unit) {
            (MetricKind::Counter, Some(unit)) => ::metrics::describe_counter!(name, unit, description),
            (MetricKind::Counter, None) => ::metrics::describe_counter!(name, description),
            (MetricKind::Gauge, Some(unit)) => ::metrics::describe_gauge!(name, unit, description),
            (MetricKind::Gauge, None) => ::metrics::describe_gauge!(name, description),
            (MetricKind::Histogram, Some(unit)) => ::metrics::describe_histogram!(name, unit, description),
            (MetricKind::Histogram, None) => ::metrics::describe_histogram!(name, description),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    MetricName::all_metrics().for_each(|m| m.describe());
    info!("Metrics system initialized");
    Ok(())
}

/// Render the current exposition text, if a recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Pipeline stage metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(count as u64);
    }

    pub fn records_rejected(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsRejected.as_str()).increment(count as u64);
    }
}

pub mod quality_gate {
    use super::MetricName;

    /// Record one demotion, labelled by field and reason
    pub fn field_demoted(field: &str, reason: &str) {
        ::metrics::counter!(MetricName::QualityGateFieldsDemoted.as_str(),
            "field" => field.to_string(),
            "reason" => reason.to_string()
        )
        .increment(1);
    }
}

pub mod enrich {
    use super::MetricName;

    pub fn insufficient(metric: &str) {
        ::metrics::counter!(MetricName::EnrichInsufficient.as_str(), "metric" => metric.to_string())
            .increment(1);
    }
}

pub mod conflation {
    use super::MetricName;

    pub fn superseded(count: usize) {
        ::metrics::counter!(MetricName::ConflationSuperseded.as_str()).increment(count as u64);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_completed(batch_size: usize, secs: f64) {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
        ::metrics::histogram!(MetricName::PipelineBatchSize.as_str()).record(batch_size as f64);
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(secs);
    }
}

pub mod catalog {
    use super::MetricName;

    pub fn generation_published(planets: usize) {
        ::metrics::counter!(MetricName::CatalogGenerationsPublished.as_str()).increment(1);
        ::metrics::gauge!(MetricName::CatalogPlanets.as_str()).set(planets as f64);
    }
}

pub mod store {
    use super::MetricName;

    pub fn write_success(backend: &str) {
        ::metrics::counter!(MetricName::StoreWritesSuccess.as_str(), "backend" => backend.to_string())
            .increment(1);
    }

    pub fn write_error(backend: &str) {
        ::metrics::counter!(MetricName::StoreWritesError.as_str(), "backend" => backend.to_string())
            .increment(1);
    }
}

pub mod query {
    use super::MetricName;

    pub fn request(operation: &str, secs: f64) {
        ::metrics::counter!(MetricName::QueryRequests.as_str(), "operation" => operation.to_string())
            .increment(1);
        ::metrics::histogram!(MetricName::QueryDuration.as_str(), "operation" => operation.to_string())
            .record(secs);
    }

    pub fn rejected(operation: &str) {
        ::metrics::counter!(MetricName::QueryRejected.as_str(), "operation" => operation.to_string())
            .increment(1);
    }
}
