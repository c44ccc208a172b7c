// Observability: metrics recording and exposition

pub mod metrics;

// Re-export main functions for ease of use
pub use metrics::{init, render, MetricName};
