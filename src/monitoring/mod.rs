//! Monitoring Module
//!
//! Latency and call-count statistics for the inference engine.

mod metrics;

pub use metrics::{MetricsSummary, PerformanceMetrics};
