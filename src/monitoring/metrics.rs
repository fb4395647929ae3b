//! Inference metrics
//!
//! Latency and call-count tracking for the classifier. Counters are
//! lock-free atomics; the rolling latency window sits under one lock.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Snapshot of the collected metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_calls: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub uptime_secs: f64,
}

/// Performance metrics collector
pub struct PerformanceMetrics {
    window_size: usize,
    latencies: RwLock<VecDeque<f64>>,
    total_calls: AtomicU64,
    total_errors: AtomicU64,
    start_time: Instant,
}

impl PerformanceMetrics {
    /// Create a collector keeping the last `window_size` latencies
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            latencies: RwLock::new(VecDeque::with_capacity(window_size.max(1))),
            total_calls: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful call and its latency
    pub fn record_latency(&self, latency_ms: f64) {
        {
            let mut latencies = self.latencies.write();
            latencies.push_back(latency_ms);
            if latencies.len() > self.window_size {
                latencies.pop_front();
            }
        }
        self.total_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed call
    pub fn record_error(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    pub fn error_rate(&self) -> f64 {
        let calls = self.total_calls();
        if calls > 0 {
            self.total_errors() as f64 / calls as f64
        } else {
            0.0
        }
    }

    pub fn avg_latency(&self) -> f64 {
        let latencies = self.latencies.read();
        if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        }
    }

    /// Percentile latency over the rolling window (quickselect, no full sort)
    pub fn percentile_latency(&self, percentile: f64) -> f64 {
        let mut data: Vec<f64> = self.latencies.read().iter().copied().collect();
        if data.is_empty() {
            return 0.0;
        }
        let idx = ((percentile / 100.0) * (data.len() - 1) as f64) as usize;
        let idx = idx.min(data.len() - 1);
        data.select_nth_unstable_by(idx, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        data[idx]
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_calls: self.total_calls(),
            total_errors: self.total_errors(),
            error_rate: self.error_rate(),
            avg_latency_ms: self.avg_latency(),
            p50_latency_ms: self.percentile_latency(50.0),
            p95_latency_ms: self.percentile_latency(95.0),
            p99_latency_ms: self.percentile_latency(99.0),
            uptime_secs: self.uptime_secs(),
        }
    }
}
