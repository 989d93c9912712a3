use serde::Serialize;
use std::time::Duration;

/// Collects latency samples and aggregates them into percentiles
#[derive(Debug, Default)]
pub struct LatencyCollector {
    samples: Vec<Duration>,
}

impl LatencyCollector {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Add a latency sample
    pub fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    /// Aggregate the samples collected so far
    pub fn summarize(&self) -> LatencyStatistics {
        if self.samples.is_empty() {
            return LatencyStatistics::default();
        }

        let mut sorted_samples = self.samples.clone();
        sorted_samples.sort();

        let len = sorted_samples.len();
        let min = sorted_samples[0];
        let max = sorted_samples[len - 1];
        let p50 = sorted_samples[len / 2];
        let p95 = sorted_samples[(len as f64 * 0.95) as usize];
        let p99 = sorted_samples[(len as f64 * 0.99) as usize];
        let p999 = sorted_samples[(len as f64 * 0.999) as usize];

        let total: Duration = sorted_samples.iter().sum();
        let mean = Duration::from_nanos((total.as_nanos() / len as u128) as u64);

        LatencyStatistics {
            count: len as u64,
            min,
            max,
            mean,
            p50,
            p95,
            p99,
            p999,
        }
    }
}

/// Aggregated latency statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencyStatistics {
    pub count: u64,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub p999: Duration,
}
