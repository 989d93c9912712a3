use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

use crate::store::StockStore;

pub mod collectors;

/// Metrics collector for stock store operations
#[derive(Debug)]
pub struct StoreMetrics {
    // Latency tracking
    upsert_latency: LatencyTracker,
    search_latency: LatencyTracker,
    update_latency: LatencyTracker,
    remove_latency: LatencyTracker,

    // Throughput counters
    stocks_added: AtomicU64,
    stocks_updated: AtomicU64,
    stocks_renamed: AtomicU64,
    stocks_removed: AtomicU64,
    lookup_misses: AtomicU64,
    commands_rejected: AtomicU64,

    // Store state
    stock_count: AtomicU64,
    tree_height: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        // Register metric descriptions
        describe_counter!("stock_store_operations_total", "Total number of store operations");
        describe_counter!(
            "stock_store_lookup_misses_total",
            "Operations that referenced an absent symbol"
        );
        describe_counter!(
            "stock_store_commands_rejected_total",
            "Command lines that failed to parse"
        );
        describe_histogram!(
            "stock_store_operation_duration_seconds",
            "Duration of stock store operations"
        );
        describe_gauge!("stock_store_stocks_current", "Current number of stored stocks");
        describe_gauge!("stock_store_tree_height", "Height of the balanced search tree");

        Self {
            upsert_latency: LatencyTracker::new("upsert"),
            search_latency: LatencyTracker::new("search"),
            update_latency: LatencyTracker::new("update"),
            remove_latency: LatencyTracker::new("remove"),
            stocks_added: AtomicU64::new(0),
            stocks_updated: AtomicU64::new(0),
            stocks_renamed: AtomicU64::new(0),
            stocks_removed: AtomicU64::new(0),
            lookup_misses: AtomicU64::new(0),
            commands_rejected: AtomicU64::new(0),
            stock_count: AtomicU64::new(0),
            tree_height: AtomicU64::new(0),
        }
    }

    // Latency measurement methods
    pub fn time_upsert<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.upsert_latency.time(f)
    }

    pub fn time_search<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.search_latency.time(f)
    }

    pub fn time_update<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.update_latency.time(f)
    }

    pub fn time_remove<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.remove_latency.time(f)
    }

    // Counter methods
    pub fn increment_stocks_added(&self) {
        self.stocks_added.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_operations_total", "operation" => "add").increment(1);
    }

    pub fn increment_stocks_updated(&self) {
        self.stocks_updated.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_operations_total", "operation" => "update").increment(1);
    }

    pub fn increment_stocks_renamed(&self) {
        self.stocks_renamed.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_operations_total", "operation" => "rename").increment(1);
    }

    pub fn increment_stocks_removed(&self) {
        self.stocks_removed.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_operations_total", "operation" => "remove").increment(1);
    }

    pub fn increment_lookup_misses(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_lookup_misses_total").increment(1);
    }

    pub fn increment_commands_rejected(&self) {
        self.commands_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("stock_store_commands_rejected_total").increment(1);
    }

    // Gauge methods
    pub fn set_stock_count(&self, count: u64) {
        self.stock_count.store(count, Ordering::Relaxed);
        gauge!("stock_store_stocks_current").set(count as f64);
    }

    pub fn set_tree_height(&self, height: u64) {
        self.tree_height.store(height, Ordering::Relaxed);
        gauge!("stock_store_tree_height").set(height as f64);
    }

    /// Refresh the gauges from the current store state
    pub fn observe_store(&self, store: &StockStore) {
        self.set_stock_count(store.len() as u64);
        self.set_tree_height(store.height() as u64);
    }

    // Getters for current values
    pub fn get_stocks_added(&self) -> u64 {
        self.stocks_added.load(Ordering::Relaxed)
    }

    pub fn get_stocks_updated(&self) -> u64 {
        self.stocks_updated.load(Ordering::Relaxed)
    }

    pub fn get_stocks_renamed(&self) -> u64 {
        self.stocks_renamed.load(Ordering::Relaxed)
    }

    pub fn get_stocks_removed(&self) -> u64 {
        self.stocks_removed.load(Ordering::Relaxed)
    }

    pub fn get_lookup_misses(&self) -> u64 {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn get_commands_rejected(&self) -> u64 {
        self.commands_rejected.load(Ordering::Relaxed)
    }

    pub fn get_stock_count(&self) -> u64 {
        self.stock_count.load(Ordering::Relaxed)
    }

    pub fn get_tree_height(&self) -> u64 {
        self.tree_height.load(Ordering::Relaxed)
    }

    pub fn get_latency_stats(&self) -> LatencyStats {
        LatencyStats {
            upsert: self.upsert_latency.get_stats(),
            search: self.search_latency.get_stats(),
            update: self.update_latency.get_stats(),
            remove: self.remove_latency.get_stats(),
        }
    }

    /// Log a one-line summary of counters and average latencies
    pub fn log_summary(&self) {
        let stats = self.get_latency_stats();

        info!(
            "Store Metrics - Stocks: +{} ~{} >{} -{} | Misses: {} | Rejected: {} | Latency (μs): upsert={:.2} search={:.2} update={:.2} remove={:.2}",
            self.get_stocks_added(),
            self.get_stocks_updated(),
            self.get_stocks_renamed(),
            self.get_stocks_removed(),
            self.get_lookup_misses(),
            self.get_commands_rejected(),
            stats.upsert.avg_micros(),
            stats.search.avg_micros(),
            stats.update.avg_micros(),
            stats.remove.avg_micros()
        );
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency tracker for individual operations
#[derive(Debug)]
struct LatencyTracker {
    operation: &'static str,
    samples: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl LatencyTracker {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            samples: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let duration = start.elapsed();

        self.record_latency(duration);
        result
    }

    fn record_latency(&self, duration: Duration) {
        let nanos = duration.as_nanos() as u64;

        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);

        histogram!("stock_store_operation_duration_seconds", "operation" => self.operation)
            .record(duration.as_secs_f64());
    }

    fn get_stats(&self) -> OperationLatencyStats {
        let samples = self.samples.load(Ordering::Relaxed);
        let total = self.total_nanos.load(Ordering::Relaxed);
        let min = self.min_nanos.load(Ordering::Relaxed);
        let max = self.max_nanos.load(Ordering::Relaxed);

        let avg = if samples > 0 { total / samples } else { 0 };

        OperationLatencyStats {
            operation: self.operation.to_string(),
            samples,
            avg_nanos: avg,
            min_nanos: if min == u64::MAX { 0 } else { min },
            max_nanos: max,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub upsert: OperationLatencyStats,
    pub search: OperationLatencyStats,
    pub update: OperationLatencyStats,
    pub remove: OperationLatencyStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationLatencyStats {
    pub operation: String,
    pub samples: u64,
    pub avg_nanos: u64,
    pub min_nanos: u64,
    pub max_nanos: u64,
}

impl OperationLatencyStats {
    pub fn avg_micros(&self) -> f64 {
        self.avg_nanos as f64 / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = StoreMetrics::new();

        metrics.increment_stocks_added();
        metrics.increment_stocks_added();
        metrics.increment_stocks_updated();
        metrics.increment_stocks_renamed();
        metrics.increment_stocks_removed();
        metrics.increment_lookup_misses();
        metrics.increment_commands_rejected();

        assert_eq!(metrics.get_stocks_added(), 2);
        assert_eq!(metrics.get_stocks_updated(), 1);
        assert_eq!(metrics.get_stocks_renamed(), 1);
        assert_eq!(metrics.get_stocks_removed(), 1);
        assert_eq!(metrics.get_lookup_misses(), 1);
        assert_eq!(metrics.get_commands_rejected(), 1);
    }

    #[test]
    fn test_latency_tracking() {
        let metrics = StoreMetrics::new();

        let value = metrics.time_search(|| 42);
        assert_eq!(value, 42);
        metrics.time_search(|| std::thread::sleep(Duration::from_millis(1)));

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.search.samples, 2);
        assert!(stats.search.max_nanos >= 1_000_000);
        assert!(stats.search.min_nanos <= stats.search.max_nanos);
        assert_eq!(stats.upsert.samples, 0);
        assert_eq!(stats.upsert.min_nanos, 0);
    }

    #[test]
    fn test_observe_store() {
        let metrics = StoreMetrics::new();
        let mut store = StockStore::new();
        for symbol in ["A", "B", "C"] {
            store.upsert_stock(symbol, 1.0, 1, 1);
        }

        metrics.observe_store(&store);
        assert_eq!(metrics.get_stock_count(), 3);
        assert_eq!(metrics.get_tree_height(), 2);
    }
}
