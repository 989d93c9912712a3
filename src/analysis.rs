//! Timing harness for the stock store
//!
//! Two workloads are provided:
//!
//! - [`PerformanceAnalysis::run`] performs `operations` upserts, then the
//!   same number of searches, then removes, and reports the average cost of
//!   each phase.
//! - [`PerformanceAnalysis::sample_series`] grows a store batch by batch and
//!   times upsert, search, rename and remove for every batch, producing a
//!   series suitable for plotting.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::metrics::collectors::{LatencyCollector, LatencyStatistics};
use crate::metrics::StoreMetrics;
use crate::store::manager::StockStore;
use crate::store::types::{MarketCap, Price, UpsertOutcome, Volume};
use crate::utils::time::{LatencyTimer, PrecisionTimestamp};
use crate::utils::workload_symbol;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Operations per phase, and the store size reached by the series
    pub operations: usize,
    /// Prefix of the symbols added by [`PerformanceAnalysis::run`]
    pub symbol_prefix: String,
    /// Prefix of the symbols grown by the series
    pub series_prefix: String,
    /// Prefix series stocks are renamed to
    pub rename_prefix: String,
    /// Stocks loaded before the series starts measuring
    pub warmup: usize,
    pub batch_size: usize,
    /// Fixed seed for reproducible quotes
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            operations: 1_000_000,
            symbol_prefix: "SYM".to_string(),
            series_prefix: "Sym".to_string(),
            rename_prefix: "Aym".to_string(),
            warmup: 10_000,
            batch_size: 500,
            seed: None,
        }
    }
}

/// Timing of one phase of [`PerformanceAnalysis::run`]
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub operation: String,
    pub operations: usize,
    pub total_nanos: u64,
    pub avg_nanos: u64,
    pub ops_per_sec: f64,
}

impl PhaseResult {
    fn new(operation: &str, operations: usize, elapsed: Duration) -> Self {
        let total_nanos = elapsed.as_nanos() as u64;
        let avg_nanos = if operations > 0 {
            total_nanos / operations as u64
        } else {
            0
        };
        let ops_per_sec = if elapsed.as_secs_f64() > 0.0 {
            operations as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            operation: operation.to_string(),
            operations,
            total_nanos,
            avg_nanos,
            ops_per_sec,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub started_at: DateTime<Utc>,
    pub add: PhaseResult,
    pub search: PhaseResult,
    pub remove: PhaseResult,
    /// Tree height once every stock was added
    pub peak_height: usize,
    pub found: usize,
    pub remaining: usize,
}

/// Per-batch totals for the series workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub batch: usize,
    pub store_size: usize,
    pub add_ns: u64,
    pub search_ns: u64,
    pub update_ns: u64,
    pub remove_ns: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub started_at: DateTime<Utc>,
    pub batch_size: usize,
    pub points: Vec<SeriesPoint>,
    pub add: LatencyStatistics,
    pub search: LatencyStatistics,
    pub update: LatencyStatistics,
    pub remove: LatencyStatistics,
}

struct Quote {
    price: Price,
    volume: Volume,
    market_cap: MarketCap,
}

pub struct PerformanceAnalysis {
    config: AnalysisConfig,
    metrics: Arc<StoreMetrics>,
}

impl PerformanceAnalysis {
    pub fn new(config: AnalysisConfig, metrics: Arc<StoreMetrics>) -> Self {
        Self { config, metrics }
    }

    /// Add, search and remove `operations` generated symbols on `store`
    pub fn run(&self, store: &mut StockStore) -> AnalysisReport {
        let started_at = PrecisionTimestamp::now();
        let count = self.config.operations;
        info!("Starting performance analysis with {} operations", count);

        let symbols: Vec<String> = (0..count)
            .map(|i| workload_symbol(&self.config.symbol_prefix, i))
            .collect();
        let quotes = self.generate_quotes(count);

        let timer = LatencyTimer::start();
        for (symbol, quote) in symbols.iter().zip(&quotes) {
            match store.upsert_stock(symbol, quote.price, quote.volume, quote.market_cap) {
                UpsertOutcome::Added => self.metrics.increment_stocks_added(),
                UpsertOutcome::Updated => self.metrics.increment_stocks_updated(),
            }
        }
        let add = PhaseResult::new("ADD", count, timer.stop());
        let peak_height = store.height();
        self.metrics.observe_store(store);
        debug!("Add phase done: {} stocks, height {}", store.len(), peak_height);

        let timer = LatencyTimer::start();
        let found = symbols
            .iter()
            .filter(|symbol| store.find_stock(symbol).is_some())
            .count();
        let search = PhaseResult::new("SEARCH", count, timer.stop());
        debug!("Search phase done: {} of {} found", found, count);

        let timer = LatencyTimer::start();
        for symbol in &symbols {
            if store.remove_stock(symbol).is_some() {
                self.metrics.increment_stocks_removed();
            }
        }
        let remove = PhaseResult::new("REMOVE", count, timer.stop());
        self.metrics.observe_store(store);

        info!(
            "Performance analysis finished in {:?}: add={}ns search={}ns remove={}ns",
            started_at.elapsed(),
            add.avg_nanos,
            search.avg_nanos,
            remove.avg_nanos
        );

        AnalysisReport {
            started_at: started_at.to_utc(),
            add,
            search,
            remove,
            peak_height,
            found,
            remaining: store.len(),
        }
    }

    /// Grow a fresh store to `operations` stocks one batch at a time, timing
    /// every operation kind per batch
    pub fn sample_series(&self) -> SeriesReport {
        let started_at = PrecisionTimestamp::now();
        let batch_size = self.config.batch_size.max(1);
        let prefix = &self.config.series_prefix;
        let rename_prefix = &self.config.rename_prefix;
        let mut store = StockStore::new();

        for i in 0..self.config.warmup {
            store.upsert_stock(&workload_symbol(prefix, i), 1000.0, 1000, 1000);
        }
        info!(
            "Series warm-up loaded {} stocks (height {})",
            store.len(),
            store.height()
        );

        let mut add = LatencyCollector::new();
        let mut search = LatencyCollector::new();
        let mut update = LatencyCollector::new();
        let mut remove = LatencyCollector::new();
        let mut points = Vec::new();

        let mut start = self.config.warmup;
        while start + batch_size <= self.config.operations.max(self.config.warmup) {
            let batch = start..start + batch_size;
            let symbols: Vec<String> = batch.clone().map(|i| workload_symbol(prefix, i)).collect();
            let renamed: Vec<String> = batch.map(|i| workload_symbol(rename_prefix, i)).collect();

            let timer = LatencyTimer::start();
            for symbol in &symbols {
                store.upsert_stock(symbol, 1000.0, 1000, 1000);
            }
            let add_elapsed = timer.stop();

            let timer = LatencyTimer::start();
            for symbol in &symbols {
                std::hint::black_box(store.find_stock(symbol));
            }
            let search_elapsed = timer.stop();

            let timer = LatencyTimer::start();
            for (symbol, target) in symbols.iter().zip(&renamed) {
                if let Err(e) = store.rename_and_update(symbol, target, 1000.0, 1000, 1000) {
                    debug!("Series rename of {} skipped: {}", symbol, e);
                }
            }
            let update_elapsed = timer.stop();

            let timer = LatencyTimer::start();
            for target in &renamed {
                store.remove_stock(target);
            }
            let remove_elapsed = timer.stop();

            for symbol in &symbols {
                store.upsert_stock(symbol, 1000.0, 1000, 1000);
            }

            add.record(add_elapsed);
            search.record(search_elapsed);
            update.record(update_elapsed);
            remove.record(remove_elapsed);
            points.push(SeriesPoint {
                batch: start / batch_size,
                store_size: store.len(),
                add_ns: add_elapsed.as_nanos() as u64,
                search_ns: search_elapsed.as_nanos() as u64,
                update_ns: update_elapsed.as_nanos() as u64,
                remove_ns: remove_elapsed.as_nanos() as u64,
            });

            start += batch_size;
        }

        self.metrics.observe_store(&store);
        info!(
            "Series finished in {:?}: {} batches, final size {}",
            started_at.elapsed(),
            points.len(),
            store.len()
        );

        SeriesReport {
            started_at: started_at.to_utc(),
            batch_size,
            points,
            add: add.summarize(),
            search: search.summarize(),
            update: update.summarize(),
            remove: remove.summarize(),
        }
    }

    fn generate_quotes(&self, count: usize) -> Vec<Quote> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (0..count)
            .map(|_| Quote {
                price: rng.gen::<f64>() * 100.0,
                volume: rng.gen_range(0..1_000_000),
                market_cap: rng.gen_range(0..1_000_000_000),
            })
            .collect()
    }
}
