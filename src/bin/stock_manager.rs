//! Stock Manager
//!
//! Runs a command script against a stock store and then measures the
//! store's average add, search and remove times.

use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stock_avl_store::analysis::{AnalysisConfig, AnalysisReport, PerformanceAnalysis, SeriesReport};
use stock_avl_store::utils::format_nanos;
use stock_avl_store::{CommandInterpreter, StockStore, StoreError, StoreMetrics};

#[derive(Debug, Parser)]
#[command(name = "stock_manager", version, about = "Symbol-keyed stock store backed by a balanced tree")]
struct StockManagerArgs {
    /// Command script with one ADD/REMOVE/SEARCH/UPDATE/PRINT command per line
    input: Option<PathBuf>,

    /// Operations per phase of the performance analysis
    #[arg(long, default_value_t = 1_000_000)]
    operations: usize,

    /// Stocks per batch when sampling the timing series
    #[arg(long, default_value_t = 500)]
    batch_size: usize,

    /// Stocks loaded before the timing series starts
    #[arg(long, default_value_t = 10_000)]
    warmup: usize,

    /// Seed for generated quotes
    #[arg(long)]
    seed: Option<u64>,

    /// Do not run the performance analysis
    #[arg(long)]
    skip_analysis: bool,

    /// Also sample the per-batch timing series
    #[arg(long)]
    series: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    prometheus: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl StockManagerArgs {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            operations: self.operations,
            warmup: self.warmup,
            batch_size: self.batch_size,
            seed: self.seed,
            ..AnalysisConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = StockManagerArgs::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let prometheus = if args.prometheus {
        Some(metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    let metrics = Arc::new(StoreMetrics::new());
    let mut interpreter = CommandInterpreter::new(StockStore::new(), Arc::clone(&metrics));

    if let Some(path) = &args.input {
        info!("Processing command script {}", path.display());
        let file = File::open(path).map_err(StoreError::from)?;
        let report = interpreter.run_script(BufReader::new(file))?;
        for line in &report.output {
            println!("{}", line);
        }
        if report.summary.invalid > 0 {
            warn!("{} invalid lines in {}", report.summary.invalid, path.display());
        }
    } else if args.skip_analysis {
        warn!("No input file given and analysis skipped; nothing to do");
    }

    if !args.skip_analysis {
        let analysis = PerformanceAnalysis::new(args.analysis_config(), Arc::clone(&metrics));

        let report = analysis.run(interpreter.store_mut());
        print_analysis(&report, args.json)?;

        if args.series {
            let series = analysis.sample_series();
            print_series(&series, args.json)?;
        }
    }

    metrics.log_summary();

    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }

    Ok(())
}

fn print_analysis(report: &AnalysisReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for phase in [&report.add, &report.search, &report.remove] {
        println!("Average {} time: {} ns", phase.operation, phase.avg_nanos);
    }
    println!(
        "Peak tree height: {} ({} of {} found)",
        report.peak_height, report.found, report.search.operations
    );
    Ok(())
}

fn print_series(series: &SeriesReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    println!("batch,store_size,add_ns,search_ns,update_ns,remove_ns");
    for point in &series.points {
        println!(
            "{},{},{},{},{},{}",
            point.batch,
            point.store_size,
            point.add_ns,
            point.search_ns,
            point.update_ns,
            point.remove_ns
        );
    }

    for (name, stats) in [
        ("ADD", &series.add),
        ("SEARCH", &series.search),
        ("UPDATE", &series.update),
        ("REMOVE", &series.remove),
    ] {
        println!(
            "{} per batch of {}: mean={} p50={} p95={} p99={} max={}",
            name,
            series.batch_size,
            format_nanos(stats.mean.as_nanos() as u64),
            format_nanos(stats.p50.as_nanos() as u64),
            format_nanos(stats.p95.as_nanos() as u64),
            format_nanos(stats.p99.as_nanos() as u64),
            format_nanos(stats.max.as_nanos() as u64)
        );
    }
    Ok(())
}
