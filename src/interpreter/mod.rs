//! Line-oriented command interpreter
//!
//! Each input line is one of `ADD`, `REMOVE`, `SEARCH`, `UPDATE` or `PRINT`.
//! Lines are parsed into [`Command`]s and dispatched to a [`StockStore`];
//! the store itself never sees malformed input.

use serde::Serialize;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::StoreMetrics;
use crate::store::error::{StoreError, StoreResult};
use crate::store::manager::StockStore;
use crate::store::types::UpsertOutcome;

pub mod command;

pub use command::Command;

/// Counters for one script run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptSummary {
    pub processed: usize,
    pub invalid: usize,
    pub skipped: usize,
}

/// Output and counters of a script run
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    pub output: Vec<String>,
    pub summary: ScriptSummary,
}

pub struct CommandInterpreter {
    store: StockStore,
    metrics: Arc<StoreMetrics>,
}

impl CommandInterpreter {
    pub fn new(store: StockStore, metrics: Arc<StoreMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Parse and run one line, returning the lines to show the user.
    ///
    /// Blank lines produce no output.
    pub fn process_line(&mut self, line: &str) -> Vec<String> {
        match Command::parse(line) {
            Ok(command) => self.execute(command),
            Err(StoreError::EmptyCommand) => Vec::new(),
            Err(StoreError::UnknownCommand(name)) => {
                warn!("Unknown command: {}", name);
                self.metrics.increment_commands_rejected();
                vec![format!("Unknown command:  {}", name)]
            }
            Err(e) => {
                warn!("Rejected line {:?}: {}", line, e);
                self.metrics.increment_commands_rejected();
                vec![format!("Invalid command: {}", line)]
            }
        }
    }

    /// Run a parsed command against the store
    pub fn execute(&mut self, command: Command) -> Vec<String> {
        debug!("Executing {} command", command.name());

        let output = match command {
            Command::Add {
                symbol,
                price,
                volume,
                market_cap,
            } => {
                let store = &mut self.store;
                let outcome = self
                    .metrics
                    .time_upsert(|| store.upsert_stock(&symbol, price, volume, market_cap));
                match outcome {
                    UpsertOutcome::Added => {
                        self.metrics.increment_stocks_added();
                        vec![format!("Stock added:     {}", symbol)]
                    }
                    UpsertOutcome::Updated => {
                        self.metrics.increment_stocks_updated();
                        vec![format!("Stock updated:   {}", symbol)]
                    }
                }
            }
            Command::Remove { symbol } => {
                if !self.store.contains(&symbol) {
                    self.metrics.increment_lookup_misses();
                    return vec![StoreError::StockNotFound(symbol).to_string()];
                }
                let store = &mut self.store;
                self.metrics.time_remove(|| store.remove_stock(&symbol));
                self.metrics.increment_stocks_removed();
                vec![format!("Stock removed:   {}", symbol)]
            }
            Command::Search { symbol } => {
                let store = &self.store;
                match self.metrics.time_search(|| store.find_stock(&symbol)) {
                    Some(stock) => vec![format!("Stock found:     {}", stock)],
                    None => {
                        self.metrics.increment_lookup_misses();
                        vec![StoreError::StockNotFound(symbol).to_string()]
                    }
                }
            }
            Command::Update {
                symbol,
                new_symbol,
                price,
                volume,
                market_cap,
            } => {
                let store = &mut self.store;
                let result = self.metrics.time_update(|| {
                    store
                        .rename_and_update(&symbol, &new_symbol, price, volume, market_cap)
                        .map(|stock| stock.cloned())
                });
                match result {
                    Ok(Some(stock)) => {
                        if symbol != new_symbol {
                            self.metrics.increment_stocks_renamed();
                        } else {
                            self.metrics.increment_stocks_updated();
                        }
                        vec![format!("Stock updated:   {}", stock)]
                    }
                    Ok(None) => {
                        self.metrics.increment_lookup_misses();
                        vec![StoreError::StockNotFound(symbol).to_string()]
                    }
                    Err(e) => {
                        warn!("Update of {} rejected: {}", symbol, e);
                        vec![format!("Update rejected: {}", e)]
                    }
                }
            }
            Command::Print => self.store.list_ordered(),
        };

        self.metrics.observe_store(&self.store);
        output
    }

    /// Process every line of `reader`, continuing past invalid lines
    pub fn run_script<R: BufRead>(&mut self, reader: R) -> StoreResult<ScriptReport> {
        let mut report = ScriptReport::default();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                report.summary.skipped += 1;
                continue;
            }

            let rejected_before = self.metrics.get_commands_rejected();
            report.output.extend(self.process_line(&line));
            report.summary.processed += 1;
            if self.metrics.get_commands_rejected() > rejected_before {
                report.summary.invalid += 1;
            }
        }

        info!(
            "Script finished: {} lines processed, {} invalid, {} blank",
            report.summary.processed, report.summary.invalid, report.summary.skipped
        );
        Ok(report)
    }

    pub fn store(&self) -> &StockStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StockStore {
        &mut self.store
    }

    pub fn into_store(self) -> StockStore {
        self.store
    }

    pub fn metrics(&self) -> &Arc<StoreMetrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn interpreter() -> CommandInterpreter {
        CommandInterpreter::new(StockStore::new(), Arc::new(StoreMetrics::new()))
    }

    #[test]
    fn test_add_and_update_messages() {
        let mut interp = interpreter();

        assert_eq!(
            interp.process_line("ADD AAPL 150.0 1000000 2500000000"),
            vec!["Stock added:     AAPL"]
        );
        assert_eq!(
            interp.process_line("ADD AAPL 151.0 1000000 2500000000"),
            vec!["Stock updated:   AAPL"]
        );
        assert_eq!(interp.metrics().get_stocks_added(), 1);
        assert_eq!(interp.metrics().get_stocks_updated(), 1);
        assert_eq!(interp.metrics().get_stock_count(), 1);
    }

    #[test]
    fn test_search_and_remove_messages() {
        let mut interp = interpreter();
        interp.process_line("ADD MSFT 300.5 10 20");

        assert_eq!(
            interp.process_line("SEARCH MSFT"),
            vec!["Stock found:     Stock [symbol=MSFT, price=300.50, volume=10, market_cap=20]"]
        );
        assert_eq!(interp.process_line("REMOVE MSFT"), vec!["Stock removed:   MSFT"]);
        assert_eq!(interp.process_line("REMOVE MSFT"), vec!["Stock not found: MSFT"]);
        assert_eq!(interp.process_line("SEARCH MSFT"), vec!["Stock not found: MSFT"]);
        assert_eq!(interp.metrics().get_lookup_misses(), 2);
    }

    #[test]
    fn test_update_messages() {
        let mut interp = interpreter();
        interp.process_line("ADD A 1 1 1");
        interp.process_line("ADD C 3 3 3");

        assert_eq!(
            interp.process_line("UPDATE A B 2 2 2"),
            vec!["Stock updated:   Stock [symbol=B, price=2.00, volume=2, market_cap=2]"]
        );
        assert_eq!(interp.process_line("UPDATE A B 2 2 2"), vec!["Stock not found: A"]);
        assert_eq!(
            interp.process_line("UPDATE B C 9 9 9"),
            vec!["Update rejected: Symbol already exists: C"]
        );
        assert!(interp.store().find_stock("A").is_none());
        assert_eq!(interp.metrics().get_stocks_renamed(), 1);
    }

    #[test]
    fn test_invalid_and_unknown_lines() {
        let mut interp = interpreter();

        assert_eq!(
            interp.process_line("ADD AAPL notanumber 1 1"),
            vec!["Invalid command: ADD AAPL notanumber 1 1"]
        );
        assert_eq!(interp.process_line("REMOVE"), vec!["Invalid command: REMOVE"]);
        assert_eq!(interp.process_line("FLY AAPL"), vec!["Unknown command:  FLY"]);
        assert!(interp.process_line("").is_empty());
        assert_eq!(interp.metrics().get_commands_rejected(), 3);
        assert!(interp.store().is_empty());
    }

    #[test]
    fn test_print_lists_in_order() {
        let mut interp = interpreter();
        interp.process_line("ADD C 1 1 1");
        interp.process_line("ADD B 1 1 1");
        interp.process_line("ADD A 1 1 1");

        let listing = interp.process_line("PRINT");
        assert_eq!(listing.len(), 4);
        assert_eq!(listing[0], "Stocks:");
        assert!(listing[1].ends_with("symbol=A, price=1.00, volume=1, market_cap=1]"));
        assert!(listing[2].starts_with("2 Stock [symbol=B"));
        assert!(listing[3].starts_with("    1 Stock [symbol=C"));
    }

    #[test]
    fn test_run_script() {
        let script = "ADD AAPL 150.0 1000000 2500000000\n\
                      ADD GOOGL 2800.0 500000 1500000000\n\
                      \n\
                      SEARCH AAPL\n\
                      ADD BAD\n\
                      REMOVE AAPL\n\
                      SEARCH AAPL\n";
        let mut interp = interpreter();

        let report = interp.run_script(Cursor::new(script)).unwrap();
        assert_eq!(
            report.summary,
            ScriptSummary {
                processed: 6,
                invalid: 1,
                skipped: 1,
            }
        );
        assert_eq!(report.output.len(), 6);
        assert_eq!(report.output[4], "Stock removed:   AAPL");
        assert_eq!(report.output[5], "Stock not found: AAPL");

        let store = interp.into_store();
        assert_eq!(store.len(), 1);
        assert!(store.contains("GOOGL"));
    }
}
