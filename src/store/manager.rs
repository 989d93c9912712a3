use tracing::debug;

use crate::store::error::{StoreError, StoreResult};
use crate::store::tree::AvlTree;
use crate::store::types::{MarketCap, Price, Stock, UpsertOutcome, Volume};

/// Stock records keyed by symbol, kept in an [`AvlTree`]
#[derive(Debug, Default)]
pub struct StockStore {
    tree: AvlTree<Stock>,
}

impl StockStore {
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Add a stock, or overwrite the market fields of an existing one
    pub fn upsert_stock(
        &mut self,
        symbol: &str,
        price: Price,
        volume: Volume,
        market_cap: MarketCap,
    ) -> UpsertOutcome {
        if let Some(existing) = self.tree.search_mut(symbol) {
            existing.apply_quote(price, volume, market_cap);
            debug!("Updated stock {}", symbol);
            return UpsertOutcome::Updated;
        }

        self.tree
            .insert(Stock::new(symbol, price, volume, market_cap));
        debug!("Added stock {} (height {})", symbol, self.tree.height());
        UpsertOutcome::Added
    }

    /// Remove a stock. Absent symbols are ignored.
    pub fn remove_stock(&mut self, symbol: &str) -> Option<Stock> {
        let removed = self.tree.delete(symbol);
        if removed.is_some() {
            debug!("Removed stock {}", symbol);
        }
        removed
    }

    pub fn find_stock(&self, symbol: &str) -> Option<&Stock> {
        self.tree.search(symbol)
    }

    /// Update a stock's market fields and optionally move it to `new_symbol`.
    ///
    /// Returns `Ok(None)` when `symbol` is absent. A rename onto a symbol that
    /// is already stored is rejected before anything is modified.
    pub fn rename_and_update(
        &mut self,
        symbol: &str,
        new_symbol: &str,
        price: Price,
        volume: Volume,
        market_cap: MarketCap,
    ) -> StoreResult<Option<&Stock>> {
        if !self.tree.contains(symbol) {
            return Ok(None);
        }

        let renamed = symbol != new_symbol;
        if renamed && self.tree.contains(new_symbol) {
            return Err(StoreError::DuplicateSymbol(new_symbol.to_string()));
        }

        if let Some(stock) = self.tree.search_mut(symbol) {
            stock.apply_quote(price, volume, market_cap);
        }

        if renamed {
            // The key decides the node's position, so a rename is a delete
            // followed by a fresh insert under the new key.
            if let Some(mut stock) = self.tree.delete(symbol) {
                stock.symbol = new_symbol.to_string();
                self.tree.insert(stock);
            }
            debug!("Renamed stock {} -> {}", symbol, new_symbol);
        } else {
            debug!("Updated stock {}", symbol);
        }

        Ok(self.tree.search(new_symbol))
    }

    /// Diagnostic listing: one line per stock in ascending order, indented
    /// by depth and prefixed with the node's subtree height
    pub fn list_ordered(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.tree.len() + 1);
        lines.push("Stocks:".to_string());
        lines.extend(self.tree.traverse().map(|entry| {
            format!(
                "{}{} {}",
                " ".repeat(entry.depth * 4),
                entry.height,
                entry.record
            )
        }));
        lines
    }

    /// Stocks in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = &Stock> {
        self.tree.iter()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.tree.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Height of the underlying tree
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Balance factor at the root of the underlying tree
    pub fn root_balance(&self) -> isize {
        self.tree.root_balance()
    }

    /// Read access to the underlying tree, for inspection
    pub fn tree(&self) -> &AvlTree<Stock> {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = StockStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.find_stock("AAPL").is_none());
        assert_eq!(store.list_ordered(), vec!["Stocks:".to_string()]);
    }

    #[test]
    fn test_upsert_adds_then_updates() {
        let mut store = StockStore::new();

        let outcome = store.upsert_stock("AAPL", 150.0, 1_000_000, 2_500_000_000);
        assert_eq!(outcome, UpsertOutcome::Added);

        let outcome = store.upsert_stock("AAPL", 155.5, 900_000, 2_600_000_000);
        assert_eq!(outcome, UpsertOutcome::Updated);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.find_stock("AAPL"),
            Some(&Stock::new("AAPL", 155.5, 900_000, 2_600_000_000))
        );
    }

    #[test]
    fn test_remove_stock() {
        let mut store = StockStore::new();
        store.upsert_stock("AAPL", 150.0, 1_000_000, 2_500_000_000);
        store.upsert_stock("GOOGL", 2800.0, 500_000, 1_500_000_000);

        let removed = store.remove_stock("AAPL");
        assert_eq!(removed.map(|s| s.symbol), Some("AAPL".to_string()));
        assert!(store.find_stock("AAPL").is_none());
        assert!(store.find_stock("GOOGL").is_some());

        // Absent symbol is a no-op
        assert!(store.remove_stock("AAPL").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rename_and_update() {
        let mut store = StockStore::new();
        store.upsert_stock("A", 1.0, 1, 1);

        let updated = store.rename_and_update("A", "B", 2.0, 2, 2).unwrap();
        assert_eq!(updated, Some(&Stock::new("B", 2.0, 2, 2)));

        assert!(store.find_stock("A").is_none());
        assert_eq!(store.find_stock("B"), Some(&Stock::new("B", 2.0, 2, 2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_without_rename() {
        let mut store = StockStore::new();
        store.upsert_stock("IBM", 120.0, 10, 100);
        store.upsert_stock("AMD", 90.0, 20, 200);

        let updated = store.rename_and_update("IBM", "IBM", 125.0, 11, 101).unwrap();
        assert_eq!(updated, Some(&Stock::new("IBM", 125.0, 11, 101)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rename_absent_symbol_is_noop() {
        let mut store = StockStore::new();
        store.upsert_stock("NVDA", 400.0, 5, 50);

        let updated = store.rename_and_update("AMZN", "AMZ", 1.0, 1, 1).unwrap();
        assert!(updated.is_none());
        assert!(store.find_stock("AMZ").is_none());
        assert_eq!(store.find_stock("NVDA"), Some(&Stock::new("NVDA", 400.0, 5, 50)));
    }

    #[test]
    fn test_rename_onto_existing_symbol_is_rejected() {
        let mut store = StockStore::new();
        store.upsert_stock("X", 1.0, 1, 1);
        store.upsert_stock("Y", 2.0, 2, 2);

        let result = store.rename_and_update("X", "Y", 9.0, 9, 9);
        assert_eq!(result, Err(StoreError::DuplicateSymbol("Y".to_string())));

        // Nothing changed
        assert_eq!(store.find_stock("X"), Some(&Stock::new("X", 1.0, 1, 1)));
        assert_eq!(store.find_stock("Y"), Some(&Stock::new("Y", 2.0, 2, 2)));
    }

    #[test]
    fn test_list_ordered_indents_by_depth() {
        let mut store = StockStore::new();
        for symbol in ["B", "A", "C"] {
            store.upsert_stock(symbol, 1.0, 2, 3);
        }

        assert_eq!(
            store.list_ordered(),
            vec![
                "Stocks:".to_string(),
                "    1 Stock [symbol=A, price=1.00, volume=2, market_cap=3]".to_string(),
                "2 Stock [symbol=B, price=1.00, volume=2, market_cap=3]".to_string(),
                "    1 Stock [symbol=C, price=1.00, volume=2, market_cap=3]".to_string(),
            ]
        );
    }
}
