use super::entities::{DisplayRow, RowKey};
use crate::domain::market_data::{Price, QuoteRecord};
use std::collections::HashSet;

/// Flattens quote records into display rows
pub struct RowProjection;

impl RowProjection {
    /// A missing (or NaN) price on either side becomes 0.
    pub fn project(record: &QuoteRecord) -> DisplayRow {
        DisplayRow {
            stock: record.stock.value().to_string(),
            top_ask_price: price_or_zero(record.ask_price()),
            top_bid_price: price_or_zero(record.bid_price()),
            timestamp: record.timestamp,
        }
    }

    /// One row per record, in input order
    pub fn project_all(records: &[QuoteRecord]) -> Vec<DisplayRow> {
        records.iter().map(Self::project).collect()
    }
}

fn price_or_zero(price: Option<Price>) -> f64 {
    price.map(|p| p.value()).filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Remembers which `(stock, timestamp)` pairs have gone out already
#[derive(Debug, Default)]
pub struct SubmittedRows {
    seen: HashSet<RowKey>,
}

impl SubmittedRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only rows never committed before, also collapsing repeats
    /// inside `rows`. Survivors keep their relative order.
    pub fn fresh(&self, rows: &[DisplayRow]) -> Vec<DisplayRow> {
        let mut batch = HashSet::new();
        rows.iter()
            .filter(|row| {
                let key = row.key();
                !self.seen.contains(&key) && batch.insert(key)
            })
            .cloned()
            .collect()
    }

    /// Mark rows as delivered to the table
    pub fn commit(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        self.seen.extend(keys);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
