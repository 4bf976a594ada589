//! Headless visualization engine.
//!
//! Tables are shared append-only row stores and the surface evaluates the
//! configured pivots and aggregates itself, so the whole pipeline can run
//! without a browser.

use crate::domain::{
    chart::{
        Aggregate, CellValue, ColumnType, DisplayRow, DisplayTable, EngineProvider, RenderSurface,
        Schema, TableWorker, ViewConfig,
    },
    errors::{GraphError, GraphResult},
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

/// Provider whose availability is fixed at construction
#[derive(Debug, Clone, Copy)]
pub struct MemoryEngine {
    available: bool,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self { available: true }
    }

    /// Provider that fails the capability check
    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineProvider for MemoryEngine {
    type Worker = MemoryWorker;

    fn worker(&self) -> Option<MemoryWorker> {
        self.available.then_some(MemoryWorker)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryWorker;

impl TableWorker for MemoryWorker {
    type Table = MemoryTable;

    fn table(&self, schema: &Schema) -> GraphResult<MemoryTable> {
        Ok(MemoryTable::new(schema.clone()))
    }
}

#[derive(Debug, Default)]
struct TableStore {
    rows: Vec<DisplayRow>,
    batches: Vec<usize>,
}

/// Handle to a shared row store; clones see the same rows
#[derive(Debug, Clone)]
pub struct MemoryTable {
    schema: Rc<Schema>,
    store: Rc<RefCell<TableStore>>,
}

impl MemoryTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Rc::new(schema),
            store: Rc::new(RefCell::new(TableStore::default())),
        }
    }

    pub fn rows(&self) -> Vec<DisplayRow> {
        self.store.borrow().rows.clone()
    }

    pub fn row_count(&self) -> usize {
        self.store.borrow().rows.len()
    }

    /// Size of every update received, oldest first
    pub fn update_batches(&self) -> Vec<usize> {
        self.store.borrow().batches.clone()
    }

    pub fn same_table(&self, other: &MemoryTable) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    fn accepts_display_rows(&self) -> bool {
        Schema::display()
            .columns()
            .iter()
            .all(|(name, ty)| self.schema.column_type(name) == Some(*ty))
    }
}

impl DisplayTable for MemoryTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn update(&self, rows: Vec<DisplayRow>) -> GraphResult<()> {
        if !self.accepts_display_rows() {
            return Err(GraphError::Engine("rows do not match the table schema".to_string()));
        }
        let mut store = self.store.borrow_mut();
        store.batches.push(rows.len());
        store.rows.extend(rows);
        Ok(())
    }
}

/// Surface that records what it was given and can render it
#[derive(Debug, Default)]
pub struct MemorySurface {
    table: RefCell<Option<MemoryTable>>,
    attributes: RefCell<Vec<(String, String)>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_table(&self) -> Option<MemoryTable> {
        self.table.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
    }

    /// Attributes in the order they were first set
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.attributes.borrow().clone()
    }

    pub fn view_config(&self) -> GraphResult<ViewConfig> {
        let attributes = self.attributes.borrow();
        ViewConfig::from_attributes(attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }

    /// Evaluate the configured pivots over the loaded table
    pub fn render(&self) -> GraphResult<PivotView> {
        let table = self.loaded_table().ok_or(GraphError::TableNotLoaded)?;
        let config = self.view_config()?;
        let rows = table.store.borrow();
        PivotView::build(&config, table.schema(), &rows.rows)
    }
}

impl RenderSurface for MemorySurface {
    type Table = MemoryTable;

    fn load(&self, table: &MemoryTable) -> GraphResult<()> {
        *self.table.borrow_mut() = Some(table.clone());
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &str) -> GraphResult<()> {
        let mut attributes = self.attributes.borrow_mut();
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }
}

pub type PivotKey = Vec<CellValue>;

/// Pivoted, aggregated view of a table
#[derive(Debug, Clone, PartialEq)]
pub struct PivotView {
    /// Visible columns, in configured order
    pub columns: Vec<String>,
    /// Column-pivot keys (one chart series each), sorted
    pub series: Vec<PivotKey>,
    /// Row-pivot keys (x-axis buckets), sorted
    pub buckets: Vec<PivotKey>,
    cells: BTreeMap<(PivotKey, PivotKey), Vec<Option<f64>>>,
}

impl PivotView {
    fn build(config: &ViewConfig, schema: &Schema, rows: &[DisplayRow]) -> GraphResult<Self> {
        for name in config.row_pivots.iter().chain(&config.column_pivots).chain(&config.columns) {
            if schema.column_type(name).is_none() {
                return Err(GraphError::Surface(format!("unknown column `{}`", name)));
            }
        }

        let key_of = |row: &DisplayRow, pivots: &[String]| -> PivotKey {
            pivots.iter().filter_map(|name| row.cell(name)).collect()
        };

        let mut groups: BTreeMap<(PivotKey, PivotKey), Vec<&DisplayRow>> = BTreeMap::new();
        for row in rows {
            let bucket = key_of(row, config.row_pivots.as_slice());
            let series = key_of(row, config.column_pivots.as_slice());
            groups.entry((bucket, series)).or_default().push(row);
        }

        let mut buckets = BTreeSet::new();
        let mut series = BTreeSet::new();
        let mut cells = BTreeMap::new();
        for ((bucket, key), members) in groups {
            let values: Vec<Option<f64>> = config
                .columns
                .iter()
                .map(|column| {
                    let rule = config.aggregates.get(column).unwrap_or_else(|| {
                        schema.column_type(column).map_or(Aggregate::Count, Aggregate::default_for)
                    });
                    let column_values: Vec<CellValue> =
                        members.iter().filter_map(|row| row.cell(column)).collect();
                    evaluate(rule, &column_values)
                })
                .collect();
            buckets.insert(bucket.clone());
            series.insert(key.clone());
            cells.insert((bucket, key), values);
        }

        Ok(Self {
            columns: config.columns.clone(),
            series: series.into_iter().collect(),
            buckets: buckets.into_iter().collect(),
            cells,
        })
    }

    /// Aggregated value of `column` at one bucket of one series
    pub fn value(&self, bucket: &[CellValue], series: &[CellValue], column: &str) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.cells.get(&(bucket.to_vec(), series.to_vec()))?.get(index).copied().flatten()
    }

    /// Points of one series as `(bucket, value)` in bucket order
    pub fn series_points(&self, series: &[CellValue], column: &str) -> Vec<(PivotKey, f64)> {
        self.buckets
            .iter()
            .filter_map(|bucket| self.value(bucket, series, column).map(|v| (bucket.clone(), v)))
            .collect()
    }
}

fn evaluate(rule: Aggregate, values: &[CellValue]) -> Option<f64> {
    let numbers = || values.iter().filter_map(CellValue::as_f64);
    match rule {
        Aggregate::Count => Some(values.len() as f64),
        Aggregate::DistinctCount => Some(values.iter().collect::<HashSet<_>>().len() as f64),
        Aggregate::Sum => Some(numbers().sum()),
        Aggregate::Avg => {
            let (sum, n) = numbers().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (n > 0).then(|| sum / n as f64)
        }
        Aggregate::Last => numbers().last(),
        Aggregate::High => numbers().reduce(f64::max),
        Aggregate::Low => numbers().reduce(f64::min),
    }
}
