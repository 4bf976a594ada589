use quote_graph::application::{AdapterState, GraphAdapter, GraphConfig};
use quote_graph::domain::chart::{
    ColumnType, DisplayRow, DisplayTable, EngineProvider, RenderSurface, RowProjection, Schema,
    TableWorker, UpdatePolicy,
};
use quote_graph::domain::errors::{GraphError, GraphResult};
use quote_graph::domain::market_data::{QuoteRecord, Timestamp, TopOfBook};
use quote_graph::infrastructure::memory::{MemoryEngine, MemorySurface, MemoryTable};
use std::cell::{Cell, RefCell};

fn quote(stock: &str, ask: Option<f64>, bid: Option<f64>, millis: i64) -> QuoteRecord {
    QuoteRecord::new(
        stock,
        ask.map(|p| TopOfBook::new(p, 10)),
        bid.map(|p| TopOfBook::new(p, 10)),
        Timestamp::from_millis(millis),
    )
}

fn attached(config: GraphConfig) -> (GraphAdapter<MemoryEngine>, MemorySurface) {
    let mut adapter = GraphAdapter::new(MemoryEngine::new(), config);
    let surface = MemorySurface::new();
    assert_eq!(adapter.initialize(&surface).unwrap(), AdapterState::Attached);
    (adapter, surface)
}

#[test]
fn initialize_creates_table_with_display_schema() {
    let (adapter, surface) = attached(GraphConfig::default());
    let table = adapter.table().unwrap();
    let columns: Vec<(&str, ColumnType)> =
        table.schema().columns().iter().map(|(n, t)| (n.as_str(), *t)).collect();
    assert_eq!(
        columns,
        vec![
            ("stock", ColumnType::String),
            ("top_ask_price", ColumnType::Float),
            ("top_bid_price", ColumnType::Float),
            ("timestamp", ColumnType::Date),
        ]
    );
    assert!(surface.loaded_table().unwrap().same_table(table));
}

#[test]
fn initialize_configures_surface_attributes() {
    let (_adapter, surface) = attached(GraphConfig::default());
    let names: Vec<String> = surface.attributes().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["view", "column-pivots", "row-pivots", "columns", "aggregates"]);
    assert_eq!(surface.attribute("view").as_deref(), Some("y_line"));
    assert_eq!(surface.attribute("column-pivots").as_deref(), Some(r#"["stock"]"#));
    assert_eq!(surface.attribute("row-pivots").as_deref(), Some(r#"["timestamp"]"#));
    assert_eq!(surface.attribute("columns").as_deref(), Some(r#"["top_ask_price"]"#));
}

#[test]
fn schema_survives_any_number_of_updates() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    for i in 0..5 {
        adapter.apply_update(&[quote("ABC", Some(1.0), None, i)]).unwrap();
    }
    assert_eq!(adapter.table().unwrap().schema(), &Schema::display());
}

#[test]
fn projects_quote_into_display_row() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    let ts = Timestamp::from_millis(1_549_812_852_480);
    adapter.apply_update(&[quote("ABC", Some(10.5), Some(10.2), ts.value())]).unwrap();
    assert_eq!(
        adapter.table().unwrap().rows(),
        vec![DisplayRow {
            stock: "ABC".to_string(),
            top_ask_price: 10.5,
            top_bid_price: 10.2,
            timestamp: ts,
        }]
    );
}

#[test]
fn missing_prices_default_to_zero() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    adapter
        .apply_update(&[quote("ABC", None, Some(3.0), 0), quote("DEF", Some(4.0), None, 0)])
        .unwrap();
    let rows = adapter.table().unwrap().rows();
    assert_eq!((rows[0].top_ask_price, rows[0].top_bid_price), (0.0, 3.0));
    assert_eq!((rows[1].top_ask_price, rows[1].top_bid_price), (4.0, 0.0));
}

#[test]
fn empty_input_submits_empty_batch() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    assert_eq!(adapter.apply_update(&[]).unwrap(), 0);
    let table = adapter.table().unwrap();
    assert_eq!(table.update_batches(), vec![0]);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn rows_keep_input_order() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    let input = [
        quote("DEF", Some(2.0), None, 30),
        quote("ABC", Some(1.0), None, 10),
        quote("DEF", Some(3.0), None, 20),
    ];
    adapter.apply_update(&input).unwrap();
    let order: Vec<(String, i64)> = adapter
        .table()
        .unwrap()
        .rows()
        .into_iter()
        .map(|r| (r.stock, r.timestamp.value()))
        .collect();
    assert_eq!(
        order,
        vec![("DEF".to_string(), 30), ("ABC".to_string(), 10), ("DEF".to_string(), 20)]
    );
}

#[test]
fn degraded_mode_drops_updates_silently() {
    let mut adapter = GraphAdapter::new(MemoryEngine::unavailable(), GraphConfig::default());
    let surface = MemorySurface::new();
    assert_eq!(adapter.initialize(&surface).unwrap(), AdapterState::Degraded);
    assert!(adapter.table().is_none());
    assert!(surface.loaded_table().is_none());
    assert!(surface.attributes().is_empty());

    for i in 0..3 {
        assert_eq!(adapter.apply_update(&[quote("ABC", Some(1.0), None, i)]).unwrap(), 0);
    }
    assert_eq!(adapter.apply_update(&[]).unwrap(), 0);
}

#[test]
fn initialize_runs_only_once() {
    let (mut adapter, surface) = attached(GraphConfig::default());
    let first = adapter.table().unwrap().clone();

    let other = MemorySurface::new();
    assert_eq!(adapter.initialize(&other).unwrap(), AdapterState::Attached);
    assert!(other.loaded_table().is_none());
    assert!(adapter.table().unwrap().same_table(&first));
    assert!(surface.loaded_table().unwrap().same_table(&first));

    let mut degraded = GraphAdapter::new(MemoryEngine::unavailable(), GraphConfig::default());
    degraded.initialize(&other).unwrap();
    assert_eq!(degraded.initialize(&other).unwrap(), AdapterState::Degraded);
}

#[test]
fn resubmit_policy_sends_overlapping_rows_again() {
    let (mut adapter, _surface) = attached(GraphConfig::default());
    let first = [quote("ABC", Some(1.0), None, 0), quote("DEF", Some(2.0), None, 0)];
    let second = [
        quote("ABC", Some(1.0), None, 0),
        quote("DEF", Some(2.0), None, 0),
        quote("ABC", Some(1.5), None, 1),
    ];
    adapter.apply_update(&first).unwrap();
    adapter.apply_update(&second).unwrap();
    let table = adapter.table().unwrap();
    assert_eq!(table.update_batches(), vec![2, 3]);
    assert_eq!(table.row_count(), 5);
}

#[test]
fn skip_submitted_policy_never_repeats_a_row() {
    let config = GraphConfig::default().with_update_policy(UpdatePolicy::SkipSubmitted);
    let (mut adapter, _surface) = attached(config);
    let first = [quote("ABC", Some(1.0), None, 0), quote("DEF", Some(2.0), None, 0)];
    let second = [
        quote("ABC", Some(1.0), None, 0),
        quote("DEF", Some(2.0), None, 0),
        quote("ABC", Some(1.5), None, 1),
    ];
    assert_eq!(adapter.apply_update(&first).unwrap(), 2);
    assert_eq!(adapter.apply_update(&second).unwrap(), 1);
    assert_eq!(adapter.apply_update(&second).unwrap(), 0);

    let table = adapter.table().unwrap();
    assert_eq!(table.update_batches(), vec![2, 1, 0]);
    let mut keys: Vec<_> = table.rows().iter().map(|r| r.key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

/// Engine whose tables reject every update
struct BrokenEngine;
struct BrokenWorker;
struct BrokenTable(Schema);

impl EngineProvider for BrokenEngine {
    type Worker = BrokenWorker;

    fn worker(&self) -> Option<BrokenWorker> {
        Some(BrokenWorker)
    }
}

impl TableWorker for BrokenWorker {
    type Table = BrokenTable;

    fn table(&self, schema: &Schema) -> GraphResult<BrokenTable> {
        Ok(BrokenTable(schema.clone()))
    }
}

impl DisplayTable for BrokenTable {
    fn schema(&self) -> &Schema {
        &self.0
    }

    fn update(&self, _rows: Vec<DisplayRow>) -> GraphResult<()> {
        Err(GraphError::Engine("worker terminated".to_string()))
    }
}

struct NullSurface;

impl RenderSurface for NullSurface {
    type Table = BrokenTable;

    fn load(&self, _table: &BrokenTable) -> GraphResult<()> {
        Ok(())
    }

    fn set_attribute(&self, _name: &str, _value: &str) -> GraphResult<()> {
        Ok(())
    }
}

#[test]
fn engine_update_errors_reach_the_caller() {
    let mut adapter = GraphAdapter::new(BrokenEngine, GraphConfig::default());
    adapter.initialize(&NullSurface).unwrap();
    let err = adapter.apply_update(&[quote("ABC", Some(1.0), None, 0)]).unwrap_err();
    assert_eq!(err, GraphError::Engine("worker terminated".to_string()));
}

struct ReadOnlySurface;

impl RenderSurface for ReadOnlySurface {
    type Table = MemoryTable;

    fn load(&self, _table: &MemoryTable) -> GraphResult<()> {
        Ok(())
    }

    fn set_attribute(&self, name: &str, _value: &str) -> GraphResult<()> {
        Err(GraphError::Surface(format!("{} is read-only", name)))
    }
}

#[test]
fn surface_errors_abort_initialize() {
    let mut adapter = GraphAdapter::new(MemoryEngine::new(), GraphConfig::default());
    let err = adapter.initialize(&ReadOnlySurface).unwrap_err();
    assert_eq!(err, GraphError::Surface("view is read-only".to_string()));
    assert!(adapter.table().is_none());
    assert_eq!(adapter.state(), AdapterState::Uninitialized);
}

/// Rejects the first update, then accepts and records everything
struct FlakyEngine;
struct FlakyWorker;
struct FlakyTable {
    schema: Schema,
    failures_left: Cell<usize>,
    rows: RefCell<Vec<DisplayRow>>,
}

impl EngineProvider for FlakyEngine {
    type Worker = FlakyWorker;

    fn worker(&self) -> Option<FlakyWorker> {
        Some(FlakyWorker)
    }
}

impl TableWorker for FlakyWorker {
    type Table = FlakyTable;

    fn table(&self, schema: &Schema) -> GraphResult<FlakyTable> {
        Ok(FlakyTable {
            schema: schema.clone(),
            failures_left: Cell::new(1),
            rows: RefCell::new(Vec::new()),
        })
    }
}

impl DisplayTable for FlakyTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn update(&self, rows: Vec<DisplayRow>) -> GraphResult<()> {
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(GraphError::Engine("worker busy".to_string()));
        }
        self.rows.borrow_mut().extend(rows);
        Ok(())
    }
}

struct FlakySurface;

impl RenderSurface for FlakySurface {
    type Table = FlakyTable;

    fn load(&self, _table: &FlakyTable) -> GraphResult<()> {
        Ok(())
    }

    fn set_attribute(&self, _name: &str, _value: &str) -> GraphResult<()> {
        Ok(())
    }
}

#[test]
fn skip_submitted_retries_rows_the_engine_rejected() {
    let config = GraphConfig::default().with_update_policy(UpdatePolicy::SkipSubmitted);
    let mut adapter = GraphAdapter::new(FlakyEngine, config);
    adapter.initialize(&FlakySurface).unwrap();

    let quotes = [quote("ABC", Some(1.0), Some(0.5), 0)];
    assert!(adapter.apply_update(&quotes).is_err());
    assert_eq!(adapter.apply_update(&quotes).unwrap(), 1);
    assert_eq!(adapter.apply_update(&quotes).unwrap(), 0);

    let table = adapter.table().unwrap();
    assert_eq!(*table.rows.borrow(), RowProjection::project_all(&quotes));
}
