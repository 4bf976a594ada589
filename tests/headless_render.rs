use insta::assert_snapshot;
use quote_graph::application::{GraphAdapter, GraphConfig};
use quote_graph::domain::chart::{Aggregate, CellValue, RenderSurface, UpdatePolicy};
use quote_graph::domain::errors::GraphError;
use quote_graph::domain::market_data::{QuoteRecord, Timestamp, TopOfBook};
use quote_graph::infrastructure::memory::{MemoryEngine, MemorySurface, PivotView};

fn quote(stock: &str, ask: f64, bid: f64, millis: i64) -> QuoteRecord {
    QuoteRecord::new(
        stock,
        Some(TopOfBook::new(ask, 1)),
        Some(TopOfBook::new(bid, 1)),
        Timestamp::from_millis(millis),
    )
}

fn stream() -> Vec<Vec<QuoteRecord>> {
    // Each response repeats the earlier quotes, like the polling streamer does.
    let t0 = vec![quote("ABC", 10.0, 9.5, 0), quote("DEF", 20.0, 19.0, 0)];
    let mut t1 = t0.clone();
    t1.extend([quote("ABC", 11.0, 10.5, 1_000), quote("DEF", 21.0, 20.0, 1_000)]);
    let mut t2 = t1.clone();
    t2.push(quote("ABC", 12.0, 11.5, 2_000));
    vec![t0, t1, t2]
}

fn render_with(policy: UpdatePolicy) -> PivotView {
    let mut adapter =
        GraphAdapter::new(MemoryEngine::new(), GraphConfig::default().with_update_policy(policy));
    let surface = MemorySurface::new();
    adapter.initialize(&surface).unwrap();
    for batch in stream() {
        adapter.apply_update(&batch).unwrap();
    }
    surface.render().unwrap()
}

fn series(stock: &str) -> Vec<CellValue> {
    vec![CellValue::Text(stock.to_string())]
}

fn bucket(millis: i64) -> Vec<CellValue> {
    vec![CellValue::Date(Timestamp::from_millis(millis))]
}

#[test]
fn aggregates_attribute_keeps_configured_order() {
    let surface = MemorySurface::new();
    let mut adapter = GraphAdapter::new(MemoryEngine::new(), GraphConfig::default());
    adapter.initialize(&surface).unwrap();
    assert_snapshot!(
        surface.attribute("aggregates").unwrap(),
        @r#"{"stock":"distinct count","top_ask_price":"avg","top_bid_price":"avg","timestamp":"distinct count"}"#
    );
}

#[test]
fn renders_one_series_per_stock_over_time() {
    let view = render_with(UpdatePolicy::Resubmit);
    assert_eq!(view.columns, vec!["top_ask_price".to_string()]);
    assert_eq!(view.series, vec![series("ABC"), series("DEF")]);
    assert_eq!(view.buckets, vec![bucket(0), bucket(1_000), bucket(2_000)]);

    let abc: Vec<f64> =
        view.series_points(&series("ABC"), "top_ask_price").into_iter().map(|(_, v)| v).collect();
    assert_eq!(abc, vec![10.0, 11.0, 12.0]);
    let def: Vec<f64> =
        view.series_points(&series("DEF"), "top_ask_price").into_iter().map(|(_, v)| v).collect();
    assert_eq!(def, vec![20.0, 21.0]);
    assert_eq!(view.value(&bucket(2_000), &series("DEF"), "top_ask_price"), None);
}

#[test]
fn averaging_masks_resubmitted_rows() {
    let resubmitted = render_with(UpdatePolicy::Resubmit);
    let deduplicated = render_with(UpdatePolicy::SkipSubmitted);
    assert_eq!(resubmitted, deduplicated);
}

#[test]
fn render_honours_changed_attributes() {
    let surface = MemorySurface::new();
    let mut adapter = GraphAdapter::new(MemoryEngine::new(), GraphConfig::default());
    adapter.initialize(&surface).unwrap();
    adapter.apply_update(&stream()[1]).unwrap();

    surface.set_attribute("columns", r#"["top_bid_price","stock"]"#).unwrap();
    surface.set_attribute("column-pivots", "[]").unwrap();
    let view = surface.render().unwrap();
    assert_eq!(view.series, vec![Vec::<CellValue>::new()]);
    assert_eq!(view.value(&bucket(1_000), &[], "top_bid_price"), Some(15.25));
    assert_eq!(view.value(&bucket(1_000), &[], "stock"), Some(2.0));
    assert_eq!(view.value(&bucket(0), &[], "stock"), Some(2.0));
    assert_eq!(
        surface.view_config().unwrap().aggregates.get("stock"),
        Some(Aggregate::DistinctCount)
    );
}

#[test]
fn render_rejects_unknown_columns() {
    let surface = MemorySurface::new();
    let mut adapter = GraphAdapter::new(MemoryEngine::new(), GraphConfig::default());
    adapter.initialize(&surface).unwrap();
    surface.set_attribute("columns", r#"["volume"]"#).unwrap();
    assert_eq!(
        surface.render().unwrap_err(),
        GraphError::Surface("unknown column `volume`".to_string())
    );
}
