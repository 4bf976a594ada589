use super::entities::{DisplayRow, Schema};
use crate::domain::errors::GraphResult;

/// Columnar store owned by the visualization engine
pub trait DisplayTable {
    /// Layout the table was created with
    fn schema(&self) -> &Schema;

    /// Append rows; ownership of the rows passes to the engine
    fn update(&self, rows: Vec<DisplayRow>) -> GraphResult<()>;
}

/// Engine facility that creates tables
pub trait TableWorker {
    type Table: DisplayTable;

    fn table(&self, schema: &Schema) -> GraphResult<Self::Table>;
}

/// Capability check for the engine, injected into the adapter
pub trait EngineProvider {
    type Worker: TableWorker;

    /// `None` when the engine is not available in this environment
    fn worker(&self) -> Option<Self::Worker>;
}

/// On-screen element hosting the chart
pub trait RenderSurface {
    type Table;

    fn load(&self, table: &Self::Table) -> GraphResult<()>;

    fn set_attribute(&self, name: &str, value: &str) -> GraphResult<()>;
}

/// Table type produced by a provider's worker
pub type EngineTable<P> = <<P as EngineProvider>::Worker as TableWorker>::Table;
