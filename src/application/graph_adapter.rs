use crate::{
    application::config::GraphConfig,
    domain::{
        chart::{
            DisplayRow, DisplayTable, EngineProvider, EngineTable, RenderSurface, RowKey,
            RowProjection, Schema, SubmittedRows, TableWorker, UpdatePolicy,
        },
        errors::GraphResult,
        logging::LogComponent,
        market_data::QuoteRecord,
    },
    log_debug, log_info, log_trace, log_warn,
};

const COMPONENT: LogComponent = LogComponent::Application("GraphAdapter");

/// Lifecycle of the adapter. Leaves `Uninitialized` once and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    /// No engine was available at initialization; updates are dropped
    Degraded,
    Attached,
}

/// Bridges an array of quotes to a live display table
pub struct GraphAdapter<P: EngineProvider> {
    provider: P,
    config: GraphConfig,
    state: AdapterState,
    table: Option<EngineTable<P>>,
    submitted: SubmittedRows,
}

impl<P: EngineProvider> GraphAdapter<P> {
    pub fn new(provider: P, config: GraphConfig) -> Self {
        Self {
            provider,
            config,
            state: AdapterState::Uninitialized,
            table: None,
            submitted: SubmittedRows::new(),
        }
    }

    /// Create the display table and attach it to `surface`.
    ///
    /// Without an engine the adapter settles in [`AdapterState::Degraded`]
    /// and reports success. Only the first call does anything.
    pub fn initialize<S>(&mut self, surface: &S) -> GraphResult<AdapterState>
    where
        S: RenderSurface<Table = EngineTable<P>>,
    {
        if self.state != AdapterState::Uninitialized {
            return Ok(self.state);
        }

        let schema = Schema::display();
        let Some(worker) = self.provider.worker() else {
            log_warn!(COMPONENT, "visualization engine unavailable, updates will be dropped");
            self.state = AdapterState::Degraded;
            return Ok(self.state);
        };

        let table = worker.table(&schema)?;
        surface.load(&table)?;
        for (name, value) in self.config.view.attributes()? {
            surface.set_attribute(name, &value)?;
        }

        log_info!(
            COMPONENT,
            "display table attached ({} columns, view {})",
            schema.len(),
            self.config.view.view
        );
        self.table = Some(table);
        self.state = AdapterState::Attached;
        Ok(self.state)
    }

    /// Project `records` and submit them to the table in one update.
    ///
    /// Returns the number of rows submitted; 0 without doing anything when
    /// no table exists.
    pub fn apply_update(&mut self, records: &[QuoteRecord]) -> GraphResult<usize> {
        let Some(table) = &self.table else {
            return Ok(0);
        };

        let rows = RowProjection::project_all(records);
        let count = match self.config.update_policy {
            UpdatePolicy::Resubmit => {
                let count = rows.len();
                table.update(rows)?;
                count
            }
            UpdatePolicy::SkipSubmitted => {
                let fresh = self.submitted.fresh(&rows);
                log_trace!(
                    COMPONENT,
                    "skipped {} already submitted rows",
                    rows.len() - fresh.len()
                );
                // keys are only remembered once the engine has accepted them
                let keys: Vec<RowKey> = fresh.iter().map(DisplayRow::key).collect();
                let count = fresh.len();
                table.update(fresh)?;
                self.submitted.commit(keys);
                count
            }
        };
        log_debug!(COMPONENT, "submitted {} rows", count);
        Ok(count)
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn table(&self) -> Option<&EngineTable<P>> {
        self.table.as_ref()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}
