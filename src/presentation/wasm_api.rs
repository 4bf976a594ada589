use wasm_bindgen::prelude::*;

use crate::{
    application::{AdapterState, GraphAdapter, GraphConfig},
    domain::{errors::GraphError, market_data::QuoteRecord},
    infrastructure::perspective::{BrowserEngineProvider, find_viewer},
};

fn to_js(err: GraphError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// JavaScript handle for hosts that drive the graph without Leptos
#[wasm_bindgen]
pub struct QuoteGraphApi {
    adapter: GraphAdapter<BrowserEngineProvider>,
}

#[wasm_bindgen]
impl QuoteGraphApi {
    /// `config_json` may be omitted or partial
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<QuoteGraphApi, JsValue> {
        let config = match config_json {
            Some(raw) => GraphConfig::from_json(&raw).map_err(to_js)?,
            None => GraphConfig::default(),
        };
        Ok(Self {
            adapter: GraphAdapter::new(BrowserEngineProvider, config),
        })
    }

    /// Attach to the first viewer element in the document. Returns whether a
    /// table was attached (`false` when the engine is missing).
    pub fn mount(&mut self) -> Result<bool, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("document not available"))?;
        let viewer = find_viewer(&document, &self.adapter.config().viewer_tag).map_err(to_js)?;
        let state = self.adapter.initialize(&viewer).map_err(to_js)?;
        Ok(state == AdapterState::Attached)
    }

    /// Push a JSON array of quotes; returns the number of rows submitted
    pub fn update(&mut self, quotes_json: &str) -> Result<usize, JsValue> {
        let records = QuoteRecord::batch_from_json(quotes_json).map_err(to_js)?;
        self.adapter.apply_update(&records).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.adapter.state() == AdapterState::Attached
    }
}
