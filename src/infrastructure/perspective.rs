//! Binding to the browser build of the Perspective engine: the
//! `window.perspective` global and the `<perspective-viewer>` element.

use crate::domain::{
    chart::{DisplayRow, DisplayTable, EngineProvider, RenderSurface, Schema, TableWorker},
    errors::{GraphError, GraphResult},
    logging::LogComponent,
};
use crate::log_debug;
use js_sys::{JSON, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue, prelude::*};
use web_sys::{Document, Element, HtmlElement};

const PERSPECTIVE_GLOBAL: &str = "perspective";

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    type JsPerspective;

    #[wasm_bindgen(method, catch)]
    fn worker(this: &JsPerspective) -> Result<JsValue, JsValue>;

    #[derive(Debug, Clone)]
    type JsWorker;

    #[wasm_bindgen(method, catch)]
    fn table(this: &JsWorker, schema: &Object) -> Result<JsTable, JsValue>;

    #[derive(Debug, Clone)]
    type JsTable;

    #[wasm_bindgen(method, catch)]
    fn update(this: &JsTable, data: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(extends = web_sys::HtmlElement)]
    #[derive(Debug, Clone)]
    type JsViewer;

    #[wasm_bindgen(method, catch)]
    fn load(this: &JsViewer, table: &JsTable) -> Result<JsValue, JsValue>;
}

fn js_error(context: &str, err: JsValue) -> GraphError {
    let detail = err
        .as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", err));
    GraphError::Engine(format!("{}: {}", context, detail))
}

/// Looks the engine up on `window` each time it is asked
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserEngineProvider;

impl EngineProvider for BrowserEngineProvider {
    type Worker = PerspectiveWorker;

    fn worker(&self) -> Option<PerspectiveWorker> {
        let window = web_sys::window()?;
        let global = Reflect::get(&window, &JsValue::from_str(PERSPECTIVE_GLOBAL)).ok()?;
        if global.is_undefined() || global.is_null() {
            return None;
        }
        let worker = global.unchecked_into::<JsPerspective>().worker().ok()?;
        if !worker.is_truthy() {
            return None;
        }
        log_debug!(LogComponent::Infrastructure("Perspective"), "engine worker acquired");
        Some(PerspectiveWorker {
            inner: worker.unchecked_into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PerspectiveWorker {
    inner: JsWorker,
}

impl TableWorker for PerspectiveWorker {
    type Table = PerspectiveTable;

    fn table(&self, schema: &Schema) -> GraphResult<PerspectiveTable> {
        let spec = Object::new();
        for (name, ty) in schema.columns() {
            Reflect::set(&spec, &JsValue::from_str(name), &JsValue::from_str(ty.as_ref()))
                .map_err(|e| js_error("schema", e))?;
        }
        let inner = self.inner.table(&spec).map_err(|e| js_error("table", e))?;
        Ok(PerspectiveTable { inner, schema: schema.clone() })
    }
}

#[derive(Debug, Clone)]
pub struct PerspectiveTable {
    inner: JsTable,
    schema: Schema,
}

impl DisplayTable for PerspectiveTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn update(&self, rows: Vec<DisplayRow>) -> GraphResult<()> {
        let json = serde_json::to_string(&rows)?;
        let data = JSON::parse(&json).map_err(|e| js_error("update payload", e))?;
        self.inner.update(&data).map_err(|e| js_error("update", e))?;
        Ok(())
    }
}

/// `<perspective-viewer>` element seen as a rendering surface
#[derive(Debug, Clone)]
pub struct PerspectiveViewer {
    element: JsViewer,
}

impl PerspectiveViewer {
    pub fn from_element(element: Element) -> Self {
        Self {
            element: element.unchecked_into(),
        }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl RenderSurface for PerspectiveViewer {
    type Table = PerspectiveTable;

    fn load(&self, table: &PerspectiveTable) -> GraphResult<()> {
        self.element.load(&table.inner).map_err(|e| js_error("load", e))?;
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: &str) -> GraphResult<()> {
        self.element
            .set_attribute(name, value)
            .map_err(|e| GraphError::Surface(format!("{}: {:?}", name, e)))
    }
}

/// First element named `tag` in `document`
pub fn find_viewer(document: &Document, tag: &str) -> GraphResult<PerspectiveViewer> {
    document
        .get_elements_by_tag_name(tag)
        .item(0)
        .map(PerspectiveViewer::from_element)
        .ok_or_else(|| GraphError::SurfaceNotFound(tag.to_string()))
}
