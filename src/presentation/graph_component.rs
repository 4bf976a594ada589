use leptos::html::Div;
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    application::{GraphAdapter, GraphConfig},
    domain::{
        errors::{GraphError, GraphResult},
        logging::{LogComponent, LogEntry, LogLevel, get_logger},
        market_data::QuoteRecord,
    },
    infrastructure::perspective::{BrowserEngineProvider, PerspectiveViewer},
    log_error, log_info,
};

const COMPONENT: LogComponent = LogComponent::Presentation("Graph");

type BrowserAdapter = GraphAdapter<BrowserEngineProvider>;

/// Live quote chart.
///
/// The viewer element is created inside a host `<div>` and the display
/// table is attached once that host is loaded. Every change of `data` is
/// pushed to the table; changes arriving before the table exists are
/// dropped.
#[component]
pub fn Graph(
    #[prop(into)] data: Signal<Vec<QuoteRecord>>,
    #[prop(optional)] config: GraphConfig,
) -> impl IntoView {
    let viewer_tag = config.viewer_tag.clone();
    let adapter = Rc::new(RefCell::new(GraphAdapter::new(BrowserEngineProvider, config)));
    let host = create_node_ref::<Div>();

    let mount_adapter = Rc::clone(&adapter);
    host.on_load(move |host| {
        match attach(&host, &viewer_tag, &mut mount_adapter.borrow_mut()) {
            Ok(()) => {
                log_info!(COMPONENT, "mounted <{}>", viewer_tag);
            }
            Err(err) => {
                log_error!(COMPONENT, "mount failed: {}", err);
            }
        }
    });

    create_effect(move |_| {
        let records = data.get();
        if let Err(err) = adapter.borrow_mut().apply_update(&records) {
            let message = format!("update failed: {}", err);
            let entry = LogEntry::new(LogLevel::Error, COMPONENT, message)
                .with_metadata(format!("quotes={}", records.len()));
            get_logger().log(entry);
        }
    });

    view! { <div class="graph" node_ref=host></div> }
}

fn attach(
    host: &web_sys::HtmlElement,
    tag: &str,
    adapter: &mut BrowserAdapter,
) -> GraphResult<()> {
    let element = document()
        .create_element(tag)
        .map_err(|e| GraphError::Surface(format!("create <{}>: {:?}", tag, e)))?;
    host.append_child(&element)
        .map_err(|e| GraphError::Surface(format!("append <{}>: {:?}", tag, e)))?;
    adapter.initialize(&PerspectiveViewer::from_element(element))?;
    Ok(())
}
