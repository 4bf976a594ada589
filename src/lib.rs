use wasm_bindgen::prelude::*;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// Install panic hook, console logger and browser clock
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    domain::logging::init_logger(Box::new(
        infrastructure::services::ConsoleLogger::new_development(),
    ));
    domain::logging::init_time_provider(Box::new(
        infrastructure::services::BrowserTimeProvider::new(),
    ));

    log_info!(domain::logging::LogComponent::Presentation("Initialize"), "quote graph ready");
}
