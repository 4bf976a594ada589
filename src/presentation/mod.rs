pub mod graph_component;
pub mod wasm_api;

pub use graph_component::*;
pub use wasm_api::*;
