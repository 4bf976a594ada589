pub mod config;
pub mod graph_adapter;

pub use config::*;
pub use graph_adapter::*;
