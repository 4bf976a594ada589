//! Chart aggregate: display rows, table schema, view configuration and the
//! engine seams the adapter talks through.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
