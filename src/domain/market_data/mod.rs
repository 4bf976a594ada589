//! Market data aggregate: streamed quote records and their value objects.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
