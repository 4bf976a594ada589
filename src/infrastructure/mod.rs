pub mod memory;
pub mod perspective;
pub mod services;
