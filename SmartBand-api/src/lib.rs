// SmartBand-api lib.rs
//
// HTTP surface of the SmartBand backend: router, handlers, public entities
// and OpenAPI documentation.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::{create_app, AppState};
pub use config::{AppConfig, ConfigError};
