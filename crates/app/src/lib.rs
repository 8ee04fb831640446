//! Configuration and wiring for the `shopcart` binary.

pub mod config;
pub mod context;

pub use config::{AppConfig, ConfigError, DbLocation};
pub use context::{AppContext, AppError, SharedCart};
