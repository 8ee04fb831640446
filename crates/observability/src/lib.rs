//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings, UnknownLogFormat};

/// Initialize logging with the default settings (JSON, `info`, `RUST_LOG`
/// override).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(&LogSettings::default());
}

/// Initialize logging with explicit settings.
pub fn init_with(settings: &LogSettings) {
    tracing::init(settings);
}
