//! Tracing and logging setup shared by every binary.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide tracing with JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize process-wide tracing with the given output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
