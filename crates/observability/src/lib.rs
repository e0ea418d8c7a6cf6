//! Tracing and logging setup shared by the server binary and tests.

/// Initialize process-wide logging.
///
/// `default_level` applies when `RUST_LOG` is not set. Safe to call multiple
/// times; subsequent calls become no-ops.
pub fn init(default_level: &str) {
    tracing::init(default_level);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
