//! Tracing, logging and panic capture (shared setup).

/// Initialize process-wide observability (tracing/logging + panic capture).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(level: &str) {
    tracing::init(level);
    panic::install_hook();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Panic hook that keeps the panicking thread's stack trace for recovery logging.
pub mod panic;
