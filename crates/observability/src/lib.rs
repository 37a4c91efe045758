//! Process-wide tracing/logging setup shared by the binaries.

/// Tracing configuration (filters, formatting).
pub mod tracing;

/// Initialize process-wide logging with the default `info` filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}
