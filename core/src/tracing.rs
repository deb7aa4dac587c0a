//! Tracing hooks for query execution and transaction lifecycle.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate. The
//! macros expand to nothing when the feature is disabled in the calling crate.

/// Emit a debug-level event with the SQL text and argument count.
///
/// ```ignore
/// quarry_trace_query!(&sql, args.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($sql:expr, $arg_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, args = $arg_count, "quarry.query");
    };
}

/// Emit an info-level event for transaction begin, commit and rollback.
///
/// ```ignore
/// quarry_trace_tx!("begin", "sqlite.rusqlite");
/// ```
#[macro_export]
macro_rules! quarry_trace_tx {
    ($event:literal, $driver:literal) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, driver = $driver, "quarry.transaction");
    };
}
