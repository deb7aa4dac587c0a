//! [`Transaction`](crate::Transaction) implementations for database drivers.

#[cfg(feature = "rusqlite")]
pub mod rusqlite;
