use thiserror::Error;

/// Boxed cause reported by a transaction collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum QuarryError {
    /// The row shape cannot be turned into a statement
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// The transaction failed to issue the query
    #[error("query: {0}")]
    Query(#[source] BoxError),

    /// A row could not be scanned into its destination
    #[error("scan: {0}")]
    Scan(#[source] BoxError),

    /// The row cursor failed while advancing or releasing
    #[error("close: {0}")]
    Close(#[source] BoxError),

    /// No rows returned when at least one was expected
    #[error("No rows found")]
    NotFound,

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl QuarryError {
    pub fn query(cause: impl Into<BoxError>) -> Self {
        Self::Query(cause.into())
    }

    pub fn scan(cause: impl Into<BoxError>) -> Self {
        Self::Scan(cause.into())
    }

    pub fn close(cause: impl Into<BoxError>) -> Self {
        Self::Close(cause.into())
    }

    /// Returns true for the single-row "no rows" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Mistakes in a row shape declaration. These are raised while the statement is
/// built, before the transaction sees any SQL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("{shape}.{field} requires a join predicate describing the join conditions")]
    MissingJoinPredicate { shape: String, field: String },

    #[error("{shape} field #{index} has neither a column expression nor a name to infer one from")]
    UnnamedColumn { shape: String, index: usize },

    #[error("{shape} field #{index} is nested but has no name to infer a table from")]
    UnnamedJoin { shape: String, index: usize },

    #[error("cannot infer a table name for an unnamed shape without a table marker")]
    UnnamedTable,
}

/// Failures converting a scanned value into a destination field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {expected}")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },

    #[error("shape has no {kind} field at position {field}")]
    UnknownField { kind: &'static str, field: usize },

    #[error("expected {expected} columns, the row has {found}")]
    ColumnCount { expected: usize, found: usize },
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QuarryError>;
