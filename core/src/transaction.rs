//! The transaction collaborator and per-handle options.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Result};
use crate::naming::Namer;
use crate::value::Value;

/// A forward-only cursor over the rows of one query.
pub trait RowCursor {
    /// Moves to the next row. Returns `Ok(false)` once the rows are exhausted.
    fn advance(&mut self) -> std::result::Result<bool, BoxError>;

    /// Copies the current row into `dest`, one value per column.
    fn scan(&mut self, dest: &mut [Value]) -> std::result::Result<(), BoxError>;

    /// Releases the cursor, reporting any error deferred during iteration.
    fn close(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// A queryable database handle.
///
/// Placeholders in the SQL are passed to the driver untouched, so the
/// positional arguments must use the driver's own syntax.
pub trait Transaction {
    /// Execution context passed verbatim to every call, e.g. a cancellation
    /// handle. Drivers without one use `()`.
    type Context: ?Sized;

    /// Runs `sql` and hands the open cursor to `read`.
    ///
    /// The cursor only lives for the duration of `read`; implementations
    /// release it when `read` returns, whether it succeeded or not. Failure to
    /// issue the query is reported as [`QuarryError::Query`](crate::QuarryError::Query).
    fn query<R, F>(&self, ctx: &Self::Context, sql: &str, args: &[Value], read: F) -> Result<R>
    where
        F: FnOnce(&mut dyn RowCursor) -> Result<R>;

    /// Runs `sql` and scans its first row into `dest`. Returns `Ok(false)` when
    /// the query produced no rows.
    fn query_row(
        &self,
        ctx: &Self::Context,
        sql: &str,
        args: &[Value],
        dest: &mut [Value],
    ) -> Result<bool>;

    /// Options carried by the handle, if any.
    fn options(&self) -> Option<&Options> {
        None
    }
}

impl<T: Transaction> Transaction for &T {
    type Context = T::Context;

    fn query<R, F>(&self, ctx: &Self::Context, sql: &str, args: &[Value], read: F) -> Result<R>
    where
        F: FnOnce(&mut dyn RowCursor) -> Result<R>,
    {
        (**self).query(ctx, sql, args, read)
    }

    fn query_row(
        &self,
        ctx: &Self::Context,
        sql: &str,
        args: &[Value],
        dest: &mut [Value],
    ) -> Result<bool> {
        (**self).query_row(ctx, sql, args, dest)
    }

    fn options(&self) -> Option<&Options> {
        (**self).options()
    }
}

/// Observes every executed query with its SQL text and arguments.
pub type Logger = Arc<dyn Fn(&str, &[Value]) + Send + Sync>;

/// Optional behaviour attached to a database handle. The defaults use the
/// process-wide namer and log nothing.
#[derive(Clone, Default)]
pub struct Options {
    namer: Option<Arc<dyn Namer>>,
    logger: Option<Logger>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names tables and columns with `namer` instead of the default.
    pub fn with_namer(mut self, namer: impl Namer + 'static) -> Self {
        self.namer = Some(Arc::new(namer));
        self
    }

    /// Calls `logger` once per executed query.
    pub fn with_logger(mut self, logger: impl Fn(&str, &[Value]) + Send + Sync + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn namer(&self) -> Option<&dyn Namer> {
        self.namer.as_deref()
    }

    pub fn log(&self, sql: &str, args: &[Value]) {
        if let Some(logger) = &self.logger {
            logger(sql, args);
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("namer", &self.namer.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
