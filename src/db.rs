//! Database handles that carry [`Options`] alongside a transaction collaborator.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use quarry_core::{Options, Result, RowCursor, Transaction, Value};

/// A database handle: any [`Transaction`] plus the options used for every
/// query issued through it.
#[derive(Debug)]
pub struct Db<T> {
    inner: T,
    options: Options,
}

impl<T> Db<T> {
    pub fn new(inner: T) -> Self {
        Self::with_options(inner, Options::default())
    }

    pub fn with_options(inner: T, options: Options) -> Self {
        Self { inner, options }
    }

    /// Gets a reference to the wrapped handle
    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }
}

/// A transaction begun from a [`Db`], carrying the same options.
#[derive(Debug)]
pub struct Tx<T> {
    inner: T,
    options: Options,
}

impl<T> Tx<T> {
    pub fn new(inner: T, options: Options) -> Self {
        Self { inner, options }
    }

    /// Gets a reference to the underlying transaction
    #[inline]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }
}

macro_rules! delegate_transaction {
    ($handle:ident) => {
        impl<T: Transaction> Transaction for $handle<T> {
            type Context = T::Context;

            fn query<R, F>(&self, ctx: &Self::Context, sql: &str, args: &[Value], read: F) -> Result<R>
            where
                F: FnOnce(&mut dyn RowCursor) -> Result<R>,
            {
                self.inner.query(ctx, sql, args, read)
            }

            fn query_row(
                &self,
                ctx: &Self::Context,
                sql: &str,
                args: &[Value],
                dest: &mut [Value],
            ) -> Result<bool> {
                self.inner.query_row(ctx, sql, args, dest)
            }

            fn options(&self) -> Option<&Options> {
                Some(&self.options)
            }
        }
    };
}

delegate_transaction!(Db);
delegate_transaction!(Tx);
