use std::path::Path;

use ::rusqlite::Connection;
use quarry_core::Result;

use super::{Db, Tx};

impl Db<Connection> {
    /// Opens a private in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Begins a deferred transaction that carries this handle's options.
    ///
    /// The transaction rolls back on drop unless committed.
    pub fn begin(&mut self) -> Result<Tx<::rusqlite::Transaction<'_>>> {
        quarry_core::quarry_trace_tx!("begin", "sqlite.rusqlite");
        let options = self.options.clone();
        Ok(Tx::new(self.inner.transaction()?, options))
    }

    /// Runs `f` inside a transaction, committing when it returns `Ok` and
    /// rolling back when it returns `Err` or panics.
    pub fn transaction<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&Tx<::rusqlite::Transaction<'_>>) -> Result<R>,
    {
        let tx = self.begin()?;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit()?;
                Ok(value)
            }
            Ok(Err(e)) => {
                tx.rollback()?;
                Err(e)
            }
            Err(panic_payload) => {
                let _ = tx.rollback();
                std::panic::resume_unwind(panic_payload);
            }
        }
    }
}

impl Tx<::rusqlite::Transaction<'_>> {
    pub fn commit(self) -> Result<()> {
        quarry_core::quarry_trace_tx!("commit", "sqlite.rusqlite");
        Ok(self.inner.commit()?)
    }

    pub fn rollback(self) -> Result<()> {
        quarry_core::quarry_trace_tx!("rollback", "sqlite.rusqlite");
        Ok(self.inner.rollback()?)
    }
}

impl From<Connection> for Db<Connection> {
    fn from(conn: Connection) -> Self {
        Self::new(conn)
    }
}
