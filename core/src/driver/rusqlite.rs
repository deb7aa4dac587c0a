//! SQLite through [`rusqlite`](::rusqlite).
//!
//! Both [`Connection`] and [`rusqlite::Transaction`](::rusqlite::Transaction)
//! act as query collaborators. SQLite takes no execution context, so
//! `Context = ()`.

use ::rusqlite::types::{ToSqlOutput, ValueRef};
use ::rusqlite::{Connection, Rows, ToSql, params_from_iter};

use crate::error::{BoxError, ConversionError, QuarryError, Result};
use crate::transaction::{RowCursor, Transaction};
use crate::value::Value;

impl ToSql for Value {
    fn to_sql(&self) -> ::rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Value::Null => ValueRef::Null,
            Value::Integer(n) => ValueRef::Integer(*n),
            Value::Real(n) => ValueRef::Real(*n),
            Value::Text(text) => ValueRef::Text(text.as_bytes()),
            Value::Blob(bytes) => ValueRef::Blob(bytes),
        }))
    }
}

/// Text that is not valid UTF-8 is rejected rather than repaired.
impl TryFrom<ValueRef<'_>> for Value {
    type Error = std::str::Utf8Error;

    fn try_from(value: ValueRef<'_>) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(n) => Value::Real(n),
            ValueRef::Text(bytes) => Value::Text(std::str::from_utf8(bytes)?.to_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        })
    }
}

/// Cursor over [`Rows`] that copies the current row out on every advance.
struct SqliteCursor<'s> {
    rows: Rows<'s>,
    columns: usize,
    row: Vec<Value>,
}

impl RowCursor for SqliteCursor<'_> {
    fn advance(&mut self) -> std::result::Result<bool, BoxError> {
        let Some(row) = self.rows.next()? else {
            return Ok(false);
        };
        self.row.clear();
        for index in 0..self.columns {
            self.row.push(Value::try_from(row.get_ref(index)?)?);
        }
        Ok(true)
    }

    fn scan(&mut self, dest: &mut [Value]) -> std::result::Result<(), BoxError> {
        if dest.len() != self.row.len() {
            return Err(ConversionError::ColumnCount {
                expected: dest.len(),
                found: self.row.len(),
            }
            .into());
        }
        dest.clone_from_slice(&self.row);
        Ok(())
    }
}

fn run<R, F>(conn: &Connection, sql: &str, args: &[Value], read: F) -> Result<R>
where
    F: FnOnce(&mut dyn RowCursor) -> Result<R>,
{
    let mut stmt = conn.prepare(sql).map_err(QuarryError::query)?;
    let columns = stmt.column_count();
    let rows = stmt
        .query(params_from_iter(args.iter()))
        .map_err(QuarryError::query)?;
    let mut cursor = SqliteCursor {
        rows,
        columns,
        row: Vec::with_capacity(columns),
    };
    read(&mut cursor)
}

fn run_row(conn: &Connection, sql: &str, args: &[Value], dest: &mut [Value]) -> Result<bool> {
    run(conn, sql, args, |cursor| {
        if !cursor.advance().map_err(QuarryError::Close)? {
            return Ok(false);
        }
        cursor.scan(dest).map_err(QuarryError::Scan)?;
        Ok(true)
    })
}

impl Transaction for Connection {
    type Context = ();

    fn query<R, F>(&self, _ctx: &(), sql: &str, args: &[Value], read: F) -> Result<R>
    where
        F: FnOnce(&mut dyn RowCursor) -> Result<R>,
    {
        run(self, sql, args, read)
    }

    fn query_row(&self, _ctx: &(), sql: &str, args: &[Value], dest: &mut [Value]) -> Result<bool> {
        run_row(self, sql, args, dest)
    }
}

impl Transaction for ::rusqlite::Transaction<'_> {
    type Context = ();

    fn query<R, F>(&self, _ctx: &(), sql: &str, args: &[Value], read: F) -> Result<R>
    where
        F: FnOnce(&mut dyn RowCursor) -> Result<R>,
    {
        run(self, sql, args, read)
    }

    fn query_row(&self, _ctx: &(), sql: &str, args: &[Value], dest: &mut [Value]) -> Result<bool> {
        run_row(self, sql, args, dest)
    }
}
