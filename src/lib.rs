//! # Quarry
//!
//! Declarative row shapes for Rust. A struct describes the rows it wants: its
//! fields become the selected columns, nested structs become joins, and
//! `Vec` fields become has-many relationships. Quarry compiles the shape into
//! a single `SELECT`, runs it through a [`Transaction`], and hydrates the flat
//! rows back into nested values.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! #[derive(Shape, Default, Debug)]
//! #[shape(order_by = "users.name")]
//! struct Users {
//!     name: String,
//!     #[shape(has_many = "addresses.user_id = users.id")]
//!     addresses: Vec<Addresses>,
//! }
//!
//! #[derive(Shape, Default, Debug)]
//! struct Addresses {
//!     city: String,
//! }
//!
//! # fn main() -> quarry::Result<()> {
//! let db = Db::open_in_memory()?;
//! db.inner().execute_batch(
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE addresses (id INTEGER PRIMARY KEY, user_id INTEGER, city TEXT);
//!      INSERT INTO users VALUES (1, 'John');
//!      INSERT INTO addresses VALUES (1, 1, 'Paris'), (2, 1, 'Berlin');",
//! )?;
//!
//! let users: Vec<Users> = quarry::all(&(), &db, identity, &args![])?;
//! assert_eq!(users.len(), 1);
//! assert_eq!(users[0].addresses.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature    | Default | Enables                                            |
//! |------------|---------|----------------------------------------------------|
//! | `rusqlite` | yes     | `Transaction` for rusqlite, `Db::open*`, `begin`   |
//! | `tracing`  | yes     | `tracing` events for queries and transactions      |

extern crate self as quarry;

mod db;

pub use db::{Db, Tx};

/// Derive macro for row shapes
pub use quarry_macros::Shape;

/// Positional query arguments
pub use quarry_core::args;

pub use quarry_core::{
    BoxError, Collection, ConversionError, DeclarationError, ElementInfo, Field, FieldKind,
    FromValue, Hydrate, Logger, Marker, Namer, Options, QuarryError, Result, RowCursor, Schema,
    SchemaFn, Shape, StandardNamer, Transaction, Value, all, auto, default_namer, identity, one,
    set_default_namer,
};

/// Statement compilation and hydration internals, for custom coordinators.
pub mod core {
    pub use quarry_core::{
        Bindings, Column, JoinKind, Plan, RowHydrator, Statement, quarry_trace_query,
        quarry_trace_tx,
    };
}

/// Error types
pub mod error {
    pub use quarry_core::error::{BoxError, ConversionError, DeclarationError, QuarryError};
}

pub mod prelude {
    pub use crate::{
        Db, FromValue, Options, QuarryError, Shape, Transaction, Tx, Value, all, args, auto,
        identity, one,
    };
}
