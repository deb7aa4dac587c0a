//! Core of quarry: shape schemas, statement compilation, row hydration and the
//! query coordinator. Most users depend on the `quarry` facade crate instead.

pub mod driver;
pub mod error;
pub mod hydrate;
pub mod naming;
pub mod query;
pub mod schema;
pub mod statement;
pub mod tracing;
pub mod transaction;
pub mod value;
pub mod walker;

// Re-export key types and traits
pub use error::{BoxError, ConversionError, DeclarationError, QuarryError, Result};
pub use hydrate::{Bindings, RowHydrator};
pub use naming::{ElementInfo, Namer, StandardNamer, default_namer, set_default_namer};
pub use query::{all, auto, identity, one};
pub use schema::{Collection, Field, FieldKind, Hydrate, Marker, Schema, SchemaFn, Shape};
pub use statement::{Column, JoinKind, Statement};
pub use transaction::{Logger, Options, RowCursor, Transaction};
pub use value::{FromValue, Value};
pub use walker::Plan;
