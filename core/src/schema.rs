//! Declarative row shapes.
//!
//! A [`Schema`] is the ordered list of field descriptors of one shape type. It
//! is built once per type (see [`Shape::schema`]) and reused by every query.
//! Values are written back through the object-safe [`Hydrate`] and
//! [`Collection`] traits, addressed by the descriptor's position in
//! [`Schema::fields`].

use crate::error::ConversionError;
use crate::value::Value;

/// Resolves the schema of a nested shape.
pub type SchemaFn = fn() -> &'static Schema;

/// Statement properties declared by a shape rather than selected from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Overrides the inferred table name.
    Table(&'static str),
    /// A WHERE condition; multiple conditions are joined with `AND`.
    Conditions(&'static str),
    GroupBy(&'static str),
    OrderBy(&'static str),
    Limit(&'static str),
    Offset(&'static str),
    /// Joins this shape with `LEFT JOIN` instead of `INNER JOIN`.
    LeftJoin,
}

/// What a field descriptor contributes to the statement.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Marker(Marker),
    /// A selected column. `expr` is used verbatim when present; otherwise the
    /// column name is inferred from the field name and qualified with the table.
    Column { expr: Option<&'static str> },
    /// A joined shape hydrated into a single value.
    One {
        on: Option<&'static str>,
        schema: SchemaFn,
    },
    /// A joined shape hydrated into a growing collection.
    Many {
        on: Option<&'static str>,
        schema: SchemaFn,
    },
    /// A shape flattened into the embedding shape's own scope.
    Embedded { schema: SchemaFn },
}

/// One entry in a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// The Rust field name, absent for tuple fields and markers.
    pub name: Option<&'static str>,
    pub kind: FieldKind,
}

impl Field {
    pub const fn marker(marker: Marker) -> Self {
        Self {
            name: None,
            kind: FieldKind::Marker(marker),
        }
    }

    pub const fn column(name: Option<&'static str>, expr: Option<&'static str>) -> Self {
        Self {
            name,
            kind: FieldKind::Column { expr },
        }
    }

    pub const fn one(name: Option<&'static str>, on: Option<&'static str>, schema: SchemaFn) -> Self {
        Self {
            name,
            kind: FieldKind::One { on, schema },
        }
    }

    pub const fn many(
        name: Option<&'static str>,
        on: Option<&'static str>,
        schema: SchemaFn,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Many { on, schema },
        }
    }

    pub const fn embedded(name: Option<&'static str>, schema: SchemaFn) -> Self {
        Self {
            name,
            kind: FieldKind::Embedded { schema },
        }
    }
}

/// The declarative description of a row shape.
#[derive(Debug, Clone)]
pub struct Schema {
    /// The Rust type name, used to infer the root table name.
    pub name: Option<&'static str>,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: Option<&'static str>, fields: Vec<Field>) -> Self {
        Self { name, fields }
    }

    /// Display name used in declaration errors.
    pub fn display_name(&self) -> &'static str {
        self.name.unwrap_or("<anonymous>")
    }

    /// Returns true if the shape, or any shape nested or embedded in it, has a
    /// has-many field.
    pub fn has_many(&self) -> bool {
        self.fields.iter().any(|field| match field.kind {
            FieldKind::Many { .. } => true,
            FieldKind::One { schema, .. } | FieldKind::Embedded { schema } => schema().has_many(),
            FieldKind::Marker(_) | FieldKind::Column { .. } => false,
        })
    }
}

/// Write access to the fields of a hydrated value.
///
/// `field` is always the position of the descriptor in [`Schema::fields`].
pub trait Hydrate {
    /// Copies a scanned value into the scalar field at `field`.
    fn set(&mut self, field: usize, value: &Value) -> Result<(), ConversionError>;

    /// The nested single or embedded value at `field`.
    fn nested(&mut self, field: usize) -> Option<&mut dyn Hydrate>;

    /// The has-many collection at `field`.
    fn many(&mut self, field: usize) -> Option<&mut dyn Collection>;
}

/// A growable collection of hydrated elements.
pub trait Collection {
    /// Appends a default element and returns its index.
    fn push_default(&mut self) -> usize;

    fn element(&mut self, index: usize) -> Option<&mut dyn Hydrate>;

    /// Schema of the element type.
    fn element_schema() -> &'static Schema
    where
        Self: Sized;
}

impl<T: Shape> Collection for Vec<T> {
    fn push_default(&mut self) -> usize {
        self.push(T::default());
        self.len() - 1
    }

    fn element(&mut self, index: usize) -> Option<&mut dyn Hydrate> {
        self.get_mut(index).map(|element| element as &mut dyn Hydrate)
    }

    fn element_schema() -> &'static Schema {
        T::schema()
    }
}

/// A type whose fields describe a query.
///
/// Usually derived with `#[derive(Shape)]`. Implementations must return the
/// same cached schema on every call.
pub trait Shape: Hydrate + Default + 'static {
    fn schema() -> &'static Schema;
}
