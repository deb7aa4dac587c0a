#![recursion_limit = "128"]

extern crate proc_macro;

mod paths;
mod shape;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `Shape` and `Hydrate` for a struct, turning its fields into a
/// query description.
///
/// Container options, applied in the order they are written:
///
/// - `table = "users"` overrides the table name inferred from the struct name
/// - `conditions = "..."`, `group_by = "..."`, `order_by = "..."` add clauses
/// - `limit = 10` / `offset = "?"` page the root query
/// - `left_join` joins the shape with `LEFT JOIN` when it is nested
///
/// Field options:
///
/// - `column = "expr"` selects a verbatim expression instead of the inferred column
/// - `has_one = "predicate"` joins a nested shape
/// - `has_many = "predicate"` joins a `Vec` of shapes, deduplicated by identity
/// - `flatten` merges another shape into this one
///
/// The struct must implement `Default`.
///
/// # Example
///
/// ```ignore
/// #[derive(Shape, Default)]
/// #[shape(order_by = "users.name")]
/// struct Users {
///     name: String,
///     #[shape(has_many = "addresses.user_id = users.id")]
///     addresses: Vec<Address>,
/// }
///
/// #[derive(Shape, Default)]
/// struct Address {
///     city: String,
/// }
/// ```
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match shape::generate_shape_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
