//! Centralized path definitions for generated code.
//!
//! Paths use the `quarry::` prefix without a leading `::`, so the facade crate
//! can name itself with `extern crate self as quarry` and code inside a
//! `mod quarry { ... }` shim resolves the same way.

use proc_macro2::TokenStream;
use quote::quote;

pub mod std {
    use super::*;

    pub fn option() -> TokenStream {
        quote!(::std::option::Option)
    }

    pub fn result() -> TokenStream {
        quote!(::std::result::Result)
    }

    pub fn once_lock() -> TokenStream {
        quote!(::std::sync::OnceLock)
    }
}

pub mod core {
    use super::*;

    pub fn shape() -> TokenStream {
        quote!(quarry::Shape)
    }

    pub fn schema() -> TokenStream {
        quote!(quarry::Schema)
    }

    pub fn field() -> TokenStream {
        quote!(quarry::Field)
    }

    pub fn marker() -> TokenStream {
        quote!(quarry::Marker)
    }

    pub fn hydrate() -> TokenStream {
        quote!(quarry::Hydrate)
    }

    pub fn collection() -> TokenStream {
        quote!(quarry::Collection)
    }

    pub fn value() -> TokenStream {
        quote!(quarry::Value)
    }

    pub fn from_value() -> TokenStream {
        quote!(quarry::FromValue)
    }

    pub fn conversion_error() -> TokenStream {
        quote!(quarry::ConversionError)
    }
}
