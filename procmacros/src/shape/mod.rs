//! `#[derive(Shape)]`: builds the cached schema and the `Hydrate` impl.

mod attributes;

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Error, Fields, Index, Member, Result};

use self::attributes::{FieldAttr, MarkerAttr, parse_field, parse_markers};
use crate::paths::{core as core_paths, std as std_paths};

pub(crate) fn generate_shape_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Shape cannot be derived for generic structs",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(fields) => &fields.unnamed,
            Fields::Unit => {
                return Err(Error::new_spanned(
                    struct_name,
                    "Shape cannot be derived for unit structs",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                struct_name,
                "Shape can only be derived for structs",
            ));
        }
    };

    let option = std_paths::option();
    let result = std_paths::result();
    let once_lock = std_paths::once_lock();
    let shape = core_paths::shape();
    let schema = core_paths::schema();
    let field_path = core_paths::field();
    let marker = core_paths::marker();
    let hydrate = core_paths::hydrate();
    let collection = core_paths::collection();
    let value = core_paths::value();
    let from_value = core_paths::from_value();
    let conversion_error = core_paths::conversion_error();

    let some = |text: Option<&str>| match text {
        Some(text) => quote!(#option::Some(#text)),
        None => quote!(#option::None),
    };

    // Markers come first; every field's position in the schema is offset by them.
    let markers = parse_markers(&input.attrs)?;
    let mut descriptors: Vec<TokenStream> = markers
        .iter()
        .map(|attr| {
            let kind = match attr {
                MarkerAttr::Table(table) => quote!(#marker::Table(#table)),
                MarkerAttr::Conditions(condition) => quote!(#marker::Conditions(#condition)),
                MarkerAttr::GroupBy(group) => quote!(#marker::GroupBy(#group)),
                MarkerAttr::OrderBy(order) => quote!(#marker::OrderBy(#order)),
                MarkerAttr::Limit(limit) => quote!(#marker::Limit(#limit)),
                MarkerAttr::Offset(offset) => quote!(#marker::Offset(#offset)),
                MarkerAttr::LeftJoin => quote!(#marker::LeftJoin),
            };
            quote!(#field_path::marker(#kind))
        })
        .collect();

    let mut set_arms = Vec::new();
    let mut nested_arms = Vec::new();
    let mut many_arms = Vec::new();

    for (position, field) in fields.iter().enumerate() {
        let index = markers.len() + position;
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(position)),
        };
        let name = field.ident.as_ref().map(|ident| ident.unraw().to_string());
        let name = some(name.as_deref());
        let ty = &field.ty;

        match parse_field(field)? {
            FieldAttr::Column(expr) => {
                let expr = some(expr.as_deref());
                descriptors.push(quote!(#field_path::column(#name, #expr)));
                set_arms.push(quote! {
                    #index => {
                        self.#member = #from_value::from_value(value)?;
                        #result::Ok(())
                    }
                });
            }
            FieldAttr::HasOne(on) => {
                let on = some(on.as_deref());
                descriptors.push(quote!(#field_path::one(#name, #on, <#ty as #shape>::schema)));
                nested_arms.push(quote! {
                    #index => #option::Some(&mut self.#member as &mut dyn #hydrate),
                });
            }
            FieldAttr::HasMany(on) => {
                let on = some(on.as_deref());
                descriptors.push(quote!(
                    #field_path::many(#name, #on, <#ty as #collection>::element_schema)
                ));
                many_arms.push(quote! {
                    #index => #option::Some(&mut self.#member as &mut dyn #collection),
                });
            }
            FieldAttr::Flatten => {
                descriptors.push(quote!(#field_path::embedded(#name, <#ty as #shape>::schema)));
                nested_arms.push(quote! {
                    #index => #option::Some(&mut self.#member as &mut dyn #hydrate),
                });
            }
        }
    }

    let struct_name_str = struct_name.unraw().to_string();

    Ok(quote! {
        #[automatically_derived]
        impl #shape for #struct_name {
            fn schema() -> &'static #schema {
                static SCHEMA: #once_lock<#schema> = #once_lock::new();
                SCHEMA.get_or_init(|| {
                    #schema::new(#option::Some(#struct_name_str), ::std::vec![#(#descriptors),*])
                })
            }
        }

        #[automatically_derived]
        impl #hydrate for #struct_name {
            #[allow(unused_variables)]
            fn set(&mut self, field: usize, value: &#value) -> #result<(), #conversion_error> {
                match field {
                    #(#set_arms)*
                    _ => #result::Err(#conversion_error::UnknownField { kind: "column", field }),
                }
            }

            fn nested(&mut self, field: usize) -> #option<&mut dyn #hydrate> {
                match field {
                    #(#nested_arms)*
                    _ => #option::None,
                }
            }

            fn many(&mut self, field: usize) -> #option<&mut dyn #collection> {
                match field {
                    #(#many_arms)*
                    _ => #option::None,
                }
            }
        }
    })
}
