//! Parsing of `#[shape(...)]` attributes.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Error, Lit, LitStr, Result, Token};

/// A container-level option, in the order it was written.
pub(crate) enum MarkerAttr {
    Table(String),
    Conditions(String),
    GroupBy(String),
    OrderBy(String),
    Limit(String),
    Offset(String),
    LeftJoin,
}

/// What a field contributes to the shape.
pub(crate) enum FieldAttr {
    /// A scalar column, optionally with a verbatim expression.
    Column(Option<String>),
    /// A nested single value joined on the predicate.
    HasOne(Option<String>),
    /// A nested collection joined on the predicate.
    HasMany(Option<String>),
    Flatten,
}

fn is_shape(attr: &Attribute) -> bool {
    attr.path().is_ident("shape")
}

fn option_name(meta: &ParseNestedMeta<'_>) -> Result<String> {
    meta.path
        .get_ident()
        .map(|ident| ident.unraw().to_string())
        .ok_or_else(|| meta.error("expected a shape option"))
}

fn string_value(meta: &ParseNestedMeta<'_>) -> Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// `limit` and `offset` accept an integer or a string such as `"?"`.
fn paging_value(meta: &ParseNestedMeta<'_>) -> Result<String> {
    match meta.value()?.parse::<Lit>()? {
        Lit::Str(text) => Ok(text.value()),
        Lit::Int(number) => Ok(number.base10_digits().to_owned()),
        other => Err(Error::new_spanned(other, "expected an integer or a string")),
    }
}

fn optional_predicate(meta: &ParseNestedMeta<'_>) -> Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        string_value(meta).map(Some)
    } else {
        Ok(None)
    }
}

pub(crate) fn parse_markers(attrs: &[Attribute]) -> Result<Vec<MarkerAttr>> {
    let mut markers = Vec::new();
    for attr in attrs.iter().filter(|attr| is_shape(attr)) {
        attr.parse_nested_meta(|meta| {
            let marker = match option_name(&meta)?.as_str() {
                "table" => MarkerAttr::Table(string_value(&meta)?),
                "conditions" => MarkerAttr::Conditions(string_value(&meta)?),
                "group_by" => MarkerAttr::GroupBy(string_value(&meta)?),
                "order_by" => MarkerAttr::OrderBy(string_value(&meta)?),
                "limit" => MarkerAttr::Limit(paging_value(&meta)?),
                "offset" => MarkerAttr::Offset(paging_value(&meta)?),
                "left_join" => MarkerAttr::LeftJoin,
                _ => {
                    return Err(meta.error(
                        "unknown shape option, expected one of: table, conditions, group_by, \
                         order_by, limit, offset, left_join",
                    ));
                }
            };
            markers.push(marker);
            Ok(())
        })?;
    }
    Ok(markers)
}

pub(crate) fn parse_field(field: &syn::Field) -> Result<FieldAttr> {
    let mut kind: Option<FieldAttr> = None;
    for attr in field.attrs.iter().filter(|attr| is_shape(attr)) {
        attr.parse_nested_meta(|meta| {
            let parsed = match option_name(&meta)?.as_str() {
                "column" => FieldAttr::Column(Some(string_value(&meta)?)),
                "has_one" => FieldAttr::HasOne(optional_predicate(&meta)?),
                "has_many" => FieldAttr::HasMany(optional_predicate(&meta)?),
                "flatten" => FieldAttr::Flatten,
                _ => {
                    return Err(meta.error(
                        "unknown field option, expected one of: column, has_one, has_many, flatten",
                    ));
                }
            };
            if kind.replace(parsed).is_some() {
                return Err(meta.error("a field takes at most one of: column, has_one, has_many, flatten"));
            }
            Ok(())
        })?;
    }
    Ok(kind.unwrap_or(FieldAttr::Column(None)))
}
