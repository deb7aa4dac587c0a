//! Name inference for shapes, fields and identity columns.

use std::sync::{Arc, OnceLock};

use heck::ToSnakeCase;

/// Derives SQL names from shape metadata.
///
/// Implementations must be pure: the same info always yields the same name.
pub trait Namer: Send + Sync {
    /// Name of the single identity column of the element, used to tell
    /// distinct rows apart when a join fans out.
    fn ident(&self, info: ElementInfo<'_>) -> String;

    /// Table name of the element.
    fn table(&self, info: ElementInfo<'_>) -> String;

    /// Column name of the element.
    fn column(&self, info: ElementInfo<'_>) -> String;
}

/// Information about the shape or field a name is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo<'a> {
    name: &'a str,
}

impl<'a> ElementInfo<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self { name }
    }

    /// The Rust identifier of the shape type or field.
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Naming convention used when no other namer is configured.
///
/// - identity column: `id`
/// - table: snake_case of the shape or field name (`UserAccount` → `user_account`)
/// - column: snake_case of the field name
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNamer;

impl Namer for StandardNamer {
    fn ident(&self, _info: ElementInfo<'_>) -> String {
        "id".to_owned()
    }

    fn table(&self, info: ElementInfo<'_>) -> String {
        info.name().to_snake_case()
    }

    fn column(&self, info: ElementInfo<'_>) -> String {
        info.name().to_snake_case()
    }
}

static STANDARD_NAMER: StandardNamer = StandardNamer;

static DEFAULT_NAMER: OnceLock<Arc<dyn Namer>> = OnceLock::new();

/// Installs the process-wide namer used when a transaction carries no namer
/// of its own.
///
/// The default can be set once; later calls hand the rejected namer back.
pub fn set_default_namer(namer: Arc<dyn Namer>) -> Result<(), Arc<dyn Namer>> {
    DEFAULT_NAMER.set(namer)
}

/// The process-wide namer, falling back to [`StandardNamer`] when none was
/// installed.
pub fn default_namer() -> &'static dyn Namer {
    match DEFAULT_NAMER.get() {
        Some(namer) => namer.as_ref(),
        None => &STANDARD_NAMER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names_are_snake_case() {
        let namer = StandardNamer;
        assert_eq!(namer.table(ElementInfo::new("UserAccount")), "user_account");
        assert_eq!(namer.column(ElementInfo::new("FirstName")), "first_name");
        assert_eq!(namer.column(ElementInfo::new("name")), "name");
        assert_eq!(namer.column(ElementInfo::new("UserID")), "user_id");
        assert_eq!(namer.ident(ElementInfo::new("anything")), "id");
    }
}
