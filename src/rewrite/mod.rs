//! Per-file rewrite passes.
//!
//! [`add_hints`] turns resolved documentation types into native hints and
//! [`strip_hints`] removes the hints a PHP 5 runtime would reject. Both only
//! record edits on a [`TextPatcher`](crate::patch::TextPatcher) and render
//! once at the end.

mod inserter;
mod stripper;

pub use inserter::add_hints;
pub use stripper::strip_hints;

use crate::core::errors::{Error, Result};
use crate::core::types::Type;
use crate::names::NameResolver;
use crate::syntax::FunctionLike;
use std::path::Path;

/// How a type is written at the current point of the file.
pub fn display_name(ty: &Type, names: &NameResolver) -> String {
    let name = if ty.is_class_hint() && !ty.is_relative() {
        names.shortest_name(&ty.declared_name)
    } else {
        ty.declared_name.clone()
    };
    if ty.is_nullable {
        format!("?{name}")
    } else {
        name
    }
}

/// Offset right after the `)` closing a function's signature.
fn after_params(function: &FunctionLike, path: &Path) -> Result<usize> {
    function.signature_end.ok_or_else(|| Error::MissingDelimiter {
        path: path.to_path_buf(),
        offset: function.start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::UseImport;
    use crate::syntax::UseKind;

    #[test]
    fn test_display_name_forms() {
        let mut names = NameResolver::new();
        names.enter_namespace(Some("App"));
        names.add_import(&UseImport {
            kind: UseKind::Class,
            name: "Lib\\Collection".into(),
            alias: "Collection".into(),
        });

        assert_eq!(display_name(&Type::named("int", true), &names), "?int");
        assert_eq!(display_name(&Type::new("self", "App\\Model", false), &names), "self");
        assert_eq!(display_name(&Type::named("App\\Model", false), &names), "Model");
        assert_eq!(display_name(&Type::named("Lib\\Collection", true), &names), "?Collection");
        assert_eq!(display_name(&Type::named("Other", false), &names), "\\Other");
    }
}
