//! Cross-file class hierarchy.
//!
//! The analysis pass records every class-like declaration with its documented
//! method signatures, property types and parent edges. Traits receive the
//! parents of every class that uses them as pseudo-parents.

mod builtins;
mod collector;
mod graph;

pub use builtins::BuiltinSignatures;
pub use collector::{collect_file, FileFacts};
pub use graph::{ClassEntry, ClassHierarchyGraph};

use crate::names::NameResolver;
use crate::syntax::ClassLike;
use std::path::Path;

/// Graph key of a class-like declaration.
///
/// Named declarations use their namespaced name. Anonymous classes get a key
/// built from the file and the byte offset of the `class` keyword, stable
/// across both passes.
pub fn class_key(class: &ClassLike, names: &NameResolver, path: &Path) -> String {
    match (&class.name, names.namespace()) {
        (Some(name), Some(namespace)) => format!("{namespace}\\{name}"),
        (Some(name), None) => name.clone(),
        (None, _) => format!("class@anonymous/{}:{}", path.display(), class.start),
    }
}
