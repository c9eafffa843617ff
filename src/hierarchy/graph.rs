use crate::core::types::{FunctionSignature, Type};
use std::collections::HashMap;

/// Everything the analysis pass learned about one class-like declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassEntry {
    /// Fully-qualified name in declared case, or a synthetic anonymous key
    pub key: String,
    /// The `extends` target of a class, used to resolve `parent`
    pub declared_parent: Option<String>,
    /// Keyed by lowercased method name
    pub method_signatures: HashMap<String, FunctionSignature>,
    pub property_types: HashMap<String, Type>,
}

impl ClassEntry {
    pub fn new(key: impl Into<String>, declared_parent: Option<String>) -> Self {
        Self {
            key: key.into(),
            declared_parent,
            ..Self::default()
        }
    }

    pub fn method(&self, name: &str) -> Option<&FunctionSignature> {
        self.method_signatures.get(&name.to_ascii_lowercase())
    }

    pub fn add_method(&mut self, name: &str, signature: FunctionSignature) {
        self.method_signatures
            .insert(name.to_ascii_lowercase(), signature);
    }
}

/// Whole-codebase record of class entries and parent edges.
///
/// Built once by the analysis pass and read-only afterwards. Class and
/// method lookups are case-insensitive; stored names keep their case.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchyGraph {
    classes: HashMap<String, ClassEntry>,
    parents: HashMap<String, Vec<String>>,
}

impl ClassHierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class entry. A later declaration under the same name replaces
    /// the earlier one.
    pub fn add_class(&mut self, entry: ClassEntry) -> Option<ClassEntry> {
        self.classes.insert(lookup_key(&entry.key), entry)
    }

    /// Append parents to a class's edge list, skipping duplicates.
    ///
    /// Also marks the class as known even when `parents` is empty.
    pub fn add_parents<I, S>(&mut self, class: &str, parents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let edges = self.parents.entry(lookup_key(class)).or_default();
        for parent in parents {
            let parent = parent.into();
            if !edges.iter().any(|p| p.eq_ignore_ascii_case(&parent)) {
                edges.push(parent);
            }
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(&lookup_key(name))
    }

    /// Declared parents, in declaration order, including trait pseudo-parents.
    pub fn parents_of(&self, name: &str) -> &[String] {
        self.parents
            .get(&lookup_key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the name took part in the analysis at all.
    pub fn is_known(&self, name: &str) -> bool {
        self.parents.contains_key(&lookup_key(name))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.values()
    }
}

fn lookup_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}
