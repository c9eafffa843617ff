//! Inheritance-aware signature resolution.
//!
//! A method's effective signature combines its own documented types with the
//! types of the method it overrides. The documented type is only kept where a
//! native hint would still be override-compatible: parameters may widen,
//! return types may narrow. Everything else falls back to the ancestor's type.

use crate::core::types::{FunctionSignature, Type};
use crate::hierarchy::{BuiltinSignatures, ClassHierarchyGraph};
use std::collections::HashSet;

/// Read-only view over the phase-1 graph answering signature queries
pub struct SignatureResolver<'g> {
    graph: &'g ClassHierarchyGraph,
    builtins: &'static BuiltinSignatures,
}

impl<'g> SignatureResolver<'g> {
    pub fn new(graph: &'g ClassHierarchyGraph) -> Self {
        Self {
            graph,
            builtins: BuiltinSignatures::get(),
        }
    }

    /// Effective signature of `class::method`, or `None` when the class is
    /// unknown or nothing in its ancestry documents the method.
    pub fn resolve(&self, class: &str, method: &str) -> Option<FunctionSignature> {
        self.resolve_method(class, method, &mut HashSet::new())
    }

    /// Effective type of a property. Property types are invariant, so the
    /// nearest ancestor that documents the property decides.
    pub fn resolve_property(&self, class: &str, property: &str) -> Option<Type> {
        let mut visiting = HashSet::from([lower(class)]);
        self.ancestor_property(class, property, &mut visiting)
            .or_else(|| self.own_property(class, property))
    }

    fn resolve_method(
        &self,
        class: &str,
        method: &str,
        visiting: &mut HashSet<String>,
    ) -> Option<FunctionSignature> {
        if !self.graph.is_known(class) {
            return None;
        }
        let key = lower(class);
        if !visiting.insert(key.clone()) {
            return None;
        }

        let own = self
            .graph
            .class(class)
            .and_then(|entry| entry.method(method))
            .cloned();
        let result = if method.eq_ignore_ascii_case("__construct") {
            // constructors are not subject to override compatibility
            own
        } else {
            match (own, self.inherited(class, method, visiting)) {
                (Some(own), Some(inherited)) => Some(merge(&own, &inherited)),
                (own, inherited) => own.or(inherited),
            }
        };

        visiting.remove(&key);
        result
    }

    /// First signature found among the parents, in declaration order.
    fn inherited(
        &self,
        class: &str,
        method: &str,
        visiting: &mut HashSet<String>,
    ) -> Option<FunctionSignature> {
        self.graph.parents_of(class).iter().find_map(|parent| {
            if self.graph.is_known(parent) {
                self.resolve_method(parent, method, visiting)
                    .map(|signature| signature.resolved())
            } else {
                self.builtins.signature_of(parent, method)
            }
        })
    }

    fn ancestor_property(
        &self,
        class: &str,
        property: &str,
        visiting: &mut HashSet<String>,
    ) -> Option<Type> {
        self.graph.parents_of(class).iter().find_map(|parent| {
            if !visiting.insert(lower(parent)) {
                return None;
            }
            self.own_property(parent, property)
                .map(|ty| ty.as_resolved())
                .or_else(|| self.ancestor_property(parent, property, visiting))
        })
    }

    fn own_property(&self, class: &str, property: &str) -> Option<Type> {
        self.graph
            .class(class)
            .and_then(|entry| entry.property_types.get(property))
            .cloned()
    }
}

fn lower(class: &str) -> String {
    class.trim_start_matches('\\').to_ascii_lowercase()
}

/// Combine a method's own signature with the one it overrides.
///
/// The result has the child's arity. A parameter keeps the child's type only
/// if the parent's type is a subtype of it; the return keeps the child's type
/// only if it is a subtype of the parent's.
pub fn merge(own: &FunctionSignature, inherited: &FunctionSignature) -> FunctionSignature {
    let param_types = own
        .param_types
        .iter()
        .enumerate()
        .map(|(i, child)| match inherited.param_types.get(i) {
            Some(parent) if child.is_none() || !is_subtype(parent.as_ref(), child.as_ref()) => {
                parent.clone()
            }
            _ => child.clone(),
        })
        .collect();

    let return_type = if is_subtype(own.return_type.as_ref(), inherited.return_type.as_ref()) {
        own.return_type.clone()
    } else {
        inherited.return_type.clone()
    };

    FunctionSignature::new(param_types, return_type)
}

/// Whether a hint `a` may stand where `b` is expected. `None` is unconstrained.
/// Class hints are compared by name only, never through the hierarchy.
pub fn is_subtype(a: Option<&Type>, b: Option<&Type>) -> bool {
    let Some(b) = b else {
        return true;
    };
    let Some(a) = a else {
        return false;
    };
    if a.is_nullable && !b.is_nullable {
        return false;
    }
    if a.resolved_name.eq_ignore_ascii_case(&b.resolved_name) {
        return true;
    }
    if b.is("iterable") {
        return a.is("array");
    }
    if b.is("object") {
        return a.is_class_hint();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ClassEntry;

    fn t(name: &str) -> Option<Type> {
        Some(Type::named(name, false))
    }

    fn nullable(name: &str) -> Option<Type> {
        Some(Type::named(name, true))
    }

    fn sig(params: Vec<Option<Type>>, ret: Option<Type>) -> FunctionSignature {
        FunctionSignature::new(params, ret)
    }

    struct GraphBuilder(ClassHierarchyGraph);

    impl GraphBuilder {
        fn new() -> Self {
            Self(ClassHierarchyGraph::new())
        }

        fn class(mut self, name: &str, parents: &[&str], methods: &[(&str, FunctionSignature)]) -> Self {
            let mut entry = ClassEntry::new(name, parents.first().map(|p| p.to_string()));
            for (method, signature) in methods {
                entry.add_method(method, signature.clone());
            }
            self.0.add_class(entry);
            self.0.add_parents(name, parents.iter().copied());
            self
        }
    }

    #[test]
    fn test_unknown_class_resolves_to_none() {
        let graph = ClassHierarchyGraph::new();
        assert!(SignatureResolver::new(&graph).resolve("Nope", "foo").is_none());
    }

    #[test]
    fn test_undocumented_override_inherits_parent_types() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("foo", sig(vec![t("int")], t("string")))])
            .class("B", &["A"], &[])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("b", "FOO").unwrap();
        assert_eq!(resolved, sig(vec![t("int")], t("string")));
    }

    #[test]
    fn test_incompatible_child_types_fall_back_to_parent() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("foo", sig(vec![t("int"), None], t("string")))])
            .class("B", &["A"], &[("foo", sig(vec![t("float"), t("int"), t("bool")], t("int")))])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("B", "foo").unwrap();
        // a parameter the parent leaves untyped stays untyped, extra ones keep theirs
        assert_eq!(resolved, sig(vec![t("int"), None, t("bool")], t("string")));
    }

    #[test]
    fn test_nullable_variance() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("foo", sig(vec![t("Foo"), nullable("Bar")], nullable("Foo")))])
            .class("B", &["A"], &[("foo", sig(vec![nullable("Foo"), t("Bar")], t("Foo")))])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("B", "foo").unwrap();
        assert_eq!(resolved, sig(vec![nullable("Foo"), nullable("Bar")], t("Foo")));
    }

    #[test]
    fn test_iterable_and_object_widening() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("foo", sig(vec![t("array"), t("Foo")], t("iterable")))])
            .class("B", &["A"], &[("foo", sig(vec![t("iterable"), t("object")], t("array")))])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("B", "foo").unwrap();
        assert_eq!(resolved, sig(vec![t("iterable"), t("object")], t("array")));
    }

    #[test]
    fn test_inherited_relative_types_are_resolved() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("me", sig(vec![], Some(Type::new("self", "A", false))))])
            .class("B", &["A"], &[])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("B", "me").unwrap();
        assert_eq!(resolved.return_type, t("A"));

        let own = SignatureResolver::new(&graph).resolve("A", "me").unwrap();
        assert_eq!(own.return_type.unwrap().declared_name, "self");
    }

    #[test]
    fn test_constructor_ignores_parents() {
        let graph = GraphBuilder::new()
            .class("A", &[], &[("__construct", sig(vec![t("int")], None))])
            .class("B", &["A"], &[("__construct", sig(vec![t("string")], None))])
            .class("C", &["A"], &[])
            .0;
        let resolver = SignatureResolver::new(&graph);
        assert_eq!(resolver.resolve("B", "__construct").unwrap(), sig(vec![t("string")], None));
        assert!(resolver.resolve("C", "__construct").is_none());
    }

    #[test]
    fn test_builtin_parent_constrains_parameters() {
        let graph = GraphBuilder::new()
            .class("Coll", &["ArrayAccess"], &[("offsetGet", sig(vec![t("int")], t("string")))])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("Coll", "offsetGet").unwrap();
        assert_eq!(resolved, sig(vec![None], t("string")));
    }

    #[test]
    fn test_first_documented_parent_wins() {
        let graph = GraphBuilder::new()
            .class("I", &[], &[])
            .class("J", &[], &[("foo", sig(vec![t("int")], None))])
            .class("C", &["I", "J"], &[])
            .0;
        let resolved = SignatureResolver::new(&graph).resolve("C", "foo").unwrap();
        assert_eq!(resolved, sig(vec![t("int")], None));
    }

    #[test]
    fn test_cycles_terminate() {
        let graph = GraphBuilder::new()
            .class("A", &["B"], &[("foo", sig(vec![t("int")], None))])
            .class("B", &["A"], &[])
            .0;
        let resolver = SignatureResolver::new(&graph);
        assert_eq!(resolver.resolve("A", "foo").unwrap(), sig(vec![t("int")], None));
        assert_eq!(resolver.resolve("B", "foo").unwrap(), sig(vec![t("int")], None));
        assert!(resolver.resolve_property("A", "x").is_none());
    }

    #[test]
    fn test_property_type_nearest_ancestor_wins() {
        let mut graph = GraphBuilder::new()
            .class("Root", &[], &[])
            .class("Mid", &["Root"], &[])
            .class("Leaf", &["Mid"], &[])
            .0;
        let mut root = graph.class("Root").unwrap().clone();
        root.property_types.insert("x".into(), Type::new("self", "Root", false));
        graph.add_class(root);
        let mut mid = graph.class("Mid").unwrap().clone();
        mid.property_types.insert("x".into(), Type::named("int", false));
        graph.add_class(mid);
        let mut leaf = graph.class("Leaf").unwrap().clone();
        leaf.property_types.insert("x".into(), Type::named("string", false));
        leaf.property_types.insert("y".into(), Type::named("float", false));
        graph.add_class(leaf);

        let resolver = SignatureResolver::new(&graph);
        assert_eq!(resolver.resolve_property("Leaf", "x"), t("int"));
        assert_eq!(resolver.resolve_property("Leaf", "y"), t("float"));
        assert_eq!(resolver.resolve_property("Mid", "x"), t("Root"));
        assert!(resolver.resolve_property("Leaf", "z").is_none());
    }

    #[test]
    fn test_subtype_rules() {
        assert!(is_subtype(None, None));
        assert!(is_subtype(t("int").as_ref(), None));
        assert!(!is_subtype(None, t("int").as_ref()));
        assert!(!is_subtype(nullable("int").as_ref(), t("int").as_ref()));
        assert!(is_subtype(t("int").as_ref(), nullable("int").as_ref()));
        assert!(is_subtype(t("Foo").as_ref(), t("foo").as_ref()));
        assert!(!is_subtype(t("Child").as_ref(), t("Base").as_ref()));
        assert!(is_subtype(t("array").as_ref(), t("iterable").as_ref()));
        assert!(!is_subtype(t("iterable").as_ref(), t("array").as_ref()));
        assert!(is_subtype(t("Foo").as_ref(), t("object").as_ref()));
        assert!(!is_subtype(t("int").as_ref(), t("object").as_ref()));
    }
}
