use super::graph::{ClassEntry, ClassHierarchyGraph};
use super::class_key;
use crate::docblock::{is_inherited_doc, DocblockTypeParser, EnclosingClass};
use crate::names::NameResolver;
use crate::syntax::{ClassKind, ClassLike, FunctionKind, FunctionLike, Node, Property, SyntaxTree, TraitUse};
use std::path::Path;
use tracing::debug;

/// Class entries and parent edges found in one file.
///
/// Files are collected independently and merged into the graph in a fixed
/// order, so the graph does not depend on collection order.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub classes: Vec<ClassEntry>,
    pub parent_edges: Vec<(String, Vec<String>)>,
}

/// Walk one file and record its class-like declarations.
pub fn collect_file(path: &Path, tree: &SyntaxTree) -> FileFacts {
    let mut collector = Collector {
        path,
        names: NameResolver::new(),
        stack: Vec::new(),
        facts: FileFacts::default(),
    };
    collector.walk(&tree.nodes);
    collector.facts
}

impl ClassHierarchyGraph {
    pub fn merge_facts(&mut self, facts: FileFacts) {
        for entry in facts.classes {
            if let Some(previous) = self.add_class(entry) {
                debug!(class = %previous.key, "Class declared twice, keeping the later declaration");
            }
        }
        for (class, parents) in facts.parent_edges {
            self.add_parents(&class, parents);
        }
    }

    /// Build a graph from already parsed files, in the given order.
    pub fn from_trees<'a, I>(trees: I) -> Self
    where
        I: IntoIterator<Item = (&'a Path, &'a SyntaxTree)>,
    {
        let mut graph = Self::new();
        for (path, tree) in trees {
            graph.merge_facts(collect_file(path, tree));
        }
        graph
    }
}

struct Frame {
    entry: ClassEntry,
    parents: Vec<String>,
}

impl Frame {
    fn enclosing(&self) -> EnclosingClass<'_> {
        EnclosingClass {
            name: &self.entry.key,
            parent: self.entry.declared_parent.as_deref(),
        }
    }
}

struct Collector<'p> {
    path: &'p Path,
    names: NameResolver,
    stack: Vec<Frame>,
    facts: FileFacts,
}

impl Collector<'_> {
    fn walk(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Namespace { name, body } => {
                    self.names.enter_namespace(name.as_deref());
                    if let Some(body) = body {
                        self.walk(body);
                        self.names.enter_namespace(None);
                    }
                }
                Node::Use(imports) => imports.iter().for_each(|i| self.names.add_import(i)),
                Node::ClassLike(class) => self.enter_class(class),
                Node::FunctionLike(function) => self.enter_function(function),
                Node::Property(property) => self.enter_property(property),
                Node::TraitUse(trait_use) => self.enter_trait_use(trait_use),
            }
        }
    }

    fn enter_class(&mut self, class: &ClassLike) {
        let key = class_key(class, &self.names, self.path);
        let resolve = |names: &[String]| -> Vec<String> {
            names
                .iter()
                .map(|name| self.names.resolve_class_name(name))
                .collect()
        };
        let extends = resolve(&class.extends);
        let implements = resolve(&class.implements);

        let declared_parent = match class.kind {
            ClassKind::Class | ClassKind::Anonymous => extends.first().cloned(),
            ClassKind::Interface | ClassKind::Trait | ClassKind::Enum => None,
        };
        let parents = match class.kind {
            ClassKind::Class | ClassKind::Anonymous => {
                extends.into_iter().take(1).chain(implements).collect()
            }
            ClassKind::Interface => extends,
            ClassKind::Enum => implements,
            ClassKind::Trait => Vec::new(),
        };

        self.stack.push(Frame {
            entry: ClassEntry::new(key, declared_parent),
            parents,
        });
        self.walk(&class.members);
        if let Some(frame) = self.stack.pop() {
            self.facts
                .parent_edges
                .push((frame.entry.key.clone(), frame.parents));
            self.facts.classes.push(frame.entry);
        }
    }

    fn enter_function(&mut self, function: &FunctionLike) {
        if function.kind == FunctionKind::Method {
            self.record_method(function);
        }
        self.walk(&function.body);
    }

    fn record_method(&mut self, method: &FunctionLike) {
        let (Some(name), Some(doc)) = (&method.name, &method.doc_comment) else {
            return;
        };
        // an inherited comment says nothing on its own
        if is_inherited_doc(doc) {
            return;
        }
        let Some(frame) = self.stack.last() else {
            return;
        };
        let signature = DocblockTypeParser::new(&self.names).extract_signature(
            &method.params,
            doc,
            Some(frame.enclosing()),
        );
        if let Some(frame) = self.stack.last_mut() {
            frame.entry.add_method(name, signature);
        }
    }

    fn enter_property(&mut self, property: &Property) {
        let ([element], Some(doc)) = (property.elements.as_slice(), &property.doc_comment) else {
            return;
        };
        let Some(frame) = self.stack.last() else {
            return;
        };
        let property_type = DocblockTypeParser::new(&self.names)
            .extract_property_type(doc, Some(frame.enclosing()));
        if let (Some(ty), Some(frame)) = (property_type, self.stack.last_mut()) {
            frame.entry.property_types.insert(element.name.clone(), ty);
        }
    }

    /// A trait must satisfy whatever the using class's parents require, so
    /// those parents become pseudo-parents of the trait.
    fn enter_trait_use(&mut self, trait_use: &TraitUse) {
        let Some(frame) = self.stack.last() else {
            return;
        };
        for name in &trait_use.names {
            let trait_key = self.names.resolve_class_name(name);
            self.facts
                .parent_edges
                .push((trait_key, frame.parents.clone()));
        }
    }
}
