use super::{after_params, display_name};
use crate::config::HintOptions;
use crate::core::errors::Result;
use crate::core::types::{FunctionSignature, Type};
use crate::docblock::{is_inherited_doc, DocblockTypeParser};
use crate::hierarchy::class_key;
use crate::names::NameResolver;
use crate::patch::TextPatcher;
use crate::resolver::SignatureResolver;
use crate::syntax::{ClassLike, FunctionKind, FunctionLike, Node, Property, SyntaxTree};
use std::path::Path;
use tracing::debug;

/// Insert native hints for every documented position that can take one.
///
/// Methods use the inheritance-merged signature; free functions, closures
/// and arrow functions use their own doc comment.
pub fn add_hints(
    source: &str,
    tree: &SyntaxTree,
    path: &Path,
    resolver: &SignatureResolver<'_>,
    options: &HintOptions,
) -> Result<String> {
    let mut inserter = AnnotationInserter {
        path,
        resolver,
        options,
        names: NameResolver::new(),
        classes: Vec::new(),
        patcher: TextPatcher::new(source),
    };

    if options.strict_types && !tree.has_strict_types {
        if let Some(offset) = tree.strict_types_offset() {
            inserter
                .patcher
                .insert(offset, " declare(strict_types=1);");
        }
    }

    inserter.walk(&tree.nodes)?;
    debug!(
        path = %path.display(),
        edits = inserter.patcher.edit_count(),
        "Planned hint insertions"
    );
    Ok(inserter.patcher.render()?)
}

struct AnnotationInserter<'a, 'r> {
    path: &'a Path,
    resolver: &'a SignatureResolver<'r>,
    options: &'a HintOptions,
    names: NameResolver,
    /// Keys of the enclosing class-likes, innermost last
    classes: Vec<String>,
    patcher: TextPatcher<'a>,
}

impl AnnotationInserter<'_, '_> {
    fn walk(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Namespace { name, body } => {
                    self.names.enter_namespace(name.as_deref());
                    if let Some(body) = body {
                        self.walk(body)?;
                        self.names.enter_namespace(None);
                    }
                }
                Node::Use(imports) => imports.iter().for_each(|i| self.names.add_import(i)),
                Node::ClassLike(class) => self.enter_class(class)?,
                Node::FunctionLike(function) => self.enter_function(function)?,
                Node::Property(property) => self.enter_property(property),
                Node::TraitUse(_) => {}
            }
        }
        Ok(())
    }

    fn enter_class(&mut self, class: &ClassLike) -> Result<()> {
        self.classes.push(class_key(class, &self.names, self.path));
        let result = self.walk(&class.members);
        self.classes.pop();
        result
    }

    fn enter_function(&mut self, function: &FunctionLike) -> Result<()> {
        if let Some(signature) = self.signature_for(function) {
            self.hint_params(function, &signature);
            self.hint_return(function, &signature)?;
        }
        self.walk(&function.body)
    }

    fn signature_for(&self, function: &FunctionLike) -> Option<FunctionSignature> {
        if function.kind == FunctionKind::Method {
            let class = self.classes.last()?;
            return self.resolver.resolve(class, function.name.as_deref()?);
        }
        let doc = function
            .doc_comment
            .as_deref()
            .filter(|doc| !is_inherited_doc(doc))?;
        Some(DocblockTypeParser::new(&self.names).extract_signature(&function.params, doc, None))
    }

    fn hint_params(&mut self, function: &FunctionLike, signature: &FunctionSignature) {
        for (i, param) in function.params.iter().enumerate() {
            if param.type_hint.is_some() {
                continue;
            }
            let Some(ty) = signature.param(i) else {
                continue;
            };

            let ty = if !ty.is_nullable {
                ty.clone()
            } else if param.default_is_null {
                // `T $x = null` already accepts null
                ty.as_not_nullable()
            } else if self.options.nullable_types {
                ty.clone()
            } else {
                continue;
            };

            if !self.is_supported(&ty) {
                continue;
            }
            let hint = format!("{} ", display_name(&ty, &self.names));
            self.patcher.insert(param.hint_offset, hint);
        }
    }

    fn hint_return(&mut self, function: &FunctionLike, signature: &FunctionSignature) -> Result<()> {
        if function.return_type.is_some() {
            return Ok(());
        }
        let Some(ty) = &signature.return_type else {
            return Ok(());
        };
        if ty.is_nullable && !self.options.nullable_types {
            return Ok(());
        }
        if !self.is_supported(ty) {
            return Ok(());
        }

        let position = after_params(function, self.path)?;
        let hint = format!(" : {}", display_name(ty, &self.names));
        self.patcher.insert(position, hint);
        Ok(())
    }

    fn enter_property(&mut self, property: &Property) {
        if !self.options.property_types || property.type_hint.is_some() {
            return;
        }
        let [element] = property.elements.as_slice() else {
            return;
        };
        let Some(class) = self.classes.last() else {
            return;
        };
        let Some(ty) = self.resolver.resolve_property(class, &element.name) else {
            return;
        };
        // typed properties cannot be callable
        if ty.is("callable") || !self.is_supported(&ty) {
            return;
        }
        let hint = format!("{} ", display_name(&ty, &self.names));
        self.patcher.insert(element.start, hint);
    }

    /// `iterable` and `object` need their own language level; `self` and
    /// `parent` need an enclosing class.
    fn is_supported(&self, ty: &Type) -> bool {
        if ty.is_relative() && self.classes.is_empty() {
            return false;
        }
        if ty.is("iterable") {
            return self.options.iterable;
        }
        if ty.is("object") {
            return self.options.object;
        }
        true
    }
}
