use super::{
    ClassKind, ClassLike, FunctionKind, FunctionLike, Node, Param, ParseFailure, Property,
    PropertyElement, Span, SyntaxTree, TraitUse, TypeHint, UseImport, UseKind,
};
use tree_sitter::{Node as TsNode, Parser};

const NAME_KINDS: &[&str] = &["name", "qualified_name", "namespace_name"];

/// Parse PHP source into a [`SyntaxTree`].
///
/// tree-sitter recovers from errors, so any `ERROR` or `MISSING` node is
/// reported as a failure instead of rewriting a half-understood file.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseFailure> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| ParseFailure {
            message: format!("Failed to set PHP language: {e}"),
            line: 0,
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| ParseFailure {
        message: "Parser produced no tree".to_string(),
        line: 0,
    })?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(describe_error(root));
    }

    let lowering = Lowering { source };
    let top_level = named_children(root);

    let open_tag = top_level
        .iter()
        .find(|n| n.kind() == "php_tag")
        .map(|n| Span::new(n.start_byte(), n.end_byte()));
    let has_strict_types = top_level.iter().any(|n| {
        n.kind() == "declare_statement"
            && lowering.text(*n).to_ascii_lowercase().contains("strict_types")
    });

    Ok(SyntaxTree {
        open_tag,
        shebang_end: shebang_end(source),
        has_strict_types,
        nodes: lowering.lower_children(root),
    })
}

fn shebang_end(source: &str) -> Option<usize> {
    if !source.starts_with("#!") {
        return None;
    }
    source.find('\n').map(|newline| newline + 1)
}

fn describe_error(root: TsNode) -> ParseFailure {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let message = if node.is_missing() {
                format!("Syntax error, missing {}", node.kind())
            } else {
                "Syntax error".to_string()
            };
            return ParseFailure {
                message,
                line: node.start_position().row + 1,
            };
        }
        // depth-first, left to right
        let mut kids = children(node);
        kids.retain(|child| child.has_error());
        stack.extend(kids.into_iter().rev());
    }
    ParseFailure {
        message: "Syntax error".to_string(),
        line: root.start_position().row + 1,
    }
}

fn children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn child_of_kind<'t>(node: TsNode<'t>, kinds: &[&str]) -> Option<TsNode<'t>> {
    named_children(node)
        .into_iter()
        .find(|child| kinds.contains(&child.kind()))
}

struct Lowering<'s> {
    source: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn lower_children(&self, node: TsNode) -> Vec<Node> {
        let mut out = Vec::new();
        for child in named_children(node) {
            self.visit(child, &mut out);
        }
        out
    }

    fn visit(&self, node: TsNode, out: &mut Vec<Node>) {
        match node.kind() {
            "comment" | "php_tag" | "text" => {}
            "namespace_definition" => out.push(self.lower_namespace(node)),
            "namespace_use_declaration" => out.push(Node::Use(self.lower_use(node))),
            "class_declaration" => out.push(self.lower_class(node, ClassKind::Class)),
            "interface_declaration" => out.push(self.lower_class(node, ClassKind::Interface)),
            "trait_declaration" => out.push(self.lower_class(node, ClassKind::Trait)),
            "enum_declaration" => out.push(self.lower_class(node, ClassKind::Enum)),
            "anonymous_class" | "anonymous_class_creation_expression" => {
                out.push(self.lower_class(node, ClassKind::Anonymous))
            }
            // older grammars inline the anonymous class into `new`
            "object_creation_expression"
                if child_of_kind(node, &["declaration_list"]).is_some() =>
            {
                out.push(self.lower_class(node, ClassKind::Anonymous))
            }
            "function_definition" => out.push(self.lower_function(node, FunctionKind::Function)),
            "method_declaration" => out.push(self.lower_function(node, FunctionKind::Method)),
            "anonymous_function" | "anonymous_function_creation_expression" => {
                out.push(self.lower_function(node, FunctionKind::Closure))
            }
            "arrow_function" => out.push(self.lower_function(node, FunctionKind::ArrowFunction)),
            "property_declaration" => out.push(Node::Property(self.lower_property(node))),
            "use_declaration" => out.push(Node::TraitUse(self.lower_trait_use(node))),
            _ => {
                for child in named_children(node) {
                    self.visit(child, out);
                }
            }
        }
    }

    fn lower_namespace(&self, node: TsNode) -> Node {
        let name = node
            .child_by_field_name("name")
            .or_else(|| child_of_kind(node, &["namespace_name"]))
            .map(|n| self.text(n).trim_start_matches('\\').to_string());
        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, &["compound_statement"]))
            .map(|b| self.lower_children(b));
        Node::Namespace { name, body }
    }

    fn use_kind(&self, node: TsNode) -> Option<UseKind> {
        let marker = node
            .child_by_field_name("type")
            .map(|n| self.text(n))
            .or_else(|| {
                children(node)
                    .into_iter()
                    .map(|child| self.text(child))
                    .find(|text| {
                        text.eq_ignore_ascii_case("function") || text.eq_ignore_ascii_case("const")
                    })
            })?;
        if marker.eq_ignore_ascii_case("function") {
            Some(UseKind::Function)
        } else if marker.eq_ignore_ascii_case("const") {
            Some(UseKind::Const)
        } else {
            None
        }
    }

    fn collect_use_clauses<'t>(&self, node: TsNode<'t>, clauses: &mut Vec<TsNode<'t>>) {
        for child in named_children(node) {
            match child.kind() {
                "namespace_use_clause" | "namespace_use_group_clause" => clauses.push(child),
                _ => self.collect_use_clauses(child, clauses),
            }
        }
    }

    fn lower_use(&self, node: TsNode) -> Vec<UseImport> {
        let declared_kind = self.use_kind(node).unwrap_or(UseKind::Class);
        let prefix = child_of_kind(node, &["namespace_name"])
            .map(|n| self.text(n).trim_matches('\\').to_string());

        let mut clauses = Vec::new();
        self.collect_use_clauses(node, &mut clauses);

        clauses
            .into_iter()
            .filter_map(|clause| {
                let alias_node = clause.child_by_field_name("alias").or_else(|| {
                    child_of_kind(clause, &["namespace_aliasing_clause"])
                        .and_then(|aliasing| child_of_kind(aliasing, &["name"]))
                });
                let alias_id = alias_node.map(|n| n.id());
                let name_node = named_children(clause)
                    .into_iter()
                    .find(|n| NAME_KINDS.contains(&n.kind()) && Some(n.id()) != alias_id)?;

                let name = self.text(name_node).trim_start_matches('\\');
                let name = match &prefix {
                    Some(prefix) => format!("{prefix}\\{name}"),
                    None => name.to_string(),
                };
                let alias = match alias_node {
                    Some(alias) => self.text(alias).to_string(),
                    None => name.rsplit('\\').next().unwrap_or(&name).to_string(),
                };
                Some(UseImport {
                    kind: self.use_kind(clause).unwrap_or(declared_kind),
                    name,
                    alias,
                })
            })
            .collect()
    }

    fn names_in(&self, clause: Option<TsNode>) -> Vec<String> {
        clause
            .map(|clause| {
                named_children(clause)
                    .into_iter()
                    .filter(|n| NAME_KINDS.contains(&n.kind()))
                    .map(|n| self.text(n).to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lower_class(&self, node: TsNode, kind: ClassKind) -> Node {
        let name = match kind {
            ClassKind::Anonymous => None,
            _ => node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
        };
        let extends = self.names_in(child_of_kind(node, &["base_clause"]));
        let implements = self.names_in(child_of_kind(node, &["class_interface_clause"]));
        let members = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, &["declaration_list", "enum_declaration_list"]))
            .map(|body| self.lower_children(body))
            .unwrap_or_default();

        Node::ClassLike(ClassLike {
            kind,
            name,
            start: node.start_byte(),
            extends,
            implements,
            members,
        })
    }

    fn lower_function(&self, node: TsNode, kind: FunctionKind) -> Node {
        let name = match kind {
            FunctionKind::Function | FunctionKind::Method => node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            FunctionKind::Closure | FunctionKind::ArrowFunction => None,
        };
        let parameters = node
            .child_by_field_name("parameters")
            .or_else(|| child_of_kind(node, &["formal_parameters"]));
        let params = parameters
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|p| {
                        matches!(
                            p.kind(),
                            "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
                        )
                    })
                    .map(|p| self.lower_param(p))
                    .collect()
            })
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .map(|body| {
                let mut out = Vec::new();
                self.visit(body, &mut out);
                out
            })
            .unwrap_or_default();

        Node::FunctionLike(FunctionLike {
            kind,
            name,
            start: node.start_byte(),
            doc_comment: self.doc_comment(node),
            params,
            signature_end: child_of_kind(node, &["anonymous_function_use_clause"])
                .or(parameters)
                .map(|n| n.end_byte()),
            return_type: node
                .child_by_field_name("return_type")
                .map(|n| self.type_hint(n)),
            body,
        })
    }

    fn lower_param(&self, node: TsNode) -> Param {
        let name_node = node.child_by_field_name("name");
        let variable = name_node.and_then(|n| {
            if n.kind() == "variable_name" {
                Some(n)
            } else {
                child_of_kind(n, &["variable_name"])
            }
        });
        let type_node = node.child_by_field_name("type");
        let hint_offset = children(node)
            .into_iter()
            .find(|child| {
                matches!(
                    child.kind(),
                    "reference_modifier" | "..." | "&" | "variable_name" | "by_ref"
                ) || Some(child.id()) == name_node.map(|n| n.id())
            })
            .map(|child| child.start_byte())
            .or_else(|| type_node.map(|t| t.end_byte()))
            .unwrap_or(node.start_byte());
        let default = node.child_by_field_name("default_value");

        Param {
            name: variable
                .map(|v| self.text(v).trim_start_matches('$').to_string())
                .unwrap_or_default(),
            span: Span::new(node.start_byte(), node.end_byte()),
            hint_offset,
            type_hint: type_node.map(|t| self.type_hint(t)),
            default_is_null: default.is_some_and(|d| {
                self.text(d)
                    .trim()
                    .trim_start_matches('\\')
                    .eq_ignore_ascii_case("null")
            }),
        }
    }

    fn type_hint(&self, node: TsNode) -> TypeHint {
        TypeHint {
            span: Span::new(node.start_byte(), node.end_byte()),
            text: self.text(node).to_string(),
            next_token: node
                .next_sibling()
                .map_or(node.end_byte(), |next| next.start_byte()),
        }
    }

    fn lower_property(&self, node: TsNode) -> Property {
        let elements = named_children(node)
            .into_iter()
            .filter(|n| n.kind() == "property_element")
            .filter_map(|element| {
                let variable = if element.kind() == "variable_name" {
                    Some(element)
                } else {
                    child_of_kind(element, &["variable_name"])
                }?;
                Some(PropertyElement {
                    name: self.text(variable).trim_start_matches('$').to_string(),
                    start: variable.start_byte(),
                })
            })
            .collect();

        Property {
            doc_comment: self.doc_comment(node),
            type_hint: node.child_by_field_name("type").map(|n| self.type_hint(n)),
            elements,
        }
    }

    fn lower_trait_use(&self, node: TsNode) -> TraitUse {
        TraitUse {
            names: self.names_in(Some(node)),
        }
    }

    /// Closest `/** */` comment among the comments directly preceding `node`.
    fn doc_comment(&self, node: TsNode) -> Option<String> {
        let mut sibling = node.prev_sibling();
        while let Some(comment) = sibling.filter(|s| s.kind() == "comment") {
            let text = self.text(comment);
            if text.starts_with("/**") {
                return Some(text.to_string());
            }
            sibling = comment.prev_sibling();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn functions(nodes: &[Node]) -> Vec<&FunctionLike> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                Node::FunctionLike(f) => {
                    out.push(f);
                    out.extend(functions(&f.body));
                }
                Node::ClassLike(c) => out.extend(functions(&c.members)),
                Node::Namespace {
                    body: Some(body), ..
                } => out.extend(functions(body)),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_parse_function_params_and_doc_comment() {
        let source = indoc! {r#"
            <?php
            /** @param int $a */
            function add($a, &$b = null, ...$rest) {}
        "#};
        let tree = parse(source).unwrap();
        let funcs = functions(&tree.nodes);
        assert_eq!(funcs.len(), 1);
        let add = funcs[0];
        assert_eq!(add.kind, FunctionKind::Function);
        assert_eq!(add.name.as_deref(), Some("add"));
        assert_eq!(add.doc_comment.as_deref(), Some("/** @param int $a */"));

        let names: Vec<_> = add.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "rest"]);
        assert!(add.params[1].default_is_null);
        assert_eq!(&source[add.params[1].hint_offset..][..3], "&$b");
        assert_eq!(&source[add.params[2].hint_offset..][..7], "...$res");
        assert!(source[..add.signature_end.unwrap()].ends_with("...$rest)"));
    }

    #[test]
    fn test_parse_existing_hints() {
        let source = "<?php function f(?int $a, Foo $b): string {}";
        let tree = parse(source).unwrap();
        let f = functions(&tree.nodes)[0];
        let hint = f.params[0].type_hint.as_ref().unwrap();
        assert_eq!(hint.text, "?int");
        assert!(hint.is_nullable());
        assert_eq!(&source[hint.next_token..][..2], "$a");
        assert_eq!(f.return_type.as_ref().unwrap().text, "string");
    }

    #[test]
    fn test_parse_class_hierarchy_and_members() {
        let source = indoc! {r#"
            <?php
            namespace App;
            use Lib\Base as B, Lib\Contract;
            class Child extends B implements Contract, \Countable {
                use Helpers;
                /** @var int */
                public $count;
                public function count() {}
            }
        "#};
        let tree = parse(source).unwrap();
        assert!(matches!(
            &tree.nodes[0],
            Node::Namespace { name: Some(n), body: None } if n == "App"
        ));
        let Node::Use(imports) = &tree.nodes[1] else {
            panic!("expected use statement, got {:?}", tree.nodes[1]);
        };
        assert_eq!(imports[0].name, "Lib\\Base");
        assert_eq!(imports[0].alias, "B");
        assert_eq!(imports[1].alias, "Contract");

        let Node::ClassLike(class) = &tree.nodes[2] else {
            panic!("expected class, got {:?}", tree.nodes[2]);
        };
        assert_eq!(class.name.as_deref(), Some("Child"));
        assert_eq!(class.extends, ["B"]);
        assert_eq!(class.implements, ["Contract", "\\Countable"]);
        assert!(matches!(&class.members[0], Node::TraitUse(t) if t.names == ["Helpers"]));
        let Node::Property(prop) = &class.members[1] else {
            panic!("expected property, got {:?}", class.members[1]);
        };
        assert_eq!(prop.elements.len(), 1);
        assert_eq!(prop.elements[0].name, "count");
        assert_eq!(prop.doc_comment.as_deref(), Some("/** @var int */"));
    }

    #[test]
    fn test_parse_group_use() {
        let source = "<?php use Lib\\{Foo, Bar as Baz};";
        let tree = parse(source).unwrap();
        let Node::Use(imports) = &tree.nodes[0] else {
            panic!("expected use statement");
        };
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].name, "Lib\\Foo");
        assert_eq!(imports[1].name, "Lib\\Bar");
        assert_eq!(imports[1].alias, "Baz");
    }

    #[test]
    fn test_parse_nested_closure_and_anonymous_class() {
        let source = indoc! {r#"
            <?php
            class A {
                public function make() {
                    $f = function ($x) { return $x; };
                    return new class extends A {};
                }
            }
        "#};
        let tree = parse(source).unwrap();
        let Node::ClassLike(class) = &tree.nodes[0] else {
            panic!("expected class");
        };
        let Node::FunctionLike(make) = &class.members[0] else {
            panic!("expected method");
        };
        assert!(matches!(&make.body[0], Node::FunctionLike(f) if f.kind == FunctionKind::Closure));
        assert!(matches!(
            &make.body[1],
            Node::ClassLike(c) if c.kind == ClassKind::Anonymous && c.extends == ["A"]
        ));
    }

    #[test]
    fn test_signature_end_ignores_parentheses_in_comments() {
        let source = "<?php function f($a /* ) */, #[Attr(1)] $b /* (b) */): int {}";
        let parsed = parse(source).unwrap();
        let f = functions(&parsed.nodes)[0];
        assert_eq!(&source[f.signature_end.unwrap()..], ": int {}");

        let source = "<?php $f = function ($x) use ($y /* ) */) {};";
        let parsed = parse(source).unwrap();
        let f = functions(&parsed.nodes)[0];
        assert_eq!(&source[f.signature_end.unwrap()..], " {};");
    }

    #[test]
    fn test_strict_types_detection() {
        let tree = parse("<?php declare(strict_types=1);\nfunction f() {}").unwrap();
        assert!(tree.has_strict_types);
        let tree = parse("<?php\nfunction f() {}").unwrap();
        assert!(!tree.has_strict_types);
        assert_eq!(tree.strict_types_offset(), Some(5));
    }

    #[test]
    fn test_leading_inline_html_disables_strict_types_offset() {
        let tree = parse("<html>\n<?php echo 1;").unwrap();
        assert_eq!(tree.strict_types_offset(), None);
    }

    #[test]
    fn test_shebang_line_keeps_strict_types_offset() {
        let source = "#!/usr/bin/env php\n<?php\necho 1;";
        let tree = parse(source).unwrap();
        assert_eq!(tree.shebang_end, Some(19));
        assert_eq!(tree.strict_types_offset(), Some(24));

        let tree = parse("#!/usr/bin/env php\n\n<?php\necho 1;").unwrap();
        assert_eq!(tree.strict_types_offset(), None);
    }

    #[test]
    fn test_syntax_error_is_reported_with_line() {
        let failure = parse("<?php\nfunction f( {\n").unwrap_err();
        assert!(failure.line >= 2, "{failure}");
        assert!(failure.message.starts_with("Syntax error"));
    }
}
