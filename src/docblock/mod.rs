//! Doc-comment type extraction.
//!
//! Turns `@param`, `@return` and `@var` tags into [`Type`]s. Doc comments
//! are informal, so anything this parser does not fully understand yields
//! `None`, which every caller treats as "leave this position alone".

use crate::core::types::{is_relative_name, FunctionSignature, Type};
use crate::names::NameResolver;
use crate::syntax::Param;
use once_cell::sync::Lazy;
use regex::Regex;

static PARAM_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@param\s+(\S+)\s+(?:&\s*)?(?:\.\.\.)?\$(\w+)").unwrap());
static RETURN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@return\s+(\S+)").unwrap());
static VAR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"@var\s+(\S+)").unwrap());
static BARE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\\?[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*(?:\\[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*)*$",
    )
    .unwrap()
});

/// Names too imprecise (or impossible) to express as a hint
const REJECTED_NAMES: &[&str] = &[
    "mixed", "void", "static", "resource", "true", "false", "never", "scalar", "numeric",
    "number", "callback",
];

/// The class a doc comment belongs to, for `self` and `parent`
#[derive(Debug, Clone, Copy)]
pub struct EnclosingClass<'a> {
    pub name: &'a str,
    pub parent: Option<&'a str>,
}

/// Parses doc-comment type expressions against the current name context
pub struct DocblockTypeParser<'a> {
    names: &'a NameResolver,
}

impl<'a> DocblockTypeParser<'a> {
    pub fn new(names: &'a NameResolver) -> Self {
        Self { names }
    }

    /// Parse the type expression that follows a tag.
    pub fn parse(&self, tag_text: &str, class: Option<EnclosingClass<'_>>) -> Option<Type> {
        let mut is_nullable = false;
        let mut alternatives = Vec::new();
        for alternative in tag_text.trim().split('|') {
            if alternative.eq_ignore_ascii_case("null") {
                is_nullable = true;
            } else {
                alternatives.push(alternative);
            }
        }

        let name = match alternatives.as_slice() {
            [single] => self.canonical_name(single)?,
            [first, second] if is_iterable_pair(first, second) => "iterable".to_string(),
            // unions beyond T|null are not representable
            _ => return None,
        };

        let resolved = match class {
            Some(class) if name == "self" => class.name.to_string(),
            Some(EnclosingClass {
                parent: Some(parent),
                ..
            }) if name == "parent" => parent.to_string(),
            _ => name.clone(),
        };
        Some(Type::new(name, resolved, is_nullable))
    }

    /// Types of the `@param` and `@return` tags, matched to `params` by name.
    pub fn extract_signature(
        &self,
        params: &[Param],
        doc_comment: &str,
        class: Option<EnclosingClass<'_>>,
    ) -> FunctionSignature {
        let named: Vec<(&str, Type)> = PARAM_TAG
            .captures_iter(doc_comment)
            .filter_map(|caps| {
                let ty = self.parse(caps.get(1)?.as_str(), class)?;
                Some((caps.get(2)?.as_str(), ty))
            })
            .collect();

        let param_types = params
            .iter()
            .map(|param| {
                named
                    .iter()
                    .find(|(name, _)| *name == param.name)
                    .map(|(_, ty)| ty.clone())
            })
            .collect();

        let return_type = RETURN_TAG
            .captures(doc_comment)
            .and_then(|caps| self.parse(caps.get(1)?.as_str(), class));

        FunctionSignature::new(param_types, return_type)
    }

    /// Type of the single `@var` tag; several tags make it ambiguous.
    pub fn extract_property_type(
        &self,
        doc_comment: &str,
        class: Option<EnclosingClass<'_>>,
    ) -> Option<Type> {
        let mut tags = VAR_TAG.captures_iter(doc_comment);
        let first = tags.next()?;
        if tags.next().is_some() {
            return None;
        }
        self.parse(first.get(1)?.as_str(), class)
    }

    fn canonical_name(&self, alternative: &str) -> Option<String> {
        if alternative.ends_with("[]") {
            return Some("array".to_string());
        }
        if !BARE_NAME.is_match(alternative) {
            return None;
        }
        let lower = alternative.to_ascii_lowercase();
        if REJECTED_NAMES.contains(&lower.as_str()) {
            return None;
        }
        let canonical = match lower.as_str() {
            "bool" | "boolean" => "bool",
            "int" | "integer" => "int",
            "float" | "double" => "float",
            "string" | "array" | "iterable" | "object" | "callable" => lower.as_str(),
            _ if is_relative_name(&lower) => lower.as_str(),
            _ => return Some(self.names.resolve_class_name(alternative)),
        };
        Some(canonical.to_string())
    }
}

/// Doc comments that defer to the parent declaration count as absent.
pub fn is_inherited_doc(doc_comment: &str) -> bool {
    doc_comment.to_ascii_lowercase().contains("{@inheritdoc}")
}

fn is_iterable_pair(first: &str, second: &str) -> bool {
    let is_array = |t: &str| t.eq_ignore_ascii_case("array") || t.ends_with("[]");
    let is_traversable = |t: &str| t.trim_start_matches('\\').eq_ignore_ascii_case("Traversable");
    (is_array(first) && is_traversable(second)) || (is_traversable(first) && is_array(second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn parse_in(namespace: Option<&str>, text: &str) -> Option<Type> {
        let mut names = NameResolver::new();
        names.enter_namespace(namespace);
        DocblockTypeParser::new(&names).parse(text, None)
    }

    fn param(name: &str) -> Param {
        Param {
            name: name.to_string(),
            span: Span::new(0, 0),
            hint_offset: 0,
            type_hint: None,
            default_is_null: false,
        }
    }

    #[test]
    fn test_scalar_aliases_are_canonicalized() {
        assert_eq!(parse_in(None, "boolean").unwrap().declared_name, "bool");
        assert_eq!(parse_in(None, "Integer").unwrap().declared_name, "int");
        assert_eq!(parse_in(None, "double").unwrap().declared_name, "float");
        assert_eq!(parse_in(Some("NS"), "iterable").unwrap().declared_name, "iterable");
    }

    #[test]
    fn test_null_alternative_sets_nullable() {
        let ty = parse_in(None, "null|Foo").unwrap();
        assert_eq!(ty, Type::named("Foo", true));
        assert!(parse_in(None, "null").is_none());
    }

    #[test]
    fn test_unions_are_rejected_except_array_traversable() {
        assert!(parse_in(None, "int|string").is_none());
        assert_eq!(parse_in(None, "array|Traversable").unwrap().declared_name, "iterable");
        let ty = parse_in(Some("NS"), "\\Traversable|array|null").unwrap();
        assert_eq!(ty, Type::named("iterable", true));
        assert_eq!(parse_in(None, "Foo[]|\\Traversable").unwrap().declared_name, "iterable");
    }

    #[test]
    fn test_array_suffix_becomes_array() {
        assert_eq!(parse_in(Some("NS"), "Foo[]").unwrap().declared_name, "array");
    }

    #[test]
    fn test_imprecise_and_malformed_names_are_rejected() {
        let rejected = [
            "mixed", "void", "static", "resource", "array<int>", "$this", "", "int|", "?int",
            "?Foo|null",
        ];
        for text in rejected {
            assert!(parse_in(None, text).is_none(), "{text}");
        }
    }

    #[test]
    fn test_class_names_are_resolved_against_namespace() {
        assert_eq!(parse_in(Some("Foo"), "Bar").unwrap().declared_name, "Foo\\Bar");
        assert_eq!(parse_in(Some("Foo"), "\\Bar").unwrap().declared_name, "Bar");
    }

    #[test]
    fn test_self_and_parent_resolve_to_enclosing_class() {
        let names = NameResolver::new();
        let parser = DocblockTypeParser::new(&names);
        let class = EnclosingClass {
            name: "NS\\A",
            parent: Some("NS\\P"),
        };
        assert_eq!(parser.parse("self", Some(class)).unwrap(), Type::new("self", "NS\\A", false));
        assert_eq!(parser.parse("parent", Some(class)).unwrap(), Type::new("parent", "NS\\P", false));

        let orphan = EnclosingClass {
            name: "B",
            parent: None,
        };
        assert_eq!(parser.parse("parent", Some(orphan)).unwrap().resolved_name, "parent");
    }

    #[test]
    fn test_extract_signature_matches_params_by_name() {
        let names = NameResolver::new();
        let parser = DocblockTypeParser::new(&names);
        let doc = "/**\n * @param string $b\n * @param int ...$rest\n * @param mixed $a\n * @return bool\n */";
        let sig = parser.extract_signature(&[param("a"), param("b"), param("rest")], doc, None);
        assert_eq!(sig.param_types[0], None);
        assert_eq!(sig.param(1), Some(&Type::named("string", false)));
        assert_eq!(sig.param(2), Some(&Type::named("int", false)));
        assert_eq!(sig.return_type, Some(Type::named("bool", false)));
    }

    #[test]
    fn test_property_type_requires_single_var_tag() {
        let names = NameResolver::new();
        let parser = DocblockTypeParser::new(&names);
        assert_eq!(
            parser.extract_property_type("/** @var int */", None),
            Some(Type::named("int", false))
        );
        assert_eq!(parser.extract_property_type("/** @var int\n @var string */", None), None);
        assert_eq!(parser.extract_property_type("/** nothing */", None), None);
    }

    #[test]
    fn test_inherit_doc_marker() {
        assert!(is_inherited_doc("/** {@inheritDoc} */"));
        assert!(!is_inherited_doc("/** @return int */"));
    }
}
