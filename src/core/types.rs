//! Value types shared by the analysis and rewrite passes.
//!
//! A [`Type`] describes one documented type occurrence. A
//! [`FunctionSignature`] collects the parameter and return types of a
//! function-like declaration, matched to parameters by position.

/// Type names that never denote a class.
const NON_CLASS_KINDS: &[&str] = &[
    "bool", "int", "float", "string", "array", "iterable", "object", "callable",
];

/// Scalar hint kinds, the only parameter hints the stripper removes.
pub const SCALAR_KINDS: &[&str] = &["bool", "int", "float", "string"];

/// One type occurrence.
///
/// `declared_name` keeps the relative keywords `self` and `parent` as
/// written, `resolved_name` is the class they stand for and is what
/// subtype comparisons look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub declared_name: String,
    pub resolved_name: String,
    pub is_nullable: bool,
}

impl Type {
    pub fn new(
        declared_name: impl Into<String>,
        resolved_name: impl Into<String>,
        is_nullable: bool,
    ) -> Self {
        Self {
            declared_name: declared_name.into(),
            resolved_name: resolved_name.into(),
            is_nullable,
        }
    }

    /// A type whose declared and resolved names coincide.
    pub fn named(name: impl Into<String>, is_nullable: bool) -> Self {
        let name = name.into();
        Self {
            declared_name: name.clone(),
            resolved_name: name,
            is_nullable,
        }
    }

    /// True unless the resolved name is one of the fixed scalar or compound kinds.
    pub fn is_class_hint(&self) -> bool {
        !NON_CLASS_KINDS
            .iter()
            .any(|kind| self.resolved_name.eq_ignore_ascii_case(kind))
    }

    /// True for `self` and `parent`, which are emitted verbatim.
    pub fn is_relative(&self) -> bool {
        is_relative_name(&self.declared_name)
    }

    /// Case-insensitive check against the resolved name.
    pub fn is(&self, name: &str) -> bool {
        self.resolved_name.eq_ignore_ascii_case(name)
    }

    pub fn as_not_nullable(&self) -> Self {
        Self {
            is_nullable: false,
            ..self.clone()
        }
    }

    /// Replace `self`/`parent` with the class they were resolved to, so the
    /// type keeps its meaning when handed to a descendant.
    pub fn as_resolved(&self) -> Self {
        Self {
            declared_name: self.resolved_name.clone(),
            ..self.clone()
        }
    }
}

/// True for the class-relative keywords `self` and `parent`.
pub fn is_relative_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("self") || name.eq_ignore_ascii_case("parent")
}

/// Effective or declared types of one function-like declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSignature {
    pub param_types: Vec<Option<Type>>,
    pub return_type: Option<Type>,
}

impl FunctionSignature {
    pub fn new(param_types: Vec<Option<Type>>, return_type: Option<Type>) -> Self {
        Self {
            param_types,
            return_type,
        }
    }

    pub fn param(&self, index: usize) -> Option<&Type> {
        self.param_types.get(index).and_then(Option::as_ref)
    }

    /// Every type rewritten with [`Type::as_resolved`].
    pub fn resolved(&self) -> Self {
        Self {
            param_types: self
                .param_types
                .iter()
                .map(|ty| ty.as_ref().map(Type::as_resolved))
                .collect(),
            return_type: self.return_type.as_ref().map(Type::as_resolved),
        }
    }
}
