//! Lowered PHP syntax tree.
//!
//! The rewrite engine never touches tree-sitter nodes directly. [`parse`]
//! turns a source file into a [`SyntaxTree`] of owned records carrying byte
//! offsets into the original text, limited to what type migration needs:
//! namespace and import events for name resolution, and the closed set of
//! class-like, function-like, property and trait-use declarations.

mod php;

pub use php::parse;

/// Half-open byte range into the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Structured parse failure, reported and skipped by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on line {}", self.message, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Class,
    Function,
    Const,
}

/// One imported name from a `use` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseImport {
    pub kind: UseKind,
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLike {
    pub kind: ClassKind,
    /// Short declared name, `None` for anonymous classes
    pub name: Option<String>,
    pub start: usize,
    /// `extends` list as written (one entry for classes, several for interfaces)
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
    Closure,
    ArrowFunction,
}

/// An explicit type hint already present in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHint {
    pub span: Span,
    pub text: String,
    /// Start of the token following the hint
    pub next_token: usize,
}

impl TypeHint {
    pub fn is_nullable(&self) -> bool {
        self.text.starts_with('?')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Variable name without `$`
    pub name: String,
    pub span: Span,
    /// Where a new hint goes: before `&`, `...` or the variable
    pub hint_offset: usize,
    pub type_hint: Option<TypeHint>,
    pub default_is_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLike {
    pub kind: FunctionKind,
    pub name: Option<String>,
    pub start: usize,
    pub doc_comment: Option<String>,
    pub params: Vec<Param>,
    /// Offset right after the `)` that a return hint follows: the closing
    /// parenthesis of a closure's `use` clause, else of the parameter list
    pub signature_end: Option<usize>,
    pub return_type: Option<TypeHint>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyElement {
    /// Property name without `$`
    pub name: String,
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub doc_comment: Option<String>,
    pub type_hint: Option<TypeHint>,
    pub elements: Vec<PropertyElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitUse {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `namespace X;` (body `None`) or `namespace X { ... }`
    Namespace {
        name: Option<String>,
        body: Option<Vec<Node>>,
    },
    Use(Vec<UseImport>),
    ClassLike(ClassLike),
    FunctionLike(FunctionLike),
    Property(Property),
    TraitUse(TraitUse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    /// The first `<?php` tag, if any
    pub open_tag: Option<Span>,
    /// End of a leading `#!` interpreter line, newline included
    pub shebang_end: Option<usize>,
    pub has_strict_types: bool,
    pub nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Offset right after `<?php` when nothing but a `#!` line precedes it.
    pub fn strict_types_offset(&self) -> Option<usize> {
        self.open_tag
            .filter(|tag| tag.len() == "<?php".len())
            .filter(|tag| tag.start == 0 || self.shebang_end == Some(tag.start))
            .map(|tag| tag.end)
    }
}
