//! Parameter hints of builtin classes and interfaces.
//!
//! Classes outside the analyzed sources still constrain overriding methods.
//! This table lists the builtins that user code commonly extends, together
//! with the builtin-to-builtin parent relation. A miss means "no inherited
//! constraint".

use crate::core::types::{FunctionSignature, Type};
use once_cell::sync::Lazy;
use std::collections::HashMap;

type MethodRow = (&'static str, &'static [Option<&'static str>]);

const NONE: Option<&str> = None;

static BUILTIN_METHODS: &[(&str, &[MethodRow])] = &[
    (
        "ArrayAccess",
        &[
            ("offsetExists", &[NONE]),
            ("offsetGet", &[NONE]),
            ("offsetSet", &[NONE, NONE]),
            ("offsetUnset", &[NONE]),
        ],
    ),
    ("Countable", &[("count", &[])]),
    ("IteratorAggregate", &[("getIterator", &[])]),
    (
        "Iterator",
        &[
            ("current", &[]),
            ("key", &[]),
            ("next", &[]),
            ("rewind", &[]),
            ("valid", &[]),
        ],
    ),
    ("SeekableIterator", &[("seek", &[NONE])]),
    (
        "RecursiveIterator",
        &[("hasChildren", &[]), ("getChildren", &[])],
    ),
    ("OuterIterator", &[("getInnerIterator", &[])]),
    ("FilterIterator", &[("accept", &[])]),
    (
        "ArrayObject",
        &[
            ("append", &[NONE]),
            ("exchangeArray", &[NONE]),
            ("getArrayCopy", &[]),
            ("getFlags", &[]),
            ("setFlags", &[NONE]),
            ("asort", &[NONE]),
            ("ksort", &[NONE]),
            ("uasort", &[NONE]),
            ("uksort", &[NONE]),
        ],
    ),
    ("JsonSerializable", &[("jsonSerialize", &[])]),
    (
        "Serializable",
        &[("serialize", &[]), ("unserialize", &[NONE])],
    ),
    ("Stringable", &[("__toString", &[])]),
    ("SplObserver", &[("update", &[Some("SplSubject")])]),
    (
        "SplSubject",
        &[
            ("attach", &[Some("SplObserver")]),
            ("detach", &[Some("SplObserver")]),
            ("notify", &[]),
        ],
    ),
    (
        "DateTimeInterface",
        &[
            ("format", &[NONE]),
            ("getTimezone", &[]),
            ("getOffset", &[]),
            ("getTimestamp", &[]),
            ("diff", &[Some("DateTimeInterface"), NONE]),
        ],
    ),
    (
        "SessionHandlerInterface",
        &[
            ("open", &[NONE, NONE]),
            ("close", &[]),
            ("read", &[NONE]),
            ("write", &[NONE, NONE]),
            ("destroy", &[NONE]),
            ("gc", &[NONE]),
        ],
    ),
    (
        "php_user_filter",
        &[
            ("filter", &[NONE, NONE, NONE, NONE]),
            ("onCreate", &[]),
            ("onClose", &[]),
        ],
    ),
];

static BUILTIN_PARENTS: &[(&str, &[&str])] = &[
    ("SeekableIterator", &["Iterator"]),
    ("RecursiveIterator", &["Iterator"]),
    ("OuterIterator", &["Iterator"]),
    ("IteratorIterator", &["OuterIterator"]),
    ("FilterIterator", &["IteratorIterator"]),
    (
        "ArrayIterator",
        &["SeekableIterator", "ArrayAccess", "Serializable", "Countable"],
    ),
    (
        "ArrayObject",
        &["IteratorAggregate", "ArrayAccess", "Serializable", "Countable"],
    ),
    ("DateTime", &["DateTimeInterface"]),
    ("DateTimeImmutable", &["DateTimeInterface"]),
];

/// Read-only lookup table of builtin method signatures
pub struct BuiltinSignatures {
    methods: HashMap<(String, String), FunctionSignature>,
    parents: HashMap<String, &'static [&'static str]>,
}

static BUILTINS: Lazy<BuiltinSignatures> = Lazy::new(BuiltinSignatures::build);

impl BuiltinSignatures {
    /// The shared table.
    pub fn get() -> &'static Self {
        &BUILTINS
    }

    fn build() -> Self {
        let methods = BUILTIN_METHODS
            .iter()
            .flat_map(|(class, rows)| {
                rows.iter().map(move |(method, params)| {
                    let signature = FunctionSignature::new(
                        params
                            .iter()
                            .map(|param| param.map(|name| Type::named(name, false)))
                            .collect(),
                        None,
                    );
                    (
                        (class.to_ascii_lowercase(), method.to_ascii_lowercase()),
                        signature,
                    )
                })
            })
            .collect();
        let parents = BUILTIN_PARENTS
            .iter()
            .map(|(class, parents)| (class.to_ascii_lowercase(), *parents))
            .collect();
        Self { methods, parents }
    }

    /// Signature of `class::method`, searching builtin ancestors depth-first.
    pub fn signature_of(&self, class: &str, method: &str) -> Option<FunctionSignature> {
        let class = class.trim_start_matches('\\').to_ascii_lowercase();
        let method = method.to_ascii_lowercase();
        self.lookup(&class, &method, 0)
    }

    fn lookup(&self, class: &str, method: &str, depth: usize) -> Option<FunctionSignature> {
        if let Some(signature) = self.methods.get(&(class.to_string(), method.to_string())) {
            return Some(signature.clone());
        }
        if depth > 8 {
            return None;
        }
        self.parents.get(class).and_then(|parents| {
            parents
                .iter()
                .find_map(|parent| self.lookup(&parent.to_ascii_lowercase(), method, depth + 1))
        })
    }
}
