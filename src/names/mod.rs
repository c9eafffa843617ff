//! Namespace-aware class name resolution.
//!
//! Tracks the namespace and class imports in effect at the current point of
//! a file walk. Both passes feed it the same `Namespace`/`Use` events, so a
//! name resolves identically when collected and when emitted.

use crate::syntax::{UseImport, UseKind};

/// Names that refer to the enclosing class scope and are never prefixed
const SPECIAL_CLASS_NAMES: &[&str] = &["self", "parent", "static"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alias {
    alias: String,
    name: String,
}

/// Current namespace plus class imports, original casing preserved
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    namespace: Option<String>,
    aliases: Vec<Alias>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Enter a namespace; imports never carry over between namespaces.
    pub fn enter_namespace(&mut self, name: Option<&str>) {
        self.namespace = name
            .map(|n| n.trim_start_matches('\\').to_string())
            .filter(|n| !n.is_empty());
        self.aliases.clear();
    }

    /// Record a `use` import. Function and constant imports do not affect
    /// class names and are ignored.
    pub fn add_import(&mut self, import: &UseImport) {
        if import.kind != UseKind::Class {
            return;
        }
        let name = import.name.trim_start_matches('\\').to_string();
        // later imports of the same alias win
        self.aliases
            .retain(|a| !a.alias.eq_ignore_ascii_case(&import.alias));
        self.aliases.push(Alias {
            alias: import.alias.clone(),
            name,
        });
    }

    /// Fully-qualified name (without leading `\`) for a name as written.
    pub fn resolve_class_name(&self, name: &str) -> String {
        if let Some(fq) = name.strip_prefix('\\') {
            return fq.to_string();
        }
        if SPECIAL_CLASS_NAMES
            .iter()
            .any(|special| name.eq_ignore_ascii_case(special))
        {
            return name.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if first.eq_ignore_ascii_case("namespace") {
            if let Some(rest) = rest {
                return self.prefix_namespace(rest);
            }
        }

        if let Some(alias) = self
            .aliases
            .iter()
            .find(|a| a.alias.eq_ignore_ascii_case(first))
        {
            return match rest {
                Some(rest) => format!("{}\\{}", alias.name, rest),
                None => alias.name.clone(),
            };
        }

        self.prefix_namespace(name)
    }

    /// Shortest reference to `fq_name` that resolves back to it here.
    pub fn shortest_name(&self, fq_name: &str) -> String {
        let fq_name = fq_name.trim_start_matches('\\');
        let lower = fq_name.to_ascii_lowercase();
        let mut candidates = vec![format!("\\{fq_name}")];

        match &self.namespace {
            Some(namespace) => {
                let prefix = format!("{}\\", namespace.to_ascii_lowercase());
                if lower.starts_with(&prefix) {
                    candidates.push(fq_name[prefix.len()..].to_string());
                }
            }
            None => candidates.push(fq_name.to_string()),
        }

        for alias in &self.aliases {
            let target = alias.name.to_ascii_lowercase();
            if lower == target {
                candidates.push(alias.alias.clone());
            } else if lower.starts_with(&format!("{target}\\")) {
                candidates.push(format!("{}{}", alias.alias, &fq_name[target.len()..]));
            }
        }

        candidates
            .into_iter()
            .filter(|candidate| {
                candidate.starts_with('\\')
                    || self.resolve_class_name(candidate).eq_ignore_ascii_case(fq_name)
            })
            .min_by_key(String::len)
            .unwrap_or_else(|| format!("\\{fq_name}"))
    }

    fn prefix_namespace(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}\\{name}"),
            None => name.to_string(),
        }
    }
}
