use super::after_params;
use crate::core::errors::Result;
use crate::core::types::SCALAR_KINDS;
use crate::patch::TextPatcher;
use crate::syntax::{FunctionLike, Node, Param, SyntaxTree};
use std::path::Path;
use tracing::debug;

/// Remove every return hint and every scalar parameter hint.
///
/// Class hints on parameters are valid before PHP 7 and stay, except that a
/// `?Class $x = null` loses its `?`.
pub fn strip_hints(source: &str, tree: &SyntaxTree, path: &Path) -> Result<String> {
    let mut patcher = TextPatcher::new(source);
    strip_nodes(&mut patcher, &tree.nodes, path)?;
    debug!(path = %path.display(), edits = patcher.edit_count(), "Planned hint removals");
    Ok(patcher.render()?)
}

fn strip_nodes(patcher: &mut TextPatcher<'_>, nodes: &[Node], path: &Path) -> Result<()> {
    for node in nodes {
        match node {
            Node::Namespace {
                body: Some(body), ..
            } => strip_nodes(patcher, body, path)?,
            Node::ClassLike(class) => strip_nodes(patcher, &class.members, path)?,
            Node::FunctionLike(function) => {
                strip_function(patcher, function, path)?;
                strip_nodes(patcher, &function.body, path)?;
            }
            Node::Namespace { body: None, .. }
            | Node::Use(_)
            | Node::Property(_)
            | Node::TraitUse(_) => {}
        }
    }
    Ok(())
}

fn strip_function(patcher: &mut TextPatcher<'_>, function: &FunctionLike, path: &Path) -> Result<()> {
    if let Some(hint) = &function.return_type {
        let start = after_params(function, path)?;
        patcher.remove(start, hint.span.end - start);
    }
    for param in &function.params {
        strip_param(patcher, param);
    }
    Ok(())
}

fn strip_param(patcher: &mut TextPatcher<'_>, param: &Param) {
    let Some(hint) = &param.type_hint else {
        return;
    };
    let core = hint.text.trim_start_matches('?').trim();
    if SCALAR_KINDS.iter().any(|kind| core.eq_ignore_ascii_case(kind)) {
        patcher.remove(hint.span.start, hint.next_token - hint.span.start);
    } else if hint.is_nullable() && param.default_is_null {
        patcher.remove(hint.span.start, 1);
    }
}
