//! Two-phase driver over a set of PHP files.
//!
//! `add` first parses every file to build the [`ClassHierarchyGraph`], then
//! parses each file again and rewrites it against that graph. `remove` only
//! needs the second phase. Files that fail to parse are reported and left
//! alone; every other error aborts the run.

use crate::config::HintOptions;
use crate::core::errors::{Error, Result};
use crate::hierarchy::{collect_file, ClassHierarchyGraph, FileFacts};
use crate::io::{read_file, write_file_atomic};
use crate::resolver::SignatureResolver;
use crate::rewrite::{add_hints, strip_hints};
use crate::syntax::{parse, SyntaxTree};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Changed,
    /// The file did not parse and was not touched
    Skipped,
}

/// Per-run counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub changed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let count = |wanted: FileOutcome| outcomes.iter().filter(|o| **o == wanted).count();
        Self {
            scanned: outcomes.len(),
            changed: count(FileOutcome::Changed),
            skipped: count(FileOutcome::Skipped),
        }
    }
}

/// Execution settings shared by both modes
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    parallel: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Pipeline {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Insert native hints into `files` in place.
    pub fn add(&self, files: &[PathBuf], options: &HintOptions) -> Result<RunSummary> {
        info!(files = files.len(), "Collecting context");
        let graph = self.build_graph(files)?;
        info!(classes = graph.class_count(), "Adding type annotations");

        let resolver = SignatureResolver::new(&graph);
        let outcomes = self.rewrite_files(files, |source, tree, path| {
            add_hints(source, tree, path, &resolver, options)
        })?;
        Ok(RunSummary::from_outcomes(&outcomes))
    }

    /// Strip return hints and scalar parameter hints from `files` in place.
    pub fn remove(&self, files: &[PathBuf]) -> Result<RunSummary> {
        info!(files = files.len(), "Removing type annotations");
        let outcomes = self.rewrite_files(files, strip_hints)?;
        Ok(RunSummary::from_outcomes(&outcomes))
    }

    /// Phase 1. Facts are gathered in parallel and merged in file order, so
    /// the graph never depends on scheduling.
    pub fn build_graph(&self, files: &[PathBuf]) -> Result<ClassHierarchyGraph> {
        let facts = self.map_files(files, |path| -> Result<Option<FileFacts>> {
            let source = read_file(path)?;
            Ok(parse_or_warn(&source, path)?.map(|tree| collect_file(path, &tree)))
        });

        let mut graph = ClassHierarchyGraph::new();
        for file_facts in facts {
            if let Some(file_facts) = file_facts? {
                graph.merge_facts(file_facts);
            }
        }
        Ok(graph)
    }

    /// Phase 2. Each file owns its patcher; results are written only when
    /// the rendered text differs.
    fn rewrite_files<F>(&self, files: &[PathBuf], rewrite: F) -> Result<Vec<FileOutcome>>
    where
        F: Fn(&str, &SyntaxTree, &Path) -> Result<String> + Sync,
    {
        self.map_files(files, |path| -> Result<FileOutcome> {
            let source = read_file(path)?;
            let Some(tree) = parse_or_warn(&source, path)? else {
                return Ok(FileOutcome::Skipped);
            };
            let output = rewrite(&source, &tree, path)?;
            if output == source {
                debug!(path = %path.display(), "Unchanged");
                return Ok(FileOutcome::Unchanged);
            }
            write_file_atomic(path, &output)?;
            debug!(path = %path.display(), "Rewrote file");
            Ok(FileOutcome::Changed)
        })
        .into_iter()
        .collect()
    }

    fn map_files<T, F>(&self, files: &[PathBuf], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> T + Sync + Send,
    {
        if self.parallel {
            files.par_iter().map(|path| f(path)).collect()
        } else {
            files.iter().map(|path| f(path)).collect()
        }
    }
}

/// Parse a file, turning a syntax error into a logged skip.
fn parse_or_warn(source: &str, path: &Path) -> Result<Option<SyntaxTree>> {
    match parse(source).map_err(|failure| Error::parse(path, failure.to_string())) {
        Ok(tree) => Ok(Some(tree)),
        Err(err) if err.is_recoverable() => {
            warn!("{err}, skipping file");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Run `add` over in-memory sources, returning the rewritten text of each.
///
/// The sources form one codebase: classes declared in one are visible to
/// the others. Sources that do not parse come back unchanged.
pub fn add_to_sources(sources: &[(&Path, &str)], options: &HintOptions) -> Result<Vec<String>> {
    let trees = sources
        .iter()
        .map(|(path, source)| parse_or_warn(source, path))
        .collect::<Result<Vec<_>>>()?;

    let graph = ClassHierarchyGraph::from_trees(
        sources
            .iter()
            .zip(&trees)
            .filter_map(|((path, _), tree)| Some((*path, tree.as_ref()?))),
    );
    let resolver = SignatureResolver::new(&graph);

    sources
        .iter()
        .zip(&trees)
        .map(|((path, source), tree)| match tree {
            Some(tree) => add_hints(source, tree, path, &resolver, options),
            None => Ok(source.to_string()),
        })
        .collect()
}

/// Run `remove` over one in-memory source.
pub fn remove_from_source(path: &Path, source: &str) -> Result<String> {
    match parse_or_warn(source, path)? {
        Some(tree) => strip_hints(source, &tree, path),
        None => Ok(source.to_string()),
    }
}
