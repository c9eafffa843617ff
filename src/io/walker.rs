use crate::core::errors::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const PHP_EXTENSION: &str = "php";

/// Recursive discovery of PHP sources under one directory
pub struct FileWalker {
    root: PathBuf,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    /// Glob patterns matched against paths relative to the root.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.ignore_patterns = patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| {
                    Error::Configuration(format!("Invalid exclude pattern '{pattern}': {e}"))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Every `.php` file, sorted by path so runs are reproducible.
    ///
    /// Nothing is skipped implicitly: hidden files and `.gitignore`d files
    /// are sources too.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry =
                entry.map_err(|e| Error::io(&self.root, std::io::Error::other(e.to_string())))?;
            let path = entry.path();

            if entry.file_type().is_some_and(|t| t.is_file()) && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let is_php = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PHP_EXTENSION));
        if !is_php {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

/// PHP files under all `roots`, in argument order then path order.
pub fn find_php_files(roots: &[PathBuf], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        files.extend(
            FileWalker::new(root.clone())
                .with_ignore_patterns(exclude)?
                .walk()?,
        );
    }
    Ok(files)
}
