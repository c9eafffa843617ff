pub mod walker;

pub use walker::{find_php_files, FileWalker};

use crate::core::errors::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Replace `path` with `content` in one step.
///
/// The content goes to a temporary file in the same directory, which is then
/// renamed over the target, so readers never see a partial file. The
/// original permissions are kept.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(file.path(), e))?;

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(file.path(), metadata.permissions())
            .map_err(|e| Error::io(file.path(), e))?;
    }

    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
