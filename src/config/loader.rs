use std::fs;
use std::path::Path;

use super::core::FileConfig;
use crate::core::errors::{Error, Result};

/// Parse config file contents
pub fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str::<FileConfig>(contents)
        .map_err(|e| Error::Configuration(format!("Failed to parse config: {e}")))
}

/// Load an explicitly requested config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config = parse_config(&contents).map_err(|e| match e {
        Error::Configuration(message) => {
            Error::Configuration(format!("{message} ({})", path.display()))
        }
        other => other,
    })?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}
