//! Hint options and their sources.
//!
//! Options start from a PHP version preset and are refined by feature
//! toggles. The effective order is: default version, config file version,
//! `--php`, config file `[features]`, individual command-line flags.

mod core;
mod loader;
mod presets;

pub use self::core::{FeatureToggles, FileConfig};
pub use loader::{load_config_file, parse_config};
pub use presets::{HintOptions, PhpVersion};

use crate::core::errors::Result;

/// Combine a config file and command-line choices into effective options.
pub fn resolve_options(
    file: Option<&FileConfig>,
    cli_version: Option<PhpVersion>,
    cli_toggles: &FeatureToggles,
) -> Result<HintOptions> {
    let file_version = file
        .and_then(|config| config.php.as_deref())
        .map(str::parse::<PhpVersion>)
        .transpose()?;
    let version = cli_version.or(file_version).unwrap_or_default();

    let mut options = HintOptions::for_version(version);
    if let Some(config) = file {
        options = options.with_toggles(&config.features);
    }
    Ok(options.with_toggles(cli_toggles))
}
