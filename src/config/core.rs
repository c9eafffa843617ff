use serde::{Deserialize, Serialize};

use super::presets::HintOptions;

/// Root of the optional `--config` TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Target PHP release, e.g. `"7.4"`
    #[serde(default)]
    pub php: Option<String>,

    /// Glob patterns of files to leave alone, relative to each scanned directory
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub features: FeatureToggles,
}

/// Per-feature overrides on top of a version preset. `None` keeps the preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FeatureToggles {
    pub strict_types: Option<bool>,
    pub nullable_types: Option<bool>,
    pub iterable: Option<bool>,
    pub object: Option<bool>,
    pub property_types: Option<bool>,
}

impl HintOptions {
    /// Apply the toggles that are set.
    pub fn with_toggles(self, toggles: &FeatureToggles) -> Self {
        Self {
            strict_types: toggles.strict_types.unwrap_or(self.strict_types),
            nullable_types: toggles.nullable_types.unwrap_or(self.nullable_types),
            iterable: toggles.iterable.unwrap_or(self.iterable),
            object: toggles.object.unwrap_or(self.object),
            property_types: toggles.property_types.unwrap_or(self.property_types),
        }
    }
}
