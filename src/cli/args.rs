use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    load_config_file, resolve_options, FeatureToggles, FileConfig, HintOptions, PhpVersion,
};
use crate::core::errors::Result;

#[derive(Parser, Debug)]
#[command(name = "typehinter")]
#[command(
    about = "Turn PHP doc-comment types into native type hints, or strip them again",
    long_about = "Turn PHP doc-comment types into native type hints, or strip them again.\n\n\
                  Files are modified in place; use version control."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v: debug, -vv: trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Number of worker threads (0 = one per core)
    #[arg(short = 'j', long = "jobs", default_value = "0", global = true)]
    pub jobs: usize,

    /// Process files one at a time
    #[arg(long = "no-parallel", global = true)]
    pub no_parallel: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add native hints derived from @param, @return and @var tags
    #[command(args_override_self = true)]
    Add(AddArgs),

    /// Remove return hints and scalar parameter hints
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Directories to scan recursively for .php files
    #[arg(required = true, value_parser = existing_dir)]
    pub dirs: Vec<PathBuf>,

    /// Target PHP version; enables every feature it supports
    #[arg(long = "php", value_name = "VERSION")]
    pub php: Option<PhpVersion>,

    /// TOML file with `php`, `exclude` and `[features]` settings
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Glob of files to skip, relative to each directory (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub features: FeatureFlags,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Directories to scan recursively for .php files
    #[arg(required = true, value_parser = existing_dir)]
    pub dirs: Vec<PathBuf>,

    /// Glob of files to skip, relative to each directory (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,
}

/// `--flag` / `--no-flag` pairs; the last one given wins
#[derive(Args, Debug, Default)]
pub struct FeatureFlags {
    /// Add declare(strict_types=1)
    #[arg(long = "strict-types", overrides_with = "no_strict_types")]
    strict_types: bool,
    /// Leave strict_types alone
    #[arg(long = "no-strict-types", overrides_with = "strict_types")]
    no_strict_types: bool,

    /// Allow ?T hints
    #[arg(long = "nullable-types", overrides_with = "no_nullable_types")]
    nullable_types: bool,
    /// Never emit ?T hints
    #[arg(long = "no-nullable-types", overrides_with = "nullable_types")]
    no_nullable_types: bool,

    /// Allow the iterable hint
    #[arg(long = "iterable", overrides_with = "no_iterable")]
    iterable: bool,
    /// Never emit iterable
    #[arg(long = "no-iterable", overrides_with = "iterable")]
    no_iterable: bool,

    /// Allow the object hint
    #[arg(long = "object", overrides_with = "no_object")]
    object: bool,
    /// Never emit object
    #[arg(long = "no-object", overrides_with = "object")]
    no_object: bool,

    /// Add typed properties
    #[arg(long = "property-types", overrides_with = "no_property_types")]
    property_types: bool,
    /// Leave properties untyped
    #[arg(long = "no-property-types", overrides_with = "property_types")]
    no_property_types: bool,
}

impl FeatureFlags {
    pub fn toggles(&self) -> FeatureToggles {
        let pair = |on: bool, off: bool| match (on, off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        FeatureToggles {
            strict_types: pair(self.strict_types, self.no_strict_types),
            nullable_types: pair(self.nullable_types, self.no_nullable_types),
            iterable: pair(self.iterable, self.no_iterable),
            object: pair(self.object, self.no_object),
            property_types: pair(self.property_types, self.no_property_types),
        }
    }
}

impl AddArgs {
    pub fn file_config(&self) -> Result<Option<FileConfig>> {
        self.config.as_deref().map(load_config_file).transpose()
    }

    /// Effective options from the config file and the flags.
    pub fn hint_options(&self, file: Option<&FileConfig>) -> Result<HintOptions> {
        resolve_options(file, self.php, &self.features.toggles())
    }

    /// Command-line excludes followed by the config file's.
    pub fn exclude_patterns(&self, file: Option<&FileConfig>) -> Vec<String> {
        self.exclude
            .iter()
            .chain(file.map(|config| config.exclude.as_slice()).unwrap_or_default())
            .cloned()
            .collect()
    }
}

fn existing_dir(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{value} is not a directory"))
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
