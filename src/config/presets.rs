//! Language-level presets.
//!
//! Each PHP release unlocks more hint syntax:
//! - **7.0**: `declare(strict_types=1)`
//! - **7.1**: `?T` nullable hints and `iterable`
//! - **7.2**: `object`
//! - **7.4**: typed properties

use crate::core::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Target PHP release, compared by major then minor version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhpVersion {
    pub major: u32,
    pub minor: u32,
}

impl PhpVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for PhpVersion {
    fn default() -> Self {
        Self::new(7, 2)
    }
}

impl FromStr for PhpVersion {
    type Err = Error;

    /// Accepts `7`, `7.1` and `8.0.3`; anything after the minor version is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Configuration(format!("Invalid PHP version '{s}'"));
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(part) => part.parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Which hint forms the inserter may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HintOptions {
    pub strict_types: bool,
    pub nullable_types: bool,
    pub iterable: bool,
    pub object: bool,
    pub property_types: bool,
}

impl HintOptions {
    /// Everything the given release supports.
    pub fn for_version(version: PhpVersion) -> Self {
        let at_least = |major, minor| version >= PhpVersion::new(major, minor);
        Self {
            strict_types: at_least(7, 0),
            nullable_types: at_least(7, 1),
            iterable: at_least(7, 1),
            object: at_least(7, 2),
            property_types: at_least(7, 4),
        }
    }
}
