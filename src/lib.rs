// Export modules for library usage
pub mod cli;
pub mod config;
pub mod core;
pub mod docblock;
pub mod hierarchy;
pub mod io;
pub mod names;
pub mod patch;
pub mod pipeline;
pub mod resolver;
pub mod rewrite;
pub mod syntax;

// Re-export commonly used types
pub use crate::core::errors::{Error, Result};
pub use crate::core::types::{FunctionSignature, Type};

pub use crate::config::{FileConfig, HintOptions, PhpVersion};

pub use crate::hierarchy::{ClassEntry, ClassHierarchyGraph};

pub use crate::patch::{PatchError, TextPatcher};

pub use crate::pipeline::{add_to_sources, remove_from_source, Pipeline, RunSummary};

pub use crate::resolver::SignatureResolver;
