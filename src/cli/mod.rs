//! CLI module for typehinter
//!
//! This module provides the command-line interface, including:
//! - Argument parsing and validation (`args`)
//! - Command handlers (`handlers`)
//! - Runtime setup (`setup`)

pub mod args;
pub mod handlers;
pub mod setup;

// Re-export commonly used types for convenience
pub use args::{AddArgs, Cli, Commands, FeatureFlags, RemoveArgs};
pub use handlers::{handle_add, handle_remove, run};
pub use setup::{configure_thread_pool, get_worker_count, init_logging};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
