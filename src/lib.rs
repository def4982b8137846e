//! Taskwright - a task runner driven by a YAML task file
//!
//! Tasks declare shell commands, dependencies that run concurrently,
//! variables expanded through templates, and up-to-date checks based on
//! status commands or file timestamps.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, TaskError};
pub use runner::{Call, Executor};

/// Current version of Taskwright
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
