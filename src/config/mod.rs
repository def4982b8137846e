//! Task file loading
//!
//! This module handles parsing of Taskfile.yml, the shared Taskvars file,
//! and creating a starter task file.

pub mod parse;
pub mod types;
pub mod vars;

// Re-export main types
pub use parse::*;
pub use types::*;
pub use vars::*;
