//! Task execution engine
//!
//! This module handles parsing of call syntax, variable resolution, template
//! expansion, up-to-date checks and the concurrent execution of task graphs.

pub mod call;
pub mod command;
pub mod cycle;
pub mod env;
pub mod executor;
pub mod report;
pub mod status;
pub mod template;
pub mod vars;

// Re-export main types
pub use call::*;
pub use command::*;
pub use cycle::has_cyclic_dep;
pub use env::*;
pub use executor::*;
pub use report::*;
pub use template::Templates;
pub use vars::DYNAMIC_PREFIX;
