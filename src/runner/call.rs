//! Task calls
//!
//! A call is written `^task-name KEY=value OTHER=value`. Parameters are
//! separated by single spaces, so a value cannot contain a space.

use crate::error::{Result, TaskError};
use std::collections::HashMap;

/// Prefix marking a dependency or command as a call to another task
pub const CALL_PREFIX: char = '^';

/// Parameters passed to a called task
pub type Params = HashMap<String, String>;

/// An invocation of a task with optional parameter overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub params: Params,
}

impl Call {
    /// Call a task without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Call {
            name: name.into(),
            params: Params::new(),
        }
    }

    /// Add a parameter to the call
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Interpret an expanded dependency: either `^call` syntax or a bare task name
    pub fn from_dependency(dep: &str) -> Result<Self> {
        if is_call(dep) {
            parse_call(dep)
        } else {
            Ok(Call::new(dep))
        }
    }
}

/// Whether `source` uses the call syntax
pub fn is_call(source: &str) -> bool {
    source.starts_with(CALL_PREFIX)
}

/// Parse `^task-name KEY=value ...` into a [`Call`]
///
/// Only the first `=` of a parameter separates key and value.
pub fn parse_call(source: &str) -> Result<Call> {
    let rest = source.strip_prefix(CALL_PREFIX).unwrap_or(source);
    let (name, params) = match rest.split_once(' ') {
        Some((name, params)) => (name, params),
        None => (rest, ""),
    };

    let mut call = Call::new(name);
    if params.is_empty() {
        return Ok(call);
    }

    for token in params.split(' ') {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| TaskError::MalformedParameter(token.to_string()))?;
        call.params.insert(key.to_string(), value.to_string());
    }

    Ok(call)
}

/// One command of a task, classified after template expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A command line for the shell
    Shell(String),
    /// A reference to another task
    Call(Call),
}

impl Step {
    /// Classify an expanded command string
    pub fn from_command(command: String) -> Result<Self> {
        if is_call(&command) {
            Ok(Step::Call(parse_call(&command)?))
        } else {
            Ok(Step::Shell(command))
        }
    }
}
