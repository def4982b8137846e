//! Core task file types
//!
//! This module defines the data structures that represent a Taskfile.yml.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::HashMap;

/// All tasks of a task file, keyed by their unique name
pub type Tasks = HashMap<String, Task>;

/// A task definition
///
/// Tasks are immutable once loaded; the executor only ever reads them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Task {
    /// Commands run in order; a command starting with `^` calls another task
    #[serde(deserialize_with = "deserialize_string_list")]
    pub cmds: Vec<String>,

    /// Task names or `^task KEY=value` calls run before the commands
    #[serde(deserialize_with = "deserialize_string_list")]
    pub deps: Vec<String>,

    /// Human readable description
    pub desc: String,

    /// Glob patterns of the files the task reads
    #[serde(deserialize_with = "deserialize_string_list")]
    pub sources: Vec<String>,

    /// Glob patterns of the files the task produces
    #[serde(deserialize_with = "deserialize_string_list")]
    pub generates: Vec<String>,

    /// Commands that all succeed when the task is up to date
    #[serde(deserialize_with = "deserialize_string_list")]
    pub status: Vec<String>,

    /// Working directory, relative to the executor directory
    pub dir: String,

    /// Task variables; a value starting with `$` is a command whose output is the value
    #[serde(deserialize_with = "deserialize_string_map")]
    pub vars: HashMap<String, String>,

    /// Environment variable receiving the captured stdout of the commands
    pub set: Option<String>,

    /// Environment overrides, in declaration order
    #[serde(deserialize_with = "deserialize_ordered_pairs")]
    pub env: Vec<(String, String)>,
}

impl Task {
    /// Create a task running the given commands
    pub fn with_cmds<I, S>(cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Task {
            cmds: cmds.into_iter().map(Into::into).collect(),
            ..Task::default()
        }
    }

    /// Add dependencies to the task
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Add a task variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Add an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Capture stdout into the given environment variable
    pub fn with_set(mut self, name: impl Into<String>) -> Self {
        self.set = Some(name.into());
        self
    }
}

/// Render a scalar YAML value as the string the shell would see
pub(crate) fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(format!("expected a scalar value, found {:?}", other)),
    }
}

/// Accept either a single string or a list of strings
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| scalar_to_string(item).map_err(D::Error::custom))
            .collect(),
        scalar => Ok(vec![scalar_to_string(scalar).map_err(D::Error::custom)?]),
    }
}

/// Mapping of names to scalar values, coerced to strings
fn deserialize_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_ordered_pairs(deserializer)?.into_iter().collect())
}

/// Mapping of names to scalar values, keeping the order they were written in
fn deserialize_ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| {
                let key = scalar_to_string(key).map_err(D::Error::custom)?;
                let value = scalar_to_string(value).map_err(D::Error::custom)?;
                Ok((key, value))
            })
            .collect(),
        _ => Err(D::Error::custom("expected a mapping of names to values")),
    }
}
