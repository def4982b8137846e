//! Error types for Taskwright

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Taskwright operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Main error type for Taskwright
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task file and variables file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The task graph contains a cycle; nothing was run
    #[error("task: cyclic dependency detected")]
    CyclicDependencyDetected,

    #[error("task: Task \"{0}\" not found")]
    TaskNotFound(String),

    /// A call parameter without `=`
    #[error("task: task param \"{0}\" doesn't contain \"=\"")]
    MalformedParameter(String),

    /// A dynamic variable command printed more than one line
    #[error("task: got multiline result from command \"{0}\"")]
    MultilineResult(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A command of the task failed
    #[error("task: Failed to run task \"{task}\": {source}")]
    TaskRunFailed {
        task: String,
        #[source]
        source: Box<TaskError>,
    },

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("task: watch mode requested but no watcher is configured")]
    WatchUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Task file discovery, parsing and bootstrapping errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No task file found (searched: {0}). Use \"taskwright --init\" to create a new one")]
    NotFound(String),

    #[error("A task file already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read variables file '{path}': {error}")]
    VarsFile { path: PathBuf, error: String },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures reported by a [`CommandRunner`](crate::runner::CommandRunner)
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command exited with code {0:?}")]
    Failed(Option<i32>),

    #[error("failed to start command: {0}")]
    Spawn(#[source] io::Error),

    #[error("command output is not valid UTF-8")]
    InvalidOutput,

    #[error("command cancelled")]
    Cancelled,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for command execution
pub type CommandResult<T> = std::result::Result<T, CommandError>;

impl TaskError {
    /// Wrap a failure from one of `task`'s commands
    pub fn run_failed(task: impl Into<String>, source: TaskError) -> Self {
        TaskError::TaskRunFailed {
            task: task.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error, or any error it wraps, is a cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            TaskError::Command(CommandError::Cancelled) => true,
            TaskError::TaskRunFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
