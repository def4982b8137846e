//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use taskwright::config::parse_tasks;
use taskwright::error::{CommandError, CommandResult};
use taskwright::runner::{
    CommandOutput, CommandRequest, CommandRunner, EnvStore, Executor, Stream, Verbosity,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A command as seen by the runner
#[derive(Debug, Clone)]
pub struct Recorded {
    pub command: String,
    pub dir: PathBuf,
    pub env: Vec<(String, String)>,
    pub stdout: Stream,
}

impl Recorded {
    /// Value of `key` as the child would see it (last entry wins)
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Fake runner that records every command instead of spawning it
#[derive(Default)]
pub struct RecordingRunner {
    recorded: Mutex<Vec<Recorded>>,
    outputs: HashMap<String, String>,
    failing: HashSet<String>,
    blocking: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print `stdout` when `command` runs with captured output
    pub fn with_output(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }

    /// Make `command` exit with code 1
    pub fn with_failure(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    /// Make `command` run until it is cancelled
    pub fn with_blocking(mut self, command: &str) -> Self {
        self.blocking.insert(command.to_string());
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    /// Recorded command lines in execution order
    pub fn commands(&self) -> Vec<String> {
        self.recorded().into_iter().map(|r| r.command).collect()
    }

    /// The first recorded request for `command`
    pub fn find(&self, command: &str) -> Option<Recorded> {
        self.recorded().into_iter().find(|r| r.command == command)
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        request: CommandRequest<'_>,
        cancel: &CancellationToken,
    ) -> CommandResult<CommandOutput> {
        self.recorded.lock().unwrap().push(Recorded {
            command: request.command.to_string(),
            dir: request.dir.to_path_buf(),
            env: request.env.to_vec(),
            stdout: request.stdout,
        });

        if self.blocking.contains(request.command) {
            cancel.cancelled().await;
            return Err(CommandError::Cancelled);
        }
        if self.failing.contains(request.command) {
            return Err(CommandError::Failed(Some(1)));
        }

        let stdout = match request.stdout {
            Stream::Capture => self
                .outputs
                .get(request.command)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        };
        Ok(CommandOutput { stdout })
    }
}

/// Create a temporary directory with a Taskfile.yml
pub fn create_task_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Taskfile.yml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// Build a silent executor over `yaml` rooted at `dir`, with an empty
/// ambient environment and the given runner
pub fn executor(yaml: &str, dir: &Path, runner: Arc<RecordingRunner>) -> Arc<Executor> {
    executor_with_env(yaml, dir, runner, EnvStore::default())
}

pub fn executor_with_env(
    yaml: &str,
    dir: &Path,
    runner: Arc<RecordingRunner>,
    env: EnvStore,
) -> Arc<Executor> {
    let tasks = parse_tasks(yaml).unwrap();
    Arc::new(
        Executor::new(tasks, dir.to_string_lossy())
            .unwrap()
            .with_runner(runner)
            .with_env(Arc::new(env))
            .with_verbosity(Verbosity::Silent),
    )
}

pub fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
