//! Up-to-date checks
//!
//! A task with `status` commands is up to date when all of them succeed.
//! Otherwise it is up to date when it declares both `sources` and `generates`
//! and the oldest generated file is newer than the newest source.
//!
//! Failing to run a check or to stat a file means "not up to date"; only
//! template and variable errors are reported.

use crate::config::Task;
use crate::error::Result;
use crate::runner::{Call, CommandRequest, Executor};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

impl Executor {
    /// Whether the commands of `call` can be skipped
    pub async fn is_up_to_date(&self, call: &Call, task: &Task) -> Result<bool> {
        if !task.status.is_empty() {
            self.is_up_to_date_status(call, task).await
        } else {
            self.is_up_to_date_timestamp(call, task).await
        }
    }

    async fn is_up_to_date_status(&self, call: &Call, task: &Task) -> Result<bool> {
        let dir = self.task_dir(call, task).await?;
        let env = self.environ(call, task).await?;
        let checks = self.expand_all(call, &task.status).await?;

        for check in &checks {
            let request = CommandRequest::silent(check, &dir, &env);
            if let Err(err) = self.runner.run(request, &self.cancel).await {
                debug!(task = %call.name, check = %check, error = %err, "status check failed");
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn is_up_to_date_timestamp(&self, call: &Call, task: &Task) -> Result<bool> {
        if task.sources.is_empty() || task.generates.is_empty() {
            return Ok(false);
        }

        let dir = self.task_dir(call, task).await?;
        let sources = self.expand_all(call, &task.sources).await?;
        let generates = self.expand_all(call, &task.generates).await?;

        let Ok(Some(newest_source)) = newest_mtime(&dir, &sources) else {
            return Ok(false);
        };
        let Ok(Some(oldest_generated)) = oldest_mtime(&dir, &generates) else {
            return Ok(false);
        };

        trace!(task = %call.name, ?newest_source, ?oldest_generated, "comparing timestamps");
        Ok(oldest_generated > newest_source)
    }
}

/// Latest modification time of the files matched by `patterns` under `dir`
///
/// `None` when nothing matches.
pub fn newest_mtime(dir: &Path, patterns: &[String]) -> io::Result<Option<SystemTime>> {
    Ok(mtimes(dir, patterns)?.into_iter().max())
}

/// Earliest modification time of the files matched by `patterns` under `dir`
///
/// `None` when nothing matches.
pub fn oldest_mtime(dir: &Path, patterns: &[String]) -> io::Result<Option<SystemTime>> {
    Ok(mtimes(dir, patterns)?.into_iter().min())
}

fn mtimes(dir: &Path, patterns: &[String]) -> io::Result<Vec<SystemTime>> {
    let mut times = Vec::new();
    for path in matching_paths(dir, patterns)? {
        times.push(path.metadata()?.modified()?);
    }
    Ok(times)
}

fn matching_paths(dir: &Path, patterns: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let full = dir.join(pattern);
        let entries = glob::glob(&full.to_string_lossy())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        for entry in entries {
            paths.push(entry.map_err(glob::GlobError::into_error)?);
        }
    }
    Ok(paths)
}
