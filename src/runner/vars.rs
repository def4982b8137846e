//! Variable resolution
//!
//! The variables visible to a call are merged from four layers, each one
//! overriding the names of the layers before it:
//!
//! 1. the task's own `vars`
//! 2. the shared Taskvars file
//! 3. the ambient environment
//! 4. the call parameters
//!
//! Values of layers 1, 2 and 4 starting with `$` are dynamic: the rest of the
//! value is run as a command and its single line of output is the value.

use crate::config::read_vars_file;
use crate::error::{Result, TaskError};
use crate::runner::{Call, CommandRequest, Executor, Stream};
use std::collections::HashMap;
use tracing::trace;

/// Prefix marking a variable value as a command to run
pub const DYNAMIC_PREFIX: char = '$';

impl Executor {
    /// Compute the variables visible to `call`
    pub async fn variables(&self, call: &Call) -> Result<HashMap<String, String>> {
        let task = self.task(&call.name)?;
        let mut vars = HashMap::new();

        for (key, value) in &task.vars {
            vars.insert(key.clone(), self.resolve_value(value).await?);
        }

        for (key, value) in read_vars_file(&self.base_dir())? {
            let value = self.resolve_value(&value).await?;
            vars.insert(key, value);
        }

        vars.extend(self.env.snapshot());

        for (key, value) in &call.params {
            vars.insert(key.clone(), self.resolve_value(value).await?);
        }

        Ok(vars)
    }

    /// Resolve a raw variable value, running it if it is dynamic
    pub async fn resolve_value(&self, value: &str) -> Result<String> {
        let Some(command) = value.strip_prefix(DYNAMIC_PREFIX) else {
            return Ok(value.to_string());
        };

        trace!(command, "resolving dynamic variable");
        let dir = self.base_dir();
        let env = self.env.pairs();
        let request = CommandRequest {
            command,
            dir: &dir,
            env: &env,
            stdin: Stream::Null,
            stdout: Stream::Capture,
            stderr: Stream::Inherit,
        };
        let output = self.runner.run(request, &self.cancel).await?;

        let result = output.stdout.strip_suffix('\n').unwrap_or(&output.stdout);
        if result.contains('\n') {
            return Err(TaskError::MultilineResult(command.to_string()));
        }
        Ok(result.trim().to_string())
    }
}
