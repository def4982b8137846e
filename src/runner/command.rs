//! Command execution
//!
//! The engine never spawns processes itself. It hands a command line, a
//! directory and an environment to a [`CommandRunner`]; [`ShellRunner`] is
//! the implementation that runs it through the system shell.

use crate::error::{CommandError, CommandResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Where one of the standard streams of a command goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Share the stream of the current process
    Inherit,
    /// Discard (or for stdin, provide nothing)
    Null,
    /// Collect into [`CommandOutput::stdout`]; only meaningful for stdout
    Capture,
}

/// A command line to run
#[derive(Debug, Clone, Copy)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
    pub dir: &'a Path,
    /// The complete environment of the command, applied in order
    pub env: &'a [(String, String)],
    pub stdin: Stream,
    pub stdout: Stream,
    pub stderr: Stream,
}

impl<'a> CommandRequest<'a> {
    /// A request with stdin and stderr inherited and stdout as given
    pub fn new(
        command: &'a str,
        dir: &'a Path,
        env: &'a [(String, String)],
        stdout: Stream,
    ) -> Self {
        CommandRequest {
            command,
            dir,
            env,
            stdin: Stream::Inherit,
            stdout,
            stderr: Stream::Inherit,
        }
    }

    /// A request with every stream discarded
    pub fn silent(command: &'a str, dir: &'a Path, env: &'a [(String, String)]) -> Self {
        CommandRequest {
            command,
            dir,
            env,
            stdin: Stream::Null,
            stdout: Stream::Null,
            stderr: Stream::Null,
        }
    }
}

/// Result of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured stdout, empty unless stdout was [`Stream::Capture`]
    pub stdout: String,
}

/// Capability to run command lines
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    ///
    /// A non-zero exit, a failure to start and cancellation are all errors.
    async fn run(
        &self,
        request: CommandRequest<'_>,
        cancel: &CancellationToken,
    ) -> CommandResult<CommandOutput>;
}

/// Runs command lines through the system shell
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Interpreter and its arguments, e.g. `["sh", "-c"]`
    interpreter: Vec<String>,
}

impl ShellRunner {
    /// Create a runner using the platform shell
    pub fn new() -> Self {
        let interpreter = if cfg!(windows) {
            vec!["cmd".to_string(), "/C".to_string()]
        } else {
            vec!["sh".to_string(), "-c".to_string()]
        };
        ShellRunner { interpreter }
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    fn build(&self, request: &CommandRequest<'_>) -> TokioCommand {
        let mut command = TokioCommand::new(&self.interpreter[0]);
        command.args(&self.interpreter[1..]);
        command.arg(request.command);
        command.current_dir(request.dir);

        command.env_clear();
        for (key, value) in request.env {
            command.env(key, value);
        }

        command.stdin(stdio(request.stdin));
        command.stdout(stdio(request.stdout));
        command.stderr(stdio(request.stderr));
        command.kill_on_drop(true);
        command
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn stdio(stream: Stream) -> Stdio {
    match stream {
        Stream::Inherit => Stdio::inherit(),
        Stream::Null => Stdio::null(),
        Stream::Capture => Stdio::piped(),
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        request: CommandRequest<'_>,
        cancel: &CancellationToken,
    ) -> CommandResult<CommandOutput> {
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        debug!(command = %request.command, dir = %request.dir.display(), "spawning command");
        let mut child = self.build(&request).spawn().map_err(CommandError::Spawn)?;

        let stdout = child.stdout.take();
        let wait = async {
            let mut captured = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout
                    .read_to_end(&mut captured)
                    .await
                    .map_err(CommandError::Spawn)?;
            }
            let status = child.wait().await.map_err(CommandError::Spawn)?;
            Ok::<_, CommandError>((status, captured))
        };

        let (status, captured) = tokio::select! {
            finished = wait => finished?,
            _ = cancel.cancelled() => {
                // Returning drops the child, which kills it
                trace!(command = %request.command, "command cancelled");
                return Err(CommandError::Cancelled);
            }
        };

        trace!(command = %request.command, code = ?status.code(), "command exited");
        if !status.success() {
            return Err(CommandError::Failed(status.code()));
        }

        let stdout = String::from_utf8(captured).map_err(|_| CommandError::InvalidOutput)?;
        Ok(CommandOutput { stdout })
    }
}
