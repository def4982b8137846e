//! Task execution engine
//!
//! [`Executor::run`] validates the task graph and runs the requested targets
//! one after the other. Each task first runs all of its dependencies
//! concurrently, then skips itself if it is up to date, then runs its
//! commands in order. A command may itself be a `^call` of another task.
//!
//! Tasks are not deduplicated: a task reachable through two dependency paths
//! runs once per path.

use crate::config::{Task, Tasks};
use crate::error::{Result, TaskError};
use crate::runner::{
    cycle, Call, CommandRequest, CommandRunner, EnvStore, Reporter, ShellRunner, Step, Stream,
    Templates, Verbosity,
};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Front-end that keeps re-running targets when their sources change
#[async_trait]
pub trait Watcher: Send + Sync {
    async fn watch(&self, executor: Arc<Executor>, targets: Vec<String>) -> Result<()>;
}

/// Runs tasks of a task file
pub struct Executor {
    tasks: Tasks,
    /// Base directory; task directories are relative to it
    dir: String,
    force: bool,
    watch: bool,
    pub(crate) runner: Arc<dyn CommandRunner>,
    watcher: Option<Arc<dyn Watcher>>,
    pub(crate) env: Arc<EnvStore>,
    pub(crate) templates: Templates,
    reporter: Reporter,
    /// Root of every cancellation token handed out during a run
    pub(crate) cancel: CancellationToken,
}

impl Executor {
    /// Create an executor for `tasks` rooted at `dir`
    pub fn new(tasks: Tasks, dir: impl Into<String>) -> Result<Self> {
        Ok(Executor {
            tasks,
            dir: dir.into(),
            force: false,
            watch: false,
            runner: Arc::new(ShellRunner::new()),
            watcher: None,
            env: Arc::new(EnvStore::from_process()),
            templates: Templates::new()?,
            reporter: Reporter::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Run commands even when the task is up to date
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Hand the targets to the watcher instead of running them once
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn with_watcher(mut self, watcher: Arc<dyn Watcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Set the command runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use the given ambient environment instead of the process environment
    pub fn with_env(mut self, env: Arc<EnvStore>) -> Self {
        self.env = env;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.reporter = Reporter::new(verbosity);
        self
    }

    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    /// The ambient environment shared by all invocations
    pub fn env(&self) -> &Arc<EnvStore> {
        &self.env
    }

    /// Token that cancels the whole run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Look up a task by name
    pub fn task(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| TaskError::TaskNotFound(name.to_string()))
    }

    /// Base directory without template expansion
    pub(crate) fn base_dir(&self) -> PathBuf {
        if self.dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.dir)
        }
    }

    /// Whether any task, reachable or not, depends on itself
    pub fn has_cyclic_dep(&self) -> bool {
        cycle::has_cyclic_dep(&self.tasks)
    }

    /// Run the given targets in order, stopping at the first failure
    pub async fn run(self: &Arc<Self>, targets: &[String]) -> Result<()> {
        if self.has_cyclic_dep() {
            return Err(TaskError::CyclicDependencyDetected);
        }

        if let Some(missing) = targets.iter().find(|t| !self.tasks.contains_key(*t)) {
            self.reporter
                .known_tasks(self.tasks.keys().map(String::as_str));
            return Err(TaskError::TaskNotFound(missing.clone()));
        }

        if self.watch {
            let watcher = self.watcher.clone().ok_or(TaskError::WatchUnavailable)?;
            return watcher.watch(Arc::clone(self), targets.to_vec()).await;
        }

        for target in targets {
            self.run_task(Call::new(target.as_str()), self.cancel.clone())
                .await?;
        }
        Ok(())
    }

    /// Run one invocation of a task
    ///
    /// Every top-level target, dependency edge and nested `^call` enters the
    /// engine through here.
    pub fn run_task(
        self: &Arc<Self>,
        call: Call,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, Result<()>> {
        let this = Arc::clone(self);
        async move { this.invoke(call, cancel).await }.boxed()
    }

    async fn invoke(self: Arc<Self>, call: Call, cancel: CancellationToken) -> Result<()> {
        let task = self.task(&call.name)?;
        debug!(task = %call.name, params = ?call.params, "running task");

        self.run_deps(&call, task, &cancel).await?;

        if !self.force && self.is_up_to_date(&call, task).await? {
            self.reporter.up_to_date(&call.name);
            return Ok(());
        }

        for command in &task.cmds {
            self.run_command(&call, task, command, &cancel)
                .await
                .map_err(|err| TaskError::run_failed(call.name.as_str(), err))?;
        }
        Ok(())
    }

    /// Run all dependencies concurrently; the first failure cancels the rest
    async fn run_deps(
        self: &Arc<Self>,
        call: &Call,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if task.deps.is_empty() {
            return Ok(());
        }

        let group = cancel.child_token();
        let mut set = JoinSet::new();
        for dep in &task.deps {
            let this = Arc::clone(self);
            let parent = call.clone();
            let dep = dep.clone();
            let token = group.clone();

            set.spawn(async move {
                let expanded = this.expand(&parent, &dep).await?;
                let dep_call = Call::from_dependency(&expanded)?;
                trace!(task = %parent.name, dep = %dep_call.name, "starting dependency");
                this.run_task(dep_call, token).await
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    debug!(task = %call.name, error = %err, "dependency failed, cancelling siblings");
                    group.cancel();
                    set.shutdown().await;
                    return Err(err);
                }
                Err(join_err) if join_err.is_panic() => {
                    group.cancel();
                    std::panic::resume_unwind(join_err.into_panic());
                }
                Err(_) => {}
            }
        }
        Ok(())
    }

    async fn run_command(
        self: &Arc<Self>,
        call: &Call,
        task: &Task,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let expanded = self.expand(call, command).await?;
        match Step::from_command(expanded)? {
            Step::Call(nested) => self.run_task(nested, cancel.clone()).await,
            Step::Shell(line) => self.run_shell(call, task, &line, cancel).await,
        }
    }

    async fn run_shell(
        &self,
        call: &Call,
        task: &Task,
        line: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let dir = self.task_dir(call, task).await?;
        let env = self.environ(call, task).await?;

        match &task.set {
            None => {
                self.reporter.command(line);
                let request = CommandRequest::new(line, &dir, &env, Stream::Inherit);
                self.runner.run(request, cancel).await?;
            }
            Some(name) => {
                let request = CommandRequest::new(line, &dir, &env, Stream::Capture);
                let output = self.runner.run(request, cancel).await?;
                let value = output.stdout.trim_end();
                debug!(task = %call.name, variable = %name, value, "captured command output");
                self.env.set(name.as_str(), value);
            }
        }
        Ok(())
    }

    /// Working directory of a task: the base directory joined with the
    /// task's own `dir`, both expanded
    pub async fn task_dir(&self, call: &Call, task: &Task) -> Result<PathBuf> {
        let base = self.expand(call, &self.dir).await?;
        let dir = self.expand(call, &task.dir).await?;

        let base = if base.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(base)
        };
        Ok(if dir.is_empty() { base } else { base.join(dir) })
    }

    /// Environment of a task's commands
    ///
    /// The ambient environment followed by the task's overrides in
    /// declaration order; when a key repeats, the last entry wins.
    pub async fn environ(&self, call: &Call, task: &Task) -> Result<Vec<(String, String)>> {
        let mut env = self.env.pairs();
        for (key, value) in &task.env {
            let key = self.expand(call, key).await?;
            let value = self.expand(call, value).await?;
            env.push((key, value));
        }
        Ok(env)
    }
}
