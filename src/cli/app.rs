//! Main CLI application

use crate::config::{init_task_file, load_task_file, Tasks};
use crate::logging::init_logging;
use crate::runner::{Executor, Reporter, Verbosity};
use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Target run when none is given on the command line
pub const DEFAULT_TARGET: &str = "default";

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "taskwright", version, about = "Run tasks declared in a Taskfile.yml")]
pub struct Cli {
    /// Tasks to run, in order
    #[arg(value_name = "TASK")]
    pub targets: Vec<String>,

    /// Run tasks even when they are up to date
    #[arg(short, long)]
    pub force: bool,

    /// Re-run the targets whenever their sources change
    #[arg(short, long)]
    pub watch: bool,

    /// Create a starter Taskfile.yml in the current directory
    #[arg(short, long)]
    pub init: bool,

    /// Path to the task file
    #[arg(short, long, value_name = "FILE")]
    pub taskfile: Option<PathBuf>,

    /// List the tasks of the task file
    #[arg(short, long)]
    pub list: bool,

    /// Only print command output and errors
    #[arg(short, long, conflicts_with_all = ["silent", "verbose"])]
    pub quiet: bool,

    /// Print no diagnostics
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Print verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Verbosity level from the flags
    pub fn verbosity(&self) -> Verbosity {
        if self.silent {
            Verbosity::Silent
        } else if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Requested targets, or the default target when there are none
    pub fn targets(&self) -> Vec<String> {
        if self.targets.is_empty() {
            debug!("no target given, running \"{}\"", DEFAULT_TARGET);
            vec![DEFAULT_TARGET.to_string()]
        } else {
            self.targets.clone()
        }
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let reporter = Reporter::new(cli.verbosity());

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "taskwright", &mut io::stdout());
        return Ok(());
    }

    if cli.init {
        let dir = env::current_dir().context("failed to get current directory")?;
        let path = init_task_file(&dir)?;
        reporter.info(&format!("Created {}", path.display()));
        return Ok(());
    }

    let (tasks, dir) =
        load_task_file(cli.taskfile.as_deref()).context("failed to load task file")?;

    if cli.list {
        list_tasks(&reporter, &tasks);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(execute(&cli, tasks, dir))
}

fn list_tasks(reporter: &Reporter, tasks: &Tasks) {
    reporter.task_list(
        tasks
            .iter()
            .map(|(name, task)| (name.as_str(), task.desc.as_str())),
    );
}

async fn execute(cli: &Cli, tasks: Tasks, dir: PathBuf) -> Result<()> {
    let executor = Arc::new(
        Executor::new(tasks, dir.to_string_lossy())?
            .with_force(cli.force)
            .with_watch(cli.watch)
            .with_verbosity(cli.verbosity()),
    );

    let cancel = executor.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling running commands");
            cancel.cancel();
        }
    });

    executor.run(&cli.targets()).await?;
    Ok(())
}
