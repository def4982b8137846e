//! User-facing diagnostics
//!
//! Everything the engine tells the user goes to stderr, so task output on
//! stdout stays clean.

use colored::Colorize;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

/// Prints engine diagnostics according to the verbosity level
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbosity: Verbosity,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Reporter { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Echo a command line before it runs
    pub fn command(&self, command: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", command.bold());
        }
    }

    /// A task was skipped because it is up to date
    pub fn up_to_date(&self, task: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", format!("task: Task \"{}\" is up to date", task).green());
        }
    }

    /// Remind the user which tasks exist, e.g. after a typo
    pub fn known_tasks<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        if self.verbosity < Verbosity::Quiet {
            return;
        }
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();

        eprintln!("{}", "task: Available tasks for this project:".yellow());
        for name in names {
            eprintln!("* {}", name);
        }
    }

    /// Print the task listing for `--list`, sorted by name
    pub fn task_list<'a>(&self, tasks: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let mut tasks: Vec<(&str, &str)> = tasks.into_iter().collect();
        tasks.sort_unstable();

        let width = tasks.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, desc) in tasks {
            if desc.is_empty() {
                println!("* {}", name.cyan());
            } else {
                println!("* {}  {}", format!("{:width$}", name).cyan(), desc);
            }
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(Reporter::default().verbosity(), Verbosity::Normal);
    }
}
