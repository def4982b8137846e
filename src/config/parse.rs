//! Task file discovery, parsing and bootstrapping

use crate::config::types::Tasks;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default task file names to search for
pub const TASK_FILE_NAMES: &[&str] = &["Taskfile.yml", "Taskfile.yaml"];

const INIT_TASK_FILE: &str = r#"# See the README for the full task file reference

default:
  cmds:
    - echo "Hello, World!"
"#;

/// Find the task file by searching current and parent directories
pub fn find_task_file() -> ConfigResult<PathBuf> {
    find_task_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the task file starting from a specific directory
pub fn find_task_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in TASK_FILE_NAMES {
            let path = current_dir.join(file_name);
            searched_paths.push(path.display().to_string());

            if path.is_file() {
                return Ok(path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a task file from a path
pub fn parse_task_file(path: &Path) -> ConfigResult<Tasks> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_tasks(&contents)
}

/// Parse tasks from YAML text
pub fn parse_tasks(yaml: &str) -> ConfigResult<Tasks> {
    // An empty document has no tasks rather than being an error
    if yaml.trim().is_empty() {
        return Ok(Tasks::new());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Find and parse the task file, returning it with the directory it lives in
pub fn load_task_file(explicit: Option<&Path>) -> ConfigResult<(Tasks, PathBuf)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_task_file()?,
    };
    let tasks = parse_task_file(&path)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((tasks, dir))
}

/// Write a starter Taskfile.yml into `dir`
pub fn init_task_file(dir: &Path) -> ConfigResult<PathBuf> {
    let path = dir.join(TASK_FILE_NAMES[0]);
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path));
    }

    fs::write(&path, INIT_TASK_FILE).map_err(|e| {
        ConfigError::Invalid(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(path)
}
