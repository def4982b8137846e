//! Integration tests for variable resolution

mod common;

use common::{executor, executor_with_env, targets, RecordingRunner};
use std::fs;
use std::sync::Arc;
use taskwright::error::{ConfigError, TaskError};
use taskwright::runner::{Call, EnvStore, Stream};
use tempfile::TempDir;

const TASKS: &str = r#"
show:
  vars:
    X: from-task
    ONLY_TASK: task
  cmds:
    - "echo {{ X }}"
"#;

#[tokio::test]
async fn test_task_vars() {
    let temp_dir = TempDir::new().unwrap();
    let executor = executor(TASKS, temp_dir.path(), Arc::new(RecordingRunner::new()));

    let vars = executor.variables(&Call::new("show")).await.unwrap();
    assert_eq!(vars["X"], "from-task");
    assert_eq!(vars["ONLY_TASK"], "task");
}

#[tokio::test]
async fn test_vars_file_overrides_task_vars() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Taskvars.yml"), "X: from-file\nPORT: 8080\n").unwrap();
    let executor = executor(TASKS, temp_dir.path(), Arc::new(RecordingRunner::new()));

    let vars = executor.variables(&Call::new("show")).await.unwrap();
    assert_eq!(vars["X"], "from-file");
    assert_eq!(vars["PORT"], "8080");
    assert_eq!(vars["ONLY_TASK"], "task");
}

#[tokio::test]
async fn test_environment_overrides_vars_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Taskvars.yml"), "X: from-file\n").unwrap();
    let env: EnvStore = [("X", "from-env")].into_iter().collect();
    let executor = executor_with_env(
        TASKS,
        temp_dir.path(),
        Arc::new(RecordingRunner::new()),
        env,
    );

    let vars = executor.variables(&Call::new("show")).await.unwrap();
    assert_eq!(vars["X"], "from-env");
}

#[tokio::test]
async fn test_params_override_everything() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Taskvars.yml"), "X: from-file\n").unwrap();
    let env: EnvStore = [("X", "from-env")].into_iter().collect();
    let runner = Arc::new(RecordingRunner::new());
    let executor = executor_with_env(TASKS, temp_dir.path(), runner.clone(), env);

    let call = Call::new("show").with_param("X", "from-param");
    let vars = executor.variables(&call).await.unwrap();
    assert_eq!(vars["X"], "from-param");

    assert_eq!(
        executor.expand(&call, "echo {{ X }}").await.unwrap(),
        "echo from-param"
    );
}

#[tokio::test]
async fn test_vars_file_formats() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("Taskvars.toml"),
        "X = \"from-toml\"\nMODE = \"fast\"\n",
    )
    .unwrap();
    let executor = executor(TASKS, temp_dir.path(), Arc::new(RecordingRunner::new()));

    let vars = executor.variables(&Call::new("show")).await.unwrap();
    assert_eq!(vars["X"], "from-toml");
    assert_eq!(vars["MODE"], "fast");
}

#[tokio::test]
async fn test_malformed_vars_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Taskvars.json"), "{ not json").unwrap();
    let executor = executor(TASKS, temp_dir.path(), Arc::new(RecordingRunner::new()));

    let result = executor.variables(&Call::new("show")).await;
    assert!(matches!(
        result,
        Err(TaskError::Config(ConfigError::VarsFile { .. }))
    ));
}

#[tokio::test]
async fn test_variables_of_unknown_task() {
    let temp_dir = TempDir::new().unwrap();
    let executor = executor(TASKS, temp_dir.path(), Arc::new(RecordingRunner::new()));

    let result = executor.variables(&Call::new("ghost")).await;
    assert!(matches!(result, Err(TaskError::TaskNotFound(name)) if name == "ghost"));
}

#[tokio::test]
async fn test_dynamic_variable() {
    let yaml = r#"
show:
  vars:
    WHO: $whoami
  cmds:
    - "echo {{ WHO }}"
"#;
    let temp_dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new().with_output("whoami", "  alice  \n"));
    let executor = executor(yaml, temp_dir.path(), runner.clone());

    executor.run(&targets(&["show"])).await.unwrap();

    let lookup = runner.find("whoami").unwrap();
    assert_eq!(lookup.stdout, Stream::Capture);
    assert_eq!(lookup.dir, temp_dir.path());
    assert!(runner.find("echo alice").is_some());
}

#[tokio::test]
async fn test_dynamic_param() {
    let temp_dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new().with_output("date", "2024-01-01\n"));
    let executor = executor(TASKS, temp_dir.path(), runner.clone());

    let call = Call::new("show").with_param("X", "$date");
    let vars = executor.variables(&call).await.unwrap();
    assert_eq!(vars["X"], "2024-01-01");
}

#[tokio::test]
async fn test_dynamic_values() {
    let temp_dir = TempDir::new().unwrap();
    let runner = Arc::new(
        RecordingRunner::new()
            .with_output("one-line", "hello\n")
            .with_output("no-newline", "hello")
            .with_output("silent", "")
            .with_output("two-lines", "a\nb\n")
            .with_output("blank-line", "hello\n\n"),
    );
    let executor = executor(TASKS, temp_dir.path(), runner.clone());

    assert_eq!(executor.resolve_value("$one-line").await.unwrap(), "hello");
    assert_eq!(executor.resolve_value("$no-newline").await.unwrap(), "hello");
    assert_eq!(executor.resolve_value("$silent").await.unwrap(), "");
    assert_eq!(executor.resolve_value("plain").await.unwrap(), "plain");

    let result = executor.resolve_value("$two-lines").await;
    assert!(matches!(result, Err(TaskError::MultilineResult(cmd)) if cmd == "two-lines"));

    let result = executor.resolve_value("$blank-line").await;
    assert!(matches!(result, Err(TaskError::MultilineResult(_))));
}

#[tokio::test]
async fn test_multiline_variable_fails_task() {
    let yaml = r#"
show:
  vars:
    LIST: $ls
  cmds:
    - "echo {{ LIST }}"
"#;
    let temp_dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new().with_output("ls", "a\nb\n"));
    let executor = executor(yaml, temp_dir.path(), runner.clone());

    let result = executor.run(&targets(&["show"])).await;
    match result {
        Err(TaskError::TaskRunFailed { task, source }) => {
            assert_eq!(task, "show");
            assert!(matches!(*source, TaskError::MultilineResult(_)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(runner.commands(), vec!["ls"]);
}

#[tokio::test]
async fn test_plain_commands_skip_variable_resolution() {
    let yaml = r#"
show:
  vars:
    SLOW: $expensive
  cmds:
    - echo plain
"#;
    let temp_dir = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::new());
    let executor = executor(yaml, temp_dir.path(), runner.clone());

    executor.run(&targets(&["show"])).await.unwrap();
    assert_eq!(runner.commands(), vec!["echo plain"]);
}
