//! Dependency cycle detection
//!
//! Checked once per run over every task of the file, reachable or not.

use crate::config::Tasks;
use crate::runner::template::has_template_syntax;
use crate::runner::{parse_call, CALL_PREFIX};
use std::collections::HashSet;

/// Whether the dependency graph of `tasks` contains a cycle
///
/// A dependency whose call parameters cannot be parsed counts as a cycle.
/// Dependencies on tasks that do not exist are leaves; running them reports
/// the missing task.
pub fn has_cyclic_dep(tasks: &Tasks) -> bool {
    let mut on_stack = HashSet::new();
    let mut finished = HashSet::new();

    tasks
        .keys()
        .any(|name| visit(tasks, name, &mut on_stack, &mut finished))
}

/// Depth-first walk; `on_stack` holds the current path, `finished` the tasks
/// whose whole subtree is known to be acyclic
fn visit(
    tasks: &Tasks,
    name: &str,
    on_stack: &mut HashSet<String>,
    finished: &mut HashSet<String>,
) -> bool {
    if on_stack.contains(name) {
        return true;
    }
    if finished.contains(name) {
        return false;
    }
    let Some(task) = tasks.get(name) else {
        return false;
    };

    on_stack.insert(name.to_string());
    for dep in &task.deps {
        let cyclic = match dependency_name(dep) {
            Some(dep_name) => visit(tasks, dep_name, on_stack, finished),
            None => true,
        };
        if cyclic {
            return true;
        }
    }
    on_stack.remove(name);
    finished.insert(name.to_string());

    false
}

/// Name of the task a raw dependency refers to
///
/// Parameters are only validated when they hold no template; templated ones
/// are checked after expansion, when the dependency runs. `None` when the
/// parameters are malformed.
fn dependency_name(dep: &str) -> Option<&str> {
    let Some(rest) = dep.strip_prefix(CALL_PREFIX) else {
        return Some(dep);
    };
    let (name, params) = rest.split_once(' ').unwrap_or((rest, ""));
    if !has_template_syntax(params) && parse_call(dep).is_err() {
        return None;
    }
    Some(name)
}
