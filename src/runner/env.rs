//! Ambient environment shared by every invocation of a run
//!
//! Seeded from the process environment. Tasks with a `set` variable write
//! their captured output here, and every later variable resolution and
//! spawned command sees it. Each read and write takes the lock on its own,
//! so a sibling dependency may observe a capture before or after it lands.

use std::collections::BTreeMap;
use std::env;
use parking_lot::RwLock;

/// Synchronized key-value view of the ambient environment
#[derive(Debug, Default)]
pub struct EnvStore {
    vars: RwLock<BTreeMap<String, String>>,
}

impl EnvStore {
    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Get a variable value
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }

    /// Set a variable, visible to everything that reads the store afterwards
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    /// All variables, ordered by name
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.read().clone()
    }

    /// All variables as `(key, value)` pairs ready for a child process
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.snapshot().into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvStore {
            vars: RwLock::new(
                iter.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}
