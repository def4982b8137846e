//! Template expansion for commands, paths and variables
//!
//! Templates use minijinja syntax: `{{ NAME }}` for variables, the builtin
//! filters for string, list and number helpers, plus a few task runner
//! globals:
//!
//! - `OS()` and `ARCH()` - host operating system and architecture
//! - `IsSH()` - always true, kept for task files that branch on the shell
//! - `FromSlash(path)` and `ToSlash(path)` - convert path separators
//! - `ExeExt()` - `.exe` on Windows, empty elsewhere
//!
//! Every delimiter starts with `{{`: blocks are `{{% ... %}}` and comments
//! `{{/* ... */}}`. Shell text such as `${#list}` or `printf '{%s}'` is left
//! alone.
//!
//! Variables are only resolved when a string actually contains a template,
//! so dynamic `$command` values run for rendered strings and nothing else.

use crate::error::Result;
use crate::runner::{Call, Executor};
use minijinja::syntax::SyntaxConfig;
use minijinja::Environment;
use std::collections::HashMap;
use std::path::MAIN_SEPARATOR;

/// Compiled template environment with the task runner functions registered
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Create the template environment
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_syntax(
            SyntaxConfig::builder()
                .block_delimiters("{{%", "%}}")
                .variable_delimiters("{{", "}}")
                .comment_delimiters("{{/*", "*/}}")
                .build()?,
        );
        env.set_keep_trailing_newline(true);

        env.add_function("OS", || std::env::consts::OS.to_string());
        env.add_function("ARCH", || std::env::consts::ARCH.to_string());
        env.add_function("IsSH", || true);
        env.add_function("FromSlash", |path: String| from_slash(&path));
        env.add_function("ToSlash", |path: String| to_slash(&path));
        env.add_function("ExeExt", || exe_ext().to_string());

        Ok(Templates { env })
    }

    /// Render `source` with the given variables
    pub fn render(&self, source: &str, vars: &HashMap<String, String>) -> Result<String> {
        Ok(self.env.render_str(source, vars)?)
    }
}

/// Whether `source` contains anything the template engine would act on
pub fn has_template_syntax(source: &str) -> bool {
    source.contains("{{")
}

/// Platform executable suffix
pub fn exe_ext() -> &'static str {
    if cfg!(windows) {
        ".exe"
    } else {
        ""
    }
}

/// Replace `/` with the platform separator
pub fn from_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace('/', &MAIN_SEPARATOR.to_string())
    }
}

/// Replace the platform separator with `/`
pub fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

impl Executor {
    /// Expand a template with the variables visible to `call`
    pub async fn expand(&self, call: &Call, source: &str) -> Result<String> {
        // Variable resolution may run commands, so skip it for plain text
        if !has_template_syntax(source) {
            return Ok(source.to_string());
        }
        let vars = self.variables(call).await?;
        self.templates.render(source, &vars)
    }

    /// Expand every template of a list, resolving variables once
    pub async fn expand_all(&self, call: &Call, sources: &[String]) -> Result<Vec<String>> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }
        let vars = self.variables(call).await?;
        sources
            .iter()
            .map(|source| self.templates.render(source, &vars))
            .collect()
    }
}
