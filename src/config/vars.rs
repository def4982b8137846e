//! Shared variables file
//!
//! `Taskvars.yml`, `Taskvars.json`, `Taskvars.toml` and `Taskvars.env` are
//! tried in that order next to the task file. The first one that exists wins.

use crate::config::types::scalar_to_string;
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Base name of the shared variables file
pub const VARS_FILE_STEM: &str = "Taskvars";

#[derive(Debug, Clone, Copy)]
enum Format {
    Yaml,
    Json,
    Toml,
    Dotenv,
}

const CANDIDATES: &[(&str, Format)] = &[
    ("yml", Format::Yaml),
    ("json", Format::Json),
    ("toml", Format::Toml),
    ("env", Format::Dotenv),
];

/// Read the shared variables file from `dir`
///
/// Returns an empty mapping when no candidate exists.
pub fn read_vars_file(dir: &Path) -> ConfigResult<HashMap<String, String>> {
    for (extension, format) in CANDIDATES {
        let path = dir.join(format!("{}.{}", VARS_FILE_STEM, extension));
        if !path.is_file() {
            continue;
        }

        return parse_vars(&path, *format).map_err(|error| ConfigError::VarsFile {
            path: path.clone(),
            error,
        });
    }

    Ok(HashMap::new())
}

fn parse_vars(path: &Path, format: Format) -> Result<HashMap<String, String>, String> {
    let read = || fs::read_to_string(path).map_err(|e| e.to_string());

    match format {
        Format::Yaml => {
            let contents = read()?;
            if contents.trim().is_empty() {
                return Ok(HashMap::new());
            }
            let mapping: HashMap<String, serde_yaml::Value> =
                serde_yaml::from_str(&contents).map_err(|e| e.to_string())?;
            mapping
                .into_iter()
                .map(|(key, value)| Ok((key, scalar_to_string(value)?)))
                .collect()
        }
        Format::Json => serde_json::from_str(&read()?).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(&read()?).map_err(|e| e.to_string()),
        Format::Dotenv => dotenvy::from_path_iter(path)
            .map_err(|e| e.to_string())?
            .map(|item| item.map_err(|e| e.to_string()))
            .collect(),
    }
}
