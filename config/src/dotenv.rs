//! Parse a project `.env` file into a key-value map. Values are applied to the
//! process environment by `lib.rs`, never here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` path to read: `override_dir` if given, else the current directory.
/// Returns `None` when no regular `.env` file exists there.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    (path.is_file()).then_some(path)
}

/// Strips one layer of matching surrounding quotes. Double-quoted values keep a
/// `\"` escape; single-quoted values are taken literally.
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

/// Minimal `.env` parser: `KEY=VALUE` lines, empty lines and `#` comment lines
/// skipped, keys and values trimmed. No multiline values or `export` prefixes.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), unquote(value.trim()));
    }
    map
}

/// Loads `.env` into a map. A missing file is an empty map, not an error.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse_dotenv(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}
