//! Read the `[env]` table from `$XDG_CONFIG_HOME/<app_name>/config.toml`.
//!
//! Lowest-priority config source: values here are applied only when the key is
//! absent from both the process environment and the project `.env`.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::LoadError;

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, toml::Value>,
}

fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = dirs::config_dir()
        .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".to_string()))?;
    Ok(base.join(app_name).join("config.toml"))
}

/// Renders a TOML scalar as the string an env var would hold. Tables and arrays
/// have no env representation and are skipped.
fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Loads the `[env]` table as a string map. A missing file is an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let parsed: ConfigFile = toml::from_str(&content)?;
    Ok(parsed
        .env
        .iter()
        .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_become_env_strings() {
        assert_eq!(
            scalar_to_string(&toml::Value::Float(0.95)).as_deref(),
            Some("0.95")
        );
        assert_eq!(
            scalar_to_string(&toml::Value::Boolean(true)).as_deref(),
            Some("true")
        );
        assert_eq!(
            scalar_to_string(&toml::Value::Integer(500)).as_deref(),
            Some("500")
        );
    }

    #[test]
    fn tables_and_arrays_are_skipped() {
        let content = "[env]\nGOOD = \"x\"\nBAD = [1, 2]\n";
        let parsed: ConfigFile = toml::from_str(content).unwrap();
        let map: HashMap<String, String> = parsed
            .env
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
            .collect();
        assert_eq!(map.get("GOOD").map(String::as_str), Some("x"));
        assert!(!map.contains_key("BAD"));
    }

    #[test]
    fn missing_file_yields_empty_map() {
        let map = load_env_map("promptstrip-xdg-test-nonexistent").unwrap();
        assert!(map.is_empty());
    }
}
