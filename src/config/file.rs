// YAML configuration file loading

use crate::error::ConfigError;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file location, relative to the home directory
pub const DEFAULT_CONFIG_PATH: &str = ".safariShrink/config.yml";

/// Key holding the memory limit in megabytes
pub const LIMIT_KEY: &str = "limitMB";

/// Top-level entries of a config file, keyed by name
pub type ConfigMap = HashMap<String, Value>;

/// Resolve `path` against the home directory unless it is already absolute
pub fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    dirs::home_dir()
        .map(|home| home.join(path))
        .ok_or(ConfigError::NoHomeDir)
}

/// Load the config file at `path`, resolved against the home directory
pub fn load_config(path: &Path) -> Result<ConfigMap, ConfigError> {
    let path = resolve_path(path)?;
    load_config_file(&path)
}

/// Read and parse a config file. The document root must be a mapping;
/// entries whose key is not a string are dropped with a warning.
pub fn load_config_file(path: &Path) -> Result<ConfigMap, ConfigError> {
    log::debug!("Reading config from {}", path.display());

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let root: Value = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    into_config_map(root)
}

fn into_config_map(root: Value) -> Result<ConfigMap, ConfigError> {
    let Value::Mapping(mapping) = root else {
        return Err(ConfigError::NotMapping);
    };

    let mut config = ConfigMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        match key {
            Value::String(key) => {
                config.insert(key, value);
            }
            other => log::warn!("Key '{}' is not a string - ignoring", describe_key(&other)),
        }
    }

    Ok(config)
}

fn describe_key(key: &Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{key:?}"))
}

/// Read `key` as a positive integer.
///
/// A missing key is `Ok(None)`. Any integer YAML value that fits in an
/// `i64` is accepted; zero, negative, fractional, oversized or non-numeric
/// values are rejected rather than coerced.
pub fn read_positive_int(config: &ConfigMap, key: &str) -> Result<Option<u64>, ConfigError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };

    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    };

    let Value::Number(number) = value else {
        return Err(invalid(format!(
            "expected an integer, found {}",
            value_kind(value)
        )));
    };

    match number.as_i64() {
        Some(n) if n > 0 => Ok(Some(n as u64)),
        Some(n) => Err(invalid(format!("must be positive, got {n}"))),
        None if number.is_u64() => Err(invalid(format!("{number} is out of range"))),
        None => Err(invalid(format!("expected an integer, found {number}"))),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
