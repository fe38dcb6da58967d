// Configuration module

mod args;
mod env;
pub mod file;

pub use args::Args;
pub use file::{load_config, load_config_file, read_positive_int, ConfigMap};

use file::{DEFAULT_CONFIG_PATH, LIMIT_KEY};
use std::path::Path;

/// Memory limit used when nothing overrides it (8 GiB, in MB)
pub const DEFAULT_LIMIT_MB: u64 = 8 * 1024;

/// Effective configuration for one run, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Total Safari memory above which processes are killed
    pub limit_mb: u64,

    // Run mode
    pub list_only: bool, // Report usage, never kill
    pub force: bool,     // Kill regardless of the limit
    pub dry_run: bool,   // Announce kills without signalling
}

impl Config {
    /// Create configuration from command-line arguments.
    ///
    /// Layers, lowest precedence first: built-in default, config file,
    /// environment, `--limit`. A layer that fails to load is reported and
    /// skipped; this never fails.
    pub fn from_args(args: Args) -> Self {
        let mut config = Self {
            list_only: args.list,
            force: args.force,
            dry_run: args.dry_run,
            ..Self::default()
        };

        let config_path = args
            .config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        if let Some(limit_mb) = limit_from_file(config_path) {
            config.limit_mb = limit_mb;
        }

        config = env::apply_env_overrides(config);

        if let Some(limit_mb) = args.limit_mb {
            config.limit_mb = limit_mb;
        }

        log::debug!("Effective configuration: {config:?}");
        config
    }
}

fn limit_from_file(path: &Path) -> Option<u64> {
    let map = match load_config(path) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("Can't read config: {e}");
            return None;
        }
    };

    match read_positive_int(&map, LIMIT_KEY) {
        Ok(limit_mb) => limit_mb,
        Err(e) => {
            log::warn!("Ignoring config value: {e}");
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit_mb: DEFAULT_LIMIT_MB,
            list_only: false,
            force: false,
            dry_run: false,
        }
    }
}
