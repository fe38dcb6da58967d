// Environment variable configuration support

use super::Config;
use anyhow::{bail, Context, Result};
use std::env;

/// Memory limit override, in MB
pub const LIMIT_ENV: &str = "SAFARI_SHRINK_LIMIT_MB";

/// Apply environment variable overrides to configuration.
///
/// An unparsable value is logged and ignored.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |name| env::var(name).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = lookup(LIMIT_ENV) {
        match parse_limit(&val) {
            Ok(limit_mb) => config.limit_mb = limit_mb,
            Err(e) => log::warn!("Ignoring {LIMIT_ENV}: {e:#}"),
        }
    }
    config
}

fn parse_limit(s: &str) -> Result<u64> {
    let limit: u64 = s
        .trim()
        .parse()
        .with_context(|| format!("invalid limit value '{s}'"))?;
    if limit == 0 {
        bail!("limit must be positive");
    }
    Ok(limit)
}
