// Error types shared by the lister, terminator and configuration loader

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// An external command could not be run, or ran and reported failure
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The command could not be started at all
    #[error("can't run \"{command}\": {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully
    #[error("\"{command}\" failed ({status}){}", format_stderr(.stderr))]
    Status {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// The configuration file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't determine the home directory")]
    NoHomeDir,

    #[error("can't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("root is not a mapping")]
    NotMapping,

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
