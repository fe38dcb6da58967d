// Shrinker module - one listing/killing pass over Safari processes

mod service;

pub use service::{RunSummary, Shrinker};

use crate::config::Config;
use crate::killer::KillCommand;
use crate::monitor::PsLister;
use anyhow::Result;
use std::io;

/// Run a pass against the live system, reporting to stdout
pub fn run(config: Config) -> Result<RunSummary> {
    let stdout = io::stdout();
    let mut shrinker = Shrinker::new(
        config,
        PsLister::default(),
        KillCommand::default(),
        stdout.lock(),
    );
    let summary = shrinker.run()?;

    log::debug!(
        "Pass complete: {}MB -> {}MB, {} killed, {} failed",
        summary.total_before_mb,
        summary.total_after_mb,
        summary.killed.len(),
        summary.failed.len()
    );

    Ok(summary)
}
