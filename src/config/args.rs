// Command-line argument parsing

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

/// Safari Shrink - Safari memory reclaimer
///
/// Sums the resident memory of Safari's web content processes and, when the
/// total exceeds the limit, sends SIGTERM to the largest ones until it no
/// longer does.
#[derive(Parser, Debug, Default)]
#[command(name = "safari-shrink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kill the largest Safari processes when they use too much memory", long_about = None)]
pub struct Args {
    /// Only list Safari processes and their memory usage
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Force kill all Safari processes, regardless of the limit
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Memory limit in MB (overrides the config file and environment)
    #[arg(long = "limit", value_name = "MB", value_parser = clap::value_parser!(u64).range(1..))]
    pub limit_mb: Option<u64>,

    /// Config file, absolute or relative to the home directory
    /// (default: .safariShrink/config.yml)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dry run mode - report what would be killed without sending signals
    #[arg(long = "dryrun")]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

impl Args {
    /// Parse arguments from command line.
    ///
    /// `-h/--help` prints usage to stderr and exits 0; other parse errors
    /// and `--version` behave as clap does by default.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) => {
                if let Some(usage) = usage_request(&e) {
                    eprint!("{usage}");
                    std::process::exit(0);
                }
                e.exit()
            }
        }
    }
}

/// Rendered help text when `err` is a help request rather than a real error
fn usage_request(err: &clap::Error) -> Option<String> {
    matches!(err.kind(), ErrorKind::DisplayHelp).then(|| err.render().to_string())
}
