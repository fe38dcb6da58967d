// Safari Shrink - Main entry point

use safari_shrink::config::{Args, Config};
use safari_shrink::shrinker;
use std::process;

/// Diagnostics go to stderr; `RUST_LOG` overrides the level
fn setup_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    // -h/--help exits here
    let args = Args::parse_args();

    setup_logging(args.debug);

    // Config problems are reported and fall back to defaults
    let config = Config::from_args(args);

    // Only a failed process listing is fatal
    if let Err(e) = shrinker::run(config) {
        eprintln!("Fatal error: {e:#}");
        process::exit(1);
    }
}
