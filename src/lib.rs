// Safari Shrink - Safari memory reclaimer library

pub mod config;
pub mod error;
pub mod exec;
pub mod killer;
pub mod monitor;
pub mod shrinker;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, ExecutionError};
pub use monitor::ProcessRecord;
