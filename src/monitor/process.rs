// Safari content process discovery

use crate::error::ExecutionError;
use crate::exec::run_command;

/// Command-path suffix identifying Safari's per-tab content processes
pub const TARGET_PROCESS_SUFFIX: &str = "com.apple.WebKit.WebContent";

const PS_PROGRAM: &str = "ps";
const PS_ARGS: &[&str] = &["ax", "-o", "pid,rss,command"];

/// One target process as reported by `ps`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    /// Process id exactly as `ps` printed it; only ever re-emitted
    pub pid: String,
    /// Resident memory in whole megabytes (KiB / 1024, rounded down)
    pub rss_mb: u64,
}

impl ProcessRecord {
    pub fn new(pid: impl Into<String>, rss_mb: u64) -> Self {
        Self {
            pid: pid.into(),
            rss_mb,
        }
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PID {}: {} MB", self.pid, self.rss_mb)
    }
}

/// Anything that can produce the current set of target processes
pub trait ProcessSource {
    fn list_target_processes(&self) -> Result<Vec<ProcessRecord>, ExecutionError>;
}

impl<S: ProcessSource + ?Sized> ProcessSource for &S {
    fn list_target_processes(&self) -> Result<Vec<ProcessRecord>, ExecutionError> {
        (**self).list_target_processes()
    }
}

/// Lists target processes by running `ps`
#[derive(Debug, Clone)]
pub struct PsLister {
    suffix: String,
}

impl PsLister {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for PsLister {
    fn default() -> Self {
        Self::new(TARGET_PROCESS_SUFFIX)
    }
}

impl ProcessSource for PsLister {
    fn list_target_processes(&self) -> Result<Vec<ProcessRecord>, ExecutionError> {
        let output = run_command(PS_PROGRAM, PS_ARGS)?;
        let processes = parse_listing(&output, &self.suffix);
        log::debug!("Found {} target process(es)", processes.len());
        Ok(processes)
    }
}

/// Parse `pid rss command` rows, keeping those whose command ends with `suffix`.
///
/// Rows with fewer than three columns or a foreign command are skipped
/// silently, which also drops the header. A matching row whose RSS column
/// is not an integer is skipped with a warning.
pub fn parse_listing(output: &str, suffix: &str) -> Vec<ProcessRecord> {
    output
        .lines()
        .filter_map(|line| parse_line(line, suffix))
        .collect()
}

fn parse_line(line: &str, suffix: &str) -> Option<ProcessRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 3 || !fields[2].ends_with(suffix) {
        return None;
    }

    match fields[1].parse::<u64>() {
        Ok(rss_kb) => Some(ProcessRecord::new(fields[0], rss_kb / 1024)),
        Err(e) => {
            log::warn!("Can't parse \"{}\": {e}", line.trim());
            None
        }
    }
}
