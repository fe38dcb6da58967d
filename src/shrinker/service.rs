// Shrink pass: list, report, and kill until under the limit

use crate::config::Config;
use crate::killer::{should_terminate, Terminator};
use crate::monitor::{ProcessRecord, ProcessSource};
use anyhow::{Context, Result};
use std::cmp::Reverse;
use std::fmt;
use std::io::Write;

/// What a single pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Total usage of all target processes when the pass started
    pub total_before_mb: u64,
    /// Total after subtracting every process signalled successfully
    pub total_after_mb: u64,
    /// PIDs signalled, largest first
    pub killed: Vec<String>,
    /// PIDs whose termination command failed
    pub failed: Vec<String>,
}

/// Runs one pass over the target processes.
///
/// Report lines go to `out`; diagnostics go through `log`.
pub struct Shrinker<S, T, W> {
    config: Config,
    source: S,
    terminator: T,
    out: W,
}

impl<S, T, W> Shrinker<S, T, W>
where
    S: ProcessSource,
    T: Terminator,
    W: Write,
{
    pub fn new(config: Config, source: S, terminator: T, out: W) -> Self {
        Self {
            config,
            source,
            terminator,
            out,
        }
    }

    /// Run the pass. Only a failure to list processes is an error; kill
    /// failures and report write failures are logged and skipped.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut processes = self
            .source
            .list_target_processes()
            .context("Failed to list Safari processes")?;

        processes.sort_by_key(|p| Reverse(p.rss_mb));

        if self.config.list_only {
            return Ok(self.report(&processes));
        }

        Ok(self.shrink(&processes))
    }

    /// Write one report line; a closed or broken `out` must not stop the pass
    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}") {
            log::warn!("Can't write report line: {e}");
        }
    }

    /// Listing mode: every process, largest first, then the total
    fn report(&mut self, processes: &[ProcessRecord]) -> RunSummary {
        for process in processes {
            self.emit(format_args!(
                "Safari process {} uses {}MB.",
                process.pid, process.rss_mb
            ));
        }

        let total = total_usage(processes);
        self.emit(format_args!("Total Safari memory usage is {total}MB."));

        RunSummary {
            total_before_mb: total,
            total_after_mb: total,
            ..RunSummary::default()
        }
    }

    /// Kill mode: `processes` must already be sorted largest first
    fn shrink(&mut self, processes: &[ProcessRecord]) -> RunSummary {
        let limit = self.config.limit_mb;
        let force = self.config.force;
        let mut total = total_usage(processes);

        let mut summary = RunSummary {
            total_before_mb: total,
            ..RunSummary::default()
        };

        if !should_terminate(total, limit, force) {
            log::debug!("Safari uses {total}MB, limit is {limit}MB - nothing to do");
            summary.total_after_mb = total;
            return summary;
        }

        self.emit(format_args!("Total Safari memory usage is {total}MB."));

        for process in processes {
            if !should_terminate(total, limit, force) {
                break;
            }

            log::debug!("Terminating {process}");
            self.emit(format_args!(
                "Killing Safari process {} (uses {}MB)...",
                process.pid, process.rss_mb
            ));

            if self.config.dry_run {
                log::info!("DRY RUN: not signalling process {}", process.pid);
            } else {
                match self.terminator.terminate(&process.pid) {
                    Ok(output) => {
                        let output = output.trim_end();
                        if !output.is_empty() {
                            self.emit(format_args!("{output}"));
                        }
                    }
                    Err(e) => {
                        log::error!("Can't kill process {}: {e}", process.pid);
                        summary.failed.push(process.pid.clone());
                        continue;
                    }
                }
            }

            // No confirmation that the process actually exited
            total = total.saturating_sub(process.rss_mb);
            summary.killed.push(process.pid.clone());
        }

        summary.total_after_mb = total;
        summary
    }
}

fn total_usage(processes: &[ProcessRecord]) -> u64 {
    processes.iter().map(|p| p.rss_mb).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use std::cell::RefCell;
    use std::io;

    struct FakeSource {
        processes: Vec<ProcessRecord>,
        fail: bool,
    }

    impl FakeSource {
        fn new(processes: &[(&str, u64)]) -> Self {
            Self {
                processes: processes
                    .iter()
                    .map(|(pid, mb)| ProcessRecord::new(*pid, *mb))
                    .collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                processes: Vec::new(),
                fail: true,
            }
        }
    }

    impl ProcessSource for FakeSource {
        fn list_target_processes(&self) -> Result<Vec<ProcessRecord>, ExecutionError> {
            if self.fail {
                return Err(ExecutionError::Spawn {
                    command: "ps".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "not found"),
                });
            }
            Ok(self.processes.clone())
        }
    }

    #[derive(Default)]
    struct RecordingTerminator {
        calls: RefCell<Vec<String>>,
        broken: Vec<&'static str>,
        output: &'static str,
    }

    impl Terminator for RecordingTerminator {
        fn terminate(&self, pid: &str) -> Result<String, ExecutionError> {
            self.calls.borrow_mut().push(pid.to_string());
            if self.broken.iter().any(|broken| *broken == pid) {
                return Err(ExecutionError::Spawn {
                    command: format!("kill -15 {pid}"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            Ok(self.output.to_string())
        }
    }

    /// Accepts `remaining` writes, then fails every write with a broken pipe
    struct BrokenPipe {
        remaining: usize,
    }

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            self.remaining -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const SAMPLE: &[(&str, u64)] = &[("p1", 500), ("p2", 3000), ("p3", 6000)];

    fn config(limit_mb: u64) -> Config {
        Config {
            limit_mb,
            ..Config::default()
        }
    }

    fn run_pass(
        config: Config,
        source: &FakeSource,
        terminator: &RecordingTerminator,
    ) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary = Shrinker::new(config, source, terminator, &mut out)
            .run()
            .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_kills_largest_until_under_limit() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();

        let (summary, out) = run_pass(config(8000), &source, &terminator);

        assert_eq!(*terminator.calls.borrow(), vec!["p3"]);
        assert_eq!(summary.killed, vec!["p3"]);
        assert_eq!(summary.total_before_mb, 9500);
        assert_eq!(summary.total_after_mb, 3500);
        assert_eq!(
            out,
            "Total Safari memory usage is 9500MB.\n\
             Killing Safari process p3 (uses 6000MB)...\n"
        );
    }

    #[test]
    fn test_list_mode_reports_largest_first_and_never_kills() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();
        let config = Config {
            list_only: true,
            force: true,
            ..config(1)
        };

        let (summary, out) = run_pass(config, &source, &terminator);

        assert!(terminator.calls.borrow().is_empty());
        assert!(summary.killed.is_empty());
        assert_eq!(
            out,
            "Safari process p3 uses 6000MB.\n\
             Safari process p2 uses 3000MB.\n\
             Safari process p1 uses 500MB.\n\
             Total Safari memory usage is 9500MB.\n"
        );
    }

    #[test]
    fn test_force_kills_everything_in_order() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();
        let config = Config {
            force: true,
            ..config(8000)
        };

        let (summary, _) = run_pass(config, &source, &terminator);

        assert_eq!(*terminator.calls.borrow(), vec!["p3", "p2", "p1"]);
        assert_eq!(summary.total_after_mb, 0);
    }

    #[test]
    fn test_under_limit_is_silent() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();

        let (summary, out) = run_pass(config(9500), &source, &terminator);

        assert!(out.is_empty());
        assert!(terminator.calls.borrow().is_empty());
        assert_eq!(summary.total_after_mb, 9500);
    }

    #[test]
    fn test_failed_kill_moves_on_without_subtracting() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator {
            broken: vec!["p3"],
            ..RecordingTerminator::default()
        };

        let (summary, _) = run_pass(config(1000), &source, &terminator);

        // p3 failed so the total stays at 9500; p2 brings it to 6500, p1 to 6000
        assert_eq!(*terminator.calls.borrow(), vec!["p3", "p2", "p1"]);
        assert_eq!(summary.failed, vec!["p3"]);
        assert_eq!(summary.killed, vec!["p2", "p1"]);
        assert_eq!(summary.total_after_mb, 6000);
    }

    #[test]
    fn test_kill_output_is_echoed() {
        let source = FakeSource::new(&[("42", 9000)]);
        let terminator = RecordingTerminator {
            output: "terminated\n",
            ..RecordingTerminator::default()
        };

        let (_, out) = run_pass(config(8192), &source, &terminator);

        assert!(out.ends_with("Killing Safari process 42 (uses 9000MB)...\nterminated\n"));
    }

    #[test]
    fn test_dry_run_never_signals() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();
        let config = Config {
            dry_run: true,
            ..config(3000)
        };

        let (summary, out) = run_pass(config, &source, &terminator);

        assert!(terminator.calls.borrow().is_empty());
        assert_eq!(summary.killed, vec!["p3", "p2"]);
        assert!(out.contains("Killing Safari process p2 (uses 3000MB)..."));
        assert!(!out.contains("p1"));
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let terminator = RecordingTerminator::default();
        let mut out = Vec::new();

        let result = Shrinker::new(config(8000), FakeSource::failing(), &terminator, &mut out).run();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to list Safari processes"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_closed_stdout_does_not_stop_force_kills() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();
        let config = Config {
            force: true,
            ..config(8000)
        };

        let summary = Shrinker::new(config, &source, &terminator, BrokenPipe { remaining: 2 })
            .run()
            .unwrap();

        assert_eq!(*terminator.calls.borrow(), vec!["p3", "p2", "p1"]);
        assert_eq!(summary.killed, vec!["p3", "p2", "p1"]);
        assert_eq!(summary.total_after_mb, 0);
    }

    #[test]
    fn test_closed_stdout_in_list_mode_still_succeeds() {
        let source = FakeSource::new(SAMPLE);
        let terminator = RecordingTerminator::default();
        let config = Config {
            list_only: true,
            ..config(8000)
        };

        let summary = Shrinker::new(config, &source, &terminator, BrokenPipe { remaining: 0 })
            .run()
            .unwrap();

        assert_eq!(summary.total_before_mb, 9500);
        assert!(terminator.calls.borrow().is_empty());
    }

    #[test]
    fn test_no_processes() {
        let source = FakeSource::new(&[]);
        let terminator = RecordingTerminator::default();
        let config = Config {
            force: true,
            ..config(8000)
        };

        let (summary, out) = run_pass(config, &source, &terminator);

        // Force still prints the total, but there is nothing to kill
        assert_eq!(out, "Total Safari memory usage is 0MB.\n");
        assert!(summary.killed.is_empty());
    }
}
