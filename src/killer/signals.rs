// Signal delivery for process termination

use crate::error::ExecutionError;
use crate::exec::run_command;
use nix::sys::signal::Signal;

// `kill` is a shell builtin everywhere, a standalone binary only on some systems
const SHELL: &str = "sh";
const KILL_SCRIPT: &str = r#"kill "$@""#;

/// Anything that can ask a process to exit
pub trait Terminator {
    /// Signal the process identified by `pid`, returning any output the
    /// mechanism produced. Success only means the signal was handed off.
    fn terminate(&self, pid: &str) -> Result<String, ExecutionError>;
}

impl<T: Terminator + ?Sized> Terminator for &T {
    fn terminate(&self, pid: &str) -> Result<String, ExecutionError> {
        (**self).terminate(pid)
    }
}

/// Terminates processes by running `kill -<signal> <pid>` through `sh`
#[derive(Debug, Clone, Copy)]
pub struct KillCommand {
    signal: Signal,
}

impl KillCommand {
    pub const fn new(signal: Signal) -> Self {
        Self { signal }
    }

    fn signal_arg(&self) -> String {
        format!("-{}", self.signal as i32)
    }
}

impl Default for KillCommand {
    /// SIGTERM, so the process gets a chance to shut down cleanly
    fn default() -> Self {
        Self::new(Signal::SIGTERM)
    }
}

impl Terminator for KillCommand {
    fn terminate(&self, pid: &str) -> Result<String, ExecutionError> {
        log::debug!("Sending {} to process {}", self.signal, pid);
        let signal = self.signal_arg();
        run_command(SHELL, &["-c", KILL_SCRIPT, "kill", signal.as_str(), pid])
    }
}
