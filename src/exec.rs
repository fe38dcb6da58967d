// Synchronous external command invocation

use crate::error::ExecutionError;
use std::process::Command;

/// Run `program` with `args` to completion and return its stdout.
///
/// Blocks until the command exits; no timeout is applied. A non-zero exit
/// status is reported as [`ExecutionError::Status`] with whatever the
/// command wrote to stderr.
pub fn run_command(program: &str, args: &[&str]) -> Result<String, ExecutionError> {
    let command_line = describe(program, args);
    log::debug!("Running {command_line}");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ExecutionError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ExecutionError::Status {
            command: command_line,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
