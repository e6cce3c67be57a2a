//! Child-process rebuild execution.
//!
//! The watch core only knows the `RebuildRunner` trait; this is the
//! production implementation. It runs the configured command with
//! inherited stdio so build output reaches the developer, and treats a
//! non-zero exit as a failed rebuild.

use kiln_core::{RebuildError, RebuildRunner};
use std::process::Command;
use tracing::{debug, info};

/// Runs the configured rebuild command as a child process.
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    /// Builds a runner from an argv-style command line.
    pub fn new(argv: &[String]) -> Result<Self, RebuildError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| RebuildError::failed("rebuild command is empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// The command line as the user would type it.
    pub fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl RebuildRunner for CommandRunner {
    fn rebuild(&self) -> Result<(), RebuildError> {
        info!("rebuilding: {}", self.describe());
        let status = Command::new(&self.program).args(&self.args).status()?;
        if status.success() {
            debug!("rebuild succeeded");
            Ok(())
        } else {
            Err(RebuildError::CommandFailed { status })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let err = CommandRunner::new(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_describe_joins_program_and_args() {
        let runner =
            CommandRunner::new(&["cargo".to_string(), "check".to_string()]).unwrap();
        assert_eq!(runner.describe(), "cargo check");
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_command_is_ok() {
        let runner = CommandRunner::new(&["true".to_string()]).unwrap();
        assert!(runner.rebuild().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_its_status() {
        let runner = CommandRunner::new(&["false".to_string()]).unwrap();
        let err = runner.rebuild().unwrap_err();
        assert!(matches!(err, RebuildError::CommandFailed { .. }));
    }

    #[test]
    fn test_missing_program_reports_launch_failure() {
        let runner =
            CommandRunner::new(&["kiln-test-no-such-program".to_string()]).unwrap();
        let err = runner.rebuild().unwrap_err();
        assert!(matches!(err, RebuildError::Launch(_)));
    }
}
