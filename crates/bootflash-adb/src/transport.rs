//! Command transport to the board

use crate::error::{AdbError, Result};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Output of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Exit status, -1 if killed by a signal
    pub status: i32,
}

impl CommandOutput {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Moves files to the board and runs commands on it
pub trait Transport {
    /// Copy a local file to `remote` (a file or directory path on the board)
    fn push(&mut self, local: &Path, remote: &str) -> Result<()>;

    /// Run `argv` in the remote shell
    ///
    /// A non-zero exit status is reported in the output, not as an error.
    fn execute(&mut self, argv: &[&str]) -> Result<CommandOutput>;

    /// Reboot the board
    fn reboot(&mut self) -> Result<()>;

    /// Run `argv` and fail on a non-zero exit status
    fn execute_checked(&mut self, argv: &[&str]) -> Result<CommandOutput> {
        let output = self.execute(argv)?;
        if !output.success() {
            return Err(AdbError::CommandFailed {
                command: argv.join(" "),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn push(&mut self, local: &Path, remote: &str) -> Result<()> {
        (**self).push(local, remote)
    }

    fn execute(&mut self, argv: &[&str]) -> Result<CommandOutput> {
        (**self).execute(argv)
    }

    fn reboot(&mut self) -> Result<()> {
        (**self).reboot()
    }
}

/// Transport backed by the `adb` executable
#[derive(Debug, Clone)]
pub struct AdbTransport {
    program: PathBuf,
    serial: Option<String>,
}

impl AdbTransport {
    /// Talk to the only attached device, or `serial` if given
    pub fn new(serial: Option<String>) -> Self {
        Self {
            program: PathBuf::from("adb"),
            serial,
        }
    }

    /// Use a specific `adb` executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Device serial, if one was selected
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);
        cmd
    }

    fn run(&self, args: &[OsString]) -> Result<Output> {
        let mut cmd = self.command(args);
        debug!("Running {:?}", cmd);

        cmd.output().map_err(|source| AdbError::Spawn {
            program: self.program.display().to_string(),
            source,
        })
    }

    fn run_checked(&self, args: &[OsString]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command: args
                    .iter()
                    .map(|a| a.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" "),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Transport for AdbTransport {
    fn push(&mut self, local: &Path, remote: &str) -> Result<()> {
        self.run_checked(&["push".into(), local.into(), remote.into()])?;
        Ok(())
    }

    fn execute(&mut self, argv: &[&str]) -> Result<CommandOutput> {
        let mut args: Vec<OsString> = vec!["shell".into()];
        args.extend(argv.iter().map(OsString::from));
        let output = self.run(&args)?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }

    fn reboot(&mut self) -> Result<()> {
        self.run_checked(&["reboot".into()])?;
        Ok(())
    }
}
