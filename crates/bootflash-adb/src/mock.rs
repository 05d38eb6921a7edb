//! Recording transport for tests

use crate::error::Result;
use crate::transport::{CommandOutput, Transport};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Push(PathBuf, String),
    Exec(String),
    Reboot,
}

/// Records every call; `id` answers with `id_output`, anything else succeeds
pub struct MockTransport {
    pub calls: Vec<Call>,
    pub id_output: String,
    pub fail_on: Option<&'static str>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            id_output: "uid=0(root) gid=0(root)".into(),
            fail_on: None,
        }
    }

    pub fn commands(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Exec(cmd) => Some(cmd.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn pushes(&self) -> Vec<(&Path, &str)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Push(local, remote) => Some((local.as_path(), remote.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl Transport for MockTransport {
    fn push(&mut self, local: &Path, remote: &str) -> Result<()> {
        self.calls.push(Call::Push(local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    fn execute(&mut self, argv: &[&str]) -> Result<CommandOutput> {
        let cmd = argv.join(" ");
        self.calls.push(Call::Exec(cmd.clone()));
        if argv.first() == Some(&"id") {
            return Ok(CommandOutput {
                stdout: self.id_output.clone(),
                ..CommandOutput::default()
            });
        }
        let status = match self.fail_on {
            Some(prefix) if cmd.starts_with(prefix) => 1,
            _ => 0,
        };
        Ok(CommandOutput {
            stderr: if status == 0 { String::new() } else { "failed".into() },
            status,
            ..CommandOutput::default()
        })
    }

    fn reboot(&mut self) -> Result<()> {
        self.calls.push(Call::Reboot);
        Ok(())
    }
}
