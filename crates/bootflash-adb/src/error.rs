//! Error types for debug-bridge operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Debug-bridge errors
#[derive(Debug, Error)]
pub enum AdbError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bridge executable could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        /// Executable name
        program: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A bridge or remote command exited unsuccessfully
    #[error("Command '{command}' failed (status {status}): {stderr}")]
    CommandFailed {
        /// Command line as run
        command: String,
        /// Exit status, -1 if killed by a signal
        status: i32,
        /// Captured error output
        stderr: String,
    },

    /// The remote shell does not run as root
    #[error("Root privileges required on the device (id: {0})")]
    PermissionDenied(String),

    /// Local input missing
    #[error("Not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Walking the module tree failed
    #[error("Failed to walk module tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Result type for debug-bridge operations
pub type Result<T> = std::result::Result<T, AdbError>;
