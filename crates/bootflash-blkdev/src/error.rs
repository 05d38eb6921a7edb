//! Error types for block device access

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Block device errors
#[derive(Debug, Error)]
pub enum BlockDevError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Destination could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    OpenFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// BLKGETSIZE64 failed
    #[error("Failed to query size of {}: {source}", path.display())]
    SizeQueryFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: nix::errno::Errno,
    },

    /// The copy would run past the end of the device
    #[error("Write of {len} bytes at offset {offset:#x} exceeds device size {device_size:#x}")]
    OutOfRange {
        /// Destination offset
        offset: u64,
        /// Bytes to write
        len: u64,
        /// Device size in bytes
        device_size: u64,
    },

    /// Seek error
    #[error("Seek to offset {offset:#x} failed: {source}")]
    SeekFailed {
        /// Destination offset
        offset: u64,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Write error
    #[error("Write of {len} bytes at offset {offset:#x} failed: {source}")]
    WriteFailed {
        /// Destination offset of the failed chunk
        offset: u64,
        /// Chunk length
        len: usize,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Block size of zero
    #[error("Block size must be greater than zero")]
    InvalidBlockSize,

    /// Missing required parameter
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Result type for block device operations
pub type Result<T> = std::result::Result<T, BlockDevError>;
