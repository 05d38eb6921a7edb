//! Error types for image writing

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::TargetError;

/// Errors from loading a partition spec or writing images
#[derive(Debug, Error)]
pub enum FlashError {
    /// Spec file or image file does not exist
    #[error("file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// Partition spec or layout error
    #[error(transparent)]
    Spec(#[from] crate::Error),

    /// Image larger than its declared region (strict mode only)
    #[error("{image} is {image_size} bytes but region '{name}' holds only {capacity} bytes")]
    RegionOverflow {
        /// Region name
        name: String,
        /// Image file name
        image: String,
        /// Image size in bytes
        image_size: u64,
        /// Declared region size in bytes
        capacity: u64,
    },

    /// Copy granularity of zero
    #[error("block size must be greater than zero")]
    InvalidBlockSize,

    /// Reading a local file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The target failed to write a region
    #[error("writing {image} to {target} failed: {source}")]
    Target {
        /// Image file name
        image: String,
        /// Target description
        target: String,
        /// Underlying error
        #[source]
        source: TargetError,
    },
}
