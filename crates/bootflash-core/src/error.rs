//! Error types for bootflash-core
//!
//! This module provides a no_std compatible error type shared by the
//! partition spec parser, the layout planner and the env image codec.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Size errors
    /// Text is not a `<digits><B|K|M|G>` size literal
    InvalidSize(String),

    // Partition spec errors
    /// A comma-separated token matches neither `SIZE@OFFSET(NAME)` nor `SIZE(NAME)`
    MalformedPartitionToken {
        /// Zero-based position of the token in the line
        index: usize,
        /// The offending token text
        token: String,
    },
    /// Line does not start with `blkdevparts=<dev>:` or `sd_parts=<dev>:`
    NotAPartitionSpec,
    /// A partition spec line declares no regions
    EmptyPartitionSpec,
    /// No partition spec line in the input
    NoPartitionSpec,
    /// More than one partition spec line and no device key was requested
    AmbiguousPartitionSpec {
        /// Device keys of every candidate line, in file order
        devices: Vec<String>,
    },
    /// The requested device key has no partition spec line
    DeviceNotFound(String),

    // Layout errors
    /// No region maps to the requested image name
    RegionNotFound(String),
    /// Offset arithmetic left the u64 range
    LayoutOverflow,

    // Environment image errors
    /// Encoded variables do not fit in the payload area
    EnvironmentOverflow {
        /// Bytes the variables need, up to and including the one that failed
        needed: usize,
        /// Payload bytes available
        capacity: usize,
    },
    /// Image size cannot even hold the header
    EnvironmentTooSmall {
        /// Requested image size
        size: usize,
        /// Header bytes (checksum plus optional flag)
        header: usize,
    },
    /// Stored checksum does not match the payload
    ChecksumMismatch {
        /// CRC read from the image
        stored: u32,
        /// CRC computed over the payload
        computed: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize(s) => write!(f, "invalid size '{}' (expected e.g. 512K, 1M, 2G)", s),
            Self::MalformedPartitionToken { index, token } => write!(
                f,
                "malformed partition token #{} '{}' (expected SIZE(NAME) or SIZE@OFFSET(NAME))",
                index + 1,
                token
            ),
            Self::NotAPartitionSpec => {
                write!(f, "not a partition spec (expected blkdevparts=<dev>: or sd_parts=<dev>:)")
            }
            Self::EmptyPartitionSpec => write!(f, "partition spec declares no regions"),
            Self::NoPartitionSpec => write!(f, "no blkdevparts= or sd_parts= line found"),
            Self::AmbiguousPartitionSpec { devices } => write!(
                f,
                "multiple partition specs found ({}), select one with a device key",
                devices.join(", ")
            ),
            Self::DeviceNotFound(dev) => write!(f, "no partition spec for device '{}'", dev),
            Self::RegionNotFound(image) => write!(f, "no partition entry for image '{}'", image),
            Self::LayoutOverflow => write!(f, "partition layout exceeds addressable size"),
            Self::EnvironmentOverflow { needed, capacity } => write!(
                f,
                "environment needs {} bytes but only {} fit in the target storage",
                needed, capacity
            ),
            Self::EnvironmentTooSmall { size, header } => write!(
                f,
                "environment size {} is smaller than its {} byte header",
                size, header
            ),
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "environment checksum mismatch: stored 0x{:08X}, computed 0x{:08X}",
                stored, computed
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
