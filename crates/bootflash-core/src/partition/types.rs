//! Partition spec types

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::size::format_size_compact;

/// File extension appended to a region name to find its image
pub const IMAGE_EXTENSION: &str = ".img";

/// Key that introduces a partition spec line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKey {
    /// `blkdevparts=` (eMMC layouts, kernel command line style)
    Blkdevparts,
    /// `sd_parts=` (SD card layouts)
    SdParts,
}

impl SpecKey {
    /// All recognized keys
    pub const ALL: [SpecKey; 2] = [SpecKey::Blkdevparts, SpecKey::SdParts];

    /// Key text without the trailing `=`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blkdevparts => "blkdevparts",
            Self::SdParts => "sd_parts",
        }
    }
}

impl fmt::Display for SpecKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared region of a partition spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    /// Region name (word characters only)
    pub name: String,
    /// Declared size in bytes
    pub size: u64,
    /// Explicit placement, `None` to follow the previous region
    pub offset: Option<u64>,
}

impl RegionDescriptor {
    /// Region placed right after the previous one
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            offset: None,
        }
    }

    /// Region placed at an explicit byte offset
    pub fn at(name: impl Into<String>, size: u64, offset: u64) -> Self {
        Self {
            name: name.into(),
            size,
            offset: Some(offset),
        }
    }

    /// Source image file name for this region (`<name>.img`)
    pub fn image_name(&self) -> String {
        format!("{}{}", self.name, IMAGE_EXTENSION)
    }
}

/// Regions of one storage device, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    /// Key the spec line used
    pub key: SpecKey,
    /// Device key, e.g. `mmcblk0`
    pub device: String,
    /// Regions; position + 1 is the partition number
    pub regions: Vec<RegionDescriptor>,
}

impl PartitionTable {
    /// Create an empty table for a device
    pub fn new(key: SpecKey, device: impl Into<String>) -> Self {
        Self {
            key,
            device: device.into(),
            regions: Vec::new(),
        }
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the table declares no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl fmt::Display for PartitionTable {
    /// Renders the table back into spec line form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:", self.key, self.device)?;
        for (i, region) in self.regions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", format_size_compact(region.size))?;
            if let Some(offset) = region.offset {
                write!(f, "@{}", format_size_compact(offset))?;
            }
            write!(f, "({})", region.name)?;
        }
        Ok(())
    }
}
