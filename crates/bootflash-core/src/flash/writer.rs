//! Image writer

use std::fs;
use std::path::{Path, PathBuf};

use super::{FlashError, RegionJob, RegionTarget, WriteProgress, DEFAULT_BLOCK_SIZE};
use crate::partition::{PartitionTable, ResolvedLayout, ResolvedRegion};
use crate::size::format_size;

/// Load the partition spec for `device` (or the only one) from an env text file
pub fn load_partition_table(
    path: impl AsRef<Path>,
    device: Option<&str>,
) -> Result<PartitionTable, FlashError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(FlashError::MissingInputFile(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| FlashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = PartitionTable::from_text(&text, device)?;
    log::info!(
        "Loaded {} region(s) for {} from {}",
        table.len(),
        table.device,
        path.display()
    );
    Ok(table)
}

/// Options for region writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Copy granularity in bytes
    pub block_size: usize,
    /// Refuse images larger than their declared region
    ///
    /// Off by default: a declared size only drives layout accounting, and an
    /// image may run past it into the next region.
    pub strict_capacity: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            strict_capacity: false,
        }
    }
}

/// What was written where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Partition node, e.g. `mmcblk0p2`
    pub node: String,
    /// Image file name
    pub image: String,
    /// Byte offset of the region
    pub offset: u64,
    /// Declared region size
    pub region_size: u64,
    /// Bytes copied
    pub image_size: u64,
    /// Space reserved up to and including this region
    pub used: u64,
    /// Offset given in the spec, if any
    pub explicit_offset: Option<u64>,
}

/// Writes images from a directory into the regions of a layout
pub struct ImageWriter<'a, T: RegionTarget + ?Sized> {
    target: &'a mut T,
    layout: &'a ResolvedLayout,
    image_dir: PathBuf,
    options: WriteOptions,
}

impl<'a, T: RegionTarget + ?Sized> ImageWriter<'a, T> {
    /// Writer reading images from the working directory
    pub fn new(target: &'a mut T, layout: &'a ResolvedLayout) -> Self {
        Self {
            target,
            layout,
            image_dir: PathBuf::from("."),
            options: WriteOptions::default(),
        }
    }

    /// Read `<name>.img` files from `dir`
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Override write options
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Write every region in declaration order
    ///
    /// Stops at the first failure; regions written before it stay written.
    pub fn write_all(
        &mut self,
        progress: &mut dyn WriteProgress,
    ) -> Result<Vec<WriteReport>, FlashError> {
        let layout = self.layout;
        let mut reports = Vec::with_capacity(layout.len());
        for region in &layout.regions {
            let path = self.image_dir.join(&region.image);
            reports.push(self.write_region(region, &path, progress)?);
        }
        Ok(reports)
    }

    /// Write a single image into the region named after its file name
    ///
    /// A bare file name is looked up in the image directory; a path with a
    /// directory component is used as given.
    pub fn write_image(
        &mut self,
        image: &Path,
        progress: &mut dyn WriteProgress,
    ) -> Result<WriteReport, FlashError> {
        let name = image
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| crate::Error::RegionNotFound(image.display().to_string()))?;
        let layout = self.layout;
        let region = layout.find_image(name)?;

        let bare = image
            .parent()
            .map_or(true, |p| p.as_os_str().is_empty());
        let path = if bare {
            self.image_dir.join(image)
        } else {
            image.to_path_buf()
        };

        self.write_region(region, &path, progress)
    }

    /// Write `image_path` into `region`
    pub fn write_region(
        &mut self,
        region: &ResolvedRegion,
        image_path: &Path,
        progress: &mut dyn WriteProgress,
    ) -> Result<WriteReport, FlashError> {
        if self.options.block_size == 0 {
            return Err(FlashError::InvalidBlockSize);
        }
        if !image_path.is_file() {
            return Err(FlashError::MissingInputFile(image_path.to_path_buf()));
        }

        let image_size = fs::metadata(image_path)
            .map_err(|source| FlashError::Io {
                path: image_path.to_path_buf(),
                source,
            })?
            .len();

        if image_size > region.size {
            if self.options.strict_capacity {
                return Err(FlashError::RegionOverflow {
                    name: region.name.clone(),
                    image: region.image.clone(),
                    image_size,
                    capacity: region.size,
                });
            }
            log::warn!(
                "{} ({}) is larger than region {} ({}), it will overrun into the next region",
                region.image,
                format_size(image_size),
                region.name,
                format_size(region.size)
            );
        }

        let node = self.layout.partition_node(region);
        let job = RegionJob {
            image_path,
            image_size,
            region,
            node: &node,
            block_size: self.options.block_size,
        };

        log::debug!(
            "Writing {} ({} bytes) to {} at offset {:#x}",
            image_path.display(),
            image_size,
            node,
            region.offset
        );
        progress.writing(&region.image, image_size);
        self.target
            .write_region(&job, progress)
            .map_err(|source| FlashError::Target {
                image: region.image.clone(),
                target: self.target.describe(),
                source,
            })?;

        let report = WriteReport {
            node,
            image: region.image.clone(),
            offset: region.offset,
            region_size: region.size,
            image_size,
            used: region.used,
            explicit_offset: region.explicit_offset,
        };
        progress.complete(&report);
        Ok(report)
    }
}
