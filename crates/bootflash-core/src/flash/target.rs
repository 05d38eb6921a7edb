//! The seam between the image writer and the storage it writes

use std::path::Path;

use super::WriteProgress;
use crate::partition::ResolvedRegion;

/// Error type returned by targets
pub type TargetError = Box<dyn std::error::Error + Send + Sync>;

/// One region write handed to a target
#[derive(Debug, Clone, Copy)]
pub struct RegionJob<'a> {
    /// Local image file (known to exist)
    pub image_path: &'a Path,
    /// Image size in bytes; exactly this many bytes are copied
    pub image_size: u64,
    /// Placement of the region
    pub region: &'a ResolvedRegion,
    /// Partition node of the region, e.g. `mmcblk0p3`
    pub node: &'a str,
    /// Copy granularity in bytes
    pub block_size: usize,
}

/// Something regions can be written to
///
/// Implementations only move bytes; existence and capacity checks happen in
/// [`super::ImageWriter`] before a target is called.
pub trait RegionTarget {
    /// Human readable name used in reports and errors
    fn describe(&self) -> String;

    /// Copy `job.image_path` into the region
    fn write_region(
        &mut self,
        job: &RegionJob<'_>,
        progress: &mut dyn WriteProgress,
    ) -> Result<(), TargetError>;
}

impl<T: RegionTarget + ?Sized> RegionTarget for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn write_region(
        &mut self,
        job: &RegionJob<'_>,
        progress: &mut dyn WriteProgress,
    ) -> Result<(), TargetError> {
        (**self).write_region(job, progress)
    }
}
