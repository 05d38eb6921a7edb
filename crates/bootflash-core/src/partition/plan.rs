//! Layout planning
//!
//! Turns a [`PartitionTable`] into concrete placements. The running offset
//! advances by every region's declared size, including regions with an
//! explicit offset: `256K(a),1M@2M(b),8M(c)` puts `c` at 1280K, not at 3M.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::{PartitionTable, RegionDescriptor};
use crate::error::{Error, Result};

/// A region with its final placement
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ResolvedRegion {
    /// 1-based partition number
    pub number: u32,
    /// Region name
    pub name: String,
    /// Source image file name
    pub image: String,
    /// Byte offset the image is written to
    pub offset: u64,
    /// Declared size in bytes
    pub size: u64,
    /// Offset given in the spec, if any
    #[cfg_attr(feature = "std", serde(skip_serializing_if = "Option::is_none"))]
    pub explicit_offset: Option<u64>,
    /// Space reserved by this and all previous regions
    pub used: u64,
}

/// Fold state threaded through planning
#[derive(Debug, Clone, Copy)]
struct PlanState {
    global_offset: u64,
    number: u32,
}

impl Default for PlanState {
    fn default() -> Self {
        Self {
            global_offset: 0,
            number: 1,
        }
    }
}

impl PlanState {
    fn place(self, desc: &RegionDescriptor) -> Result<(ResolvedRegion, PlanState)> {
        let used = self
            .global_offset
            .checked_add(desc.size)
            .ok_or(Error::LayoutOverflow)?;

        let region = ResolvedRegion {
            number: self.number,
            name: desc.name.clone(),
            image: desc.image_name(),
            offset: desc.offset.unwrap_or(self.global_offset),
            size: desc.size,
            explicit_offset: desc.offset,
            used,
        };

        let next = PlanState {
            global_offset: used,
            number: self.number + 1,
        };
        Ok((region, next))
    }
}

/// Concrete placement of every region of one device
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct ResolvedLayout {
    /// Device key, e.g. `mmcblk0`
    pub device: String,
    /// Regions in declaration order
    #[cfg_attr(feature = "std", serde(rename = "region"))]
    pub regions: Vec<ResolvedRegion>,
}

impl ResolvedLayout {
    /// Assign offsets and partition numbers to every region of `table`
    pub fn plan(table: &PartitionTable) -> Result<Self> {
        let (_, regions) = table.regions.iter().try_fold(
            (PlanState::default(), Vec::with_capacity(table.len())),
            |(state, mut regions), desc| {
                let (region, next) = state.place(desc)?;
                regions.push(region);
                Ok::<_, Error>((next, regions))
            },
        )?;

        Ok(Self {
            device: table.device.clone(),
            regions,
        })
    }

    /// Find the region flashed from `image` (e.g. `boot.img`)
    ///
    /// Regions are scanned in declaration order and the first match wins.
    pub fn find_image(&self, image: &str) -> Result<&ResolvedRegion> {
        self.regions
            .iter()
            .find(|r| r.image == image)
            .ok_or_else(|| Error::RegionNotFound(image.to_string()))
    }

    /// Device node name of a region's partition (`mmcblk0p3`, `sda3`)
    pub fn partition_node(&self, region: &ResolvedRegion) -> String {
        let separator = if self.device.ends_with(|c: char| c.is_ascii_digit()) {
            "p"
        } else {
            ""
        };
        format!("{}{}{}", self.device, separator, region.number)
    }

    /// Space reserved by all regions together
    pub fn total_reserved(&self) -> u64 {
        self.regions.last().map_or(0, |r| r.used)
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the layout has no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::SpecKey;
    use crate::size::{KIB, MIB};

    fn table(regions: &[RegionDescriptor]) -> PartitionTable {
        PartitionTable {
            key: SpecKey::Blkdevparts,
            device: "mmcblk0".into(),
            regions: regions.to_vec(),
        }
    }

    #[test]
    fn test_plan_sequential() {
        let layout = ResolvedLayout::plan(&table(&[
            RegionDescriptor::new("env", 32 * KIB),
            RegionDescriptor::new("boot", 32 * MIB),
            RegionDescriptor::new("rootfs", 512 * MIB),
        ]))
        .unwrap();

        let offsets: Vec<u64> = layout.regions.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, [0, 32 * KIB, 32 * KIB + 32 * MIB]);
        let numbers: Vec<u32> = layout.regions.iter().map(|r| r.number).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert_eq!(layout.total_reserved(), 32 * KIB + 544 * MIB);
    }

    #[test]
    fn test_explicit_offset_does_not_reset_running_total() {
        let layout = ResolvedLayout::plan(&table(&[
            RegionDescriptor::new("boot", 256 * KIB),
            RegionDescriptor::at("rootfs", MIB, 2 * MIB),
            RegionDescriptor::new("userdata", 8 * MIB),
        ]))
        .unwrap();

        assert_eq!(layout.regions[0].offset, 0);
        assert_eq!(layout.regions[0].used, 262_144);
        assert_eq!(layout.regions[1].offset, 2_097_152);
        assert_eq!(layout.regions[1].explicit_offset, Some(2_097_152));
        assert_eq!(layout.regions[1].used, 262_144 + 1_048_576);
        assert_eq!(layout.regions[2].offset, 262_144 + 1_048_576);
        assert_eq!(layout.regions[2].number, 3);
    }

    #[test]
    fn test_find_image() {
        let layout = ResolvedLayout::plan(&table(&[
            RegionDescriptor::new("boot", MIB),
            RegionDescriptor::new("rootfs", MIB),
            RegionDescriptor::new("boot", 2 * MIB),
        ]))
        .unwrap();

        let boot = layout.find_image("boot.img").unwrap();
        assert_eq!(boot.number, 1);
        assert_eq!(layout.find_image("rootfs.img").unwrap().offset, MIB);
        assert_eq!(
            layout.find_image("rootfs"),
            Err(Error::RegionNotFound("rootfs".into()))
        );
        assert_eq!(
            layout.find_image("oem.img"),
            Err(Error::RegionNotFound("oem.img".into()))
        );
    }

    #[test]
    fn test_partition_node() {
        let mut layout =
            ResolvedLayout::plan(&table(&[RegionDescriptor::new("a", MIB), RegionDescriptor::new("b", MIB)]))
                .unwrap();
        assert_eq!(layout.partition_node(&layout.regions[1]), "mmcblk0p2");

        layout.device = "sda".into();
        assert_eq!(layout.partition_node(&layout.regions[0]), "sda1");
    }

    #[test]
    fn test_plan_overflow() {
        let huge = u64::MAX / 2 + 1;
        assert_eq!(
            ResolvedLayout::plan(&table(&[
                RegionDescriptor::new("a", huge),
                RegionDescriptor::new("b", huge),
            ])),
            Err(Error::LayoutOverflow)
        );
    }
}
