//! bootflash-blkdev - Local block device target
//!
//! Writes images straight into a block device (an SD card in a reader, a
//! loop device) or a raw disk image file. Each region is written at its
//! absolute byte offset; nothing outside the written regions is touched.
//! A write past the end of the destination is rejected, except for an image
//! file opened with `create=yes`, which grows to fit.
//!
//! # Example
//!
//! ```ignore
//! use bootflash_blkdev::{BlockDevice, BlockDeviceConfig};
//! use bootflash_core::flash::{ImageWriter, NoProgress};
//!
//! let mut dev = BlockDevice::open(&BlockDeviceConfig::new("/dev/sdb"))?;
//! ImageWriter::new(&mut dev, &layout).write_all(&mut NoProgress)?;
//! ```
//!
//! # Usage with bootflash CLI
//!
//! ```bash
//! bootflash flash -t blkdev:dev=/dev/sdb
//! bootflash flash -t blkdev:dev=disk.img,create=yes boot.img
//! ```
//!
//! Writing a block device usually requires root or membership in the
//! `disk` group.

pub mod device;
pub mod error;

pub use device::{block_copy, parse_options, BlockDevice, BlockDeviceConfig};
pub use error::{BlockDevError, Result};

/// Open a block device target from `key=value` options
///
/// # Example Options
///
/// - `dev=/dev/sdb` - Required: destination path
/// - `create=yes` - create a missing image file and let it grow
pub fn open_blkdev(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn bootflash_core::flash::RegionTarget>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    let dev = BlockDevice::open(&config)?;
    Ok(Box::new(dev))
}
