//! Block device / image file target

use crate::error::{BlockDevError, Result};
use bootflash_core::flash::{RegionJob, RegionTarget, TargetError, WriteProgress};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

// BLKGETSIZE64 = _IOR(0x12, 114, size_t)
nix::ioctl_read!(blkgetsize64, 0x12, 114, u64);

/// Configuration for opening a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDeviceConfig {
    /// Block device or image file, e.g. `/dev/sdb`
    pub path: PathBuf,
    /// Create the destination if it does not exist and let it grow (image files only)
    pub create: bool,
}

impl BlockDeviceConfig {
    /// Configuration for an existing destination
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create: false,
        }
    }
}

/// An opened block device or disk image
///
/// Writes go to absolute byte offsets; the destination is never truncated,
/// so bytes outside written regions are preserved. Writes past the end are
/// rejected unless the image file was opened with `create`, which lets it grow.
pub struct BlockDevice {
    file: File,
    path: PathBuf,
    /// Writable size; `None` for an image file that may grow
    device_size: Option<u64>,
}

impl BlockDevice {
    /// Open the destination read/write
    pub fn open(config: &BlockDeviceConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(config.create)
            .truncate(false)
            .open(&config.path)
            .map_err(|source| BlockDevError::OpenFailed {
                path: config.path.clone(),
                source,
            })?;

        let metadata = file.metadata()?;
        let device_size = if metadata.file_type().is_block_device() {
            let mut size = 0u64;
            // SAFETY: valid fd and a u64 out parameter, as BLKGETSIZE64 expects
            unsafe { blkgetsize64(file.as_raw_fd(), &mut size) }.map_err(|source| {
                BlockDevError::SizeQueryFailed {
                    path: config.path.clone(),
                    source,
                }
            })?;
            info!(
                "Opened block device {} ({} bytes)",
                config.path.display(),
                size
            );
            Some(size)
        } else if config.create {
            info!(
                "Opened image file {} ({} bytes, growable)",
                config.path.display(),
                metadata.len()
            );
            None
        } else {
            info!(
                "Opened image file {} ({} bytes)",
                config.path.display(),
                metadata.len()
            );
            Some(metadata.len())
        };

        Ok(Self {
            file,
            path: config.path.clone(),
            device_size,
        })
    }

    /// Writable size, `None` for an image file opened with `create`
    pub fn device_size(&self) -> Option<u64> {
        self.device_size
    }

    /// Copy all of `source` to `offset`, `block_size` bytes at a time
    ///
    /// Returns the number of bytes copied.
    pub fn copy_from(
        &mut self,
        source: &mut impl Read,
        len: u64,
        block_size: usize,
        offset: u64,
        progress: &mut dyn WriteProgress,
    ) -> Result<u64> {
        if let Some(device_size) = self.device_size {
            if offset.checked_add(len).map_or(true, |end| end > device_size) {
                return Err(BlockDevError::OutOfRange {
                    offset,
                    len,
                    device_size,
                });
            }
        }

        let copied = block_copy(source, &mut self.file, block_size, offset, progress)?;
        if copied != len {
            warn!(
                "{}: expected {} bytes, copied {}",
                self.path.display(),
                len,
                copied
            );
        }
        self.file.sync_all()?;
        Ok(copied)
    }
}

/// Copy `source` into `destination` starting at `destination_offset`
///
/// Streams in `block_size` chunks until `source` is exhausted and returns the
/// number of bytes copied. The destination is not truncated.
pub fn block_copy<S, D>(
    source: &mut S,
    destination: &mut D,
    block_size: usize,
    destination_offset: u64,
    progress: &mut dyn WriteProgress,
) -> Result<u64>
where
    S: Read + ?Sized,
    D: Write + Seek + ?Sized,
{
    if block_size == 0 {
        return Err(BlockDevError::InvalidBlockSize);
    }

    destination
        .seek(SeekFrom::Start(destination_offset))
        .map_err(|source| BlockDevError::SeekFailed {
            offset: destination_offset,
            source,
        })?;

    let mut buf = vec![0u8; block_size];
    let mut copied = 0u64;
    loop {
        let n = read_block(source, &mut buf)?;
        if n == 0 {
            break;
        }
        destination
            .write_all(&buf[..n])
            .map_err(|source| BlockDevError::WriteFailed {
                offset: destination_offset + copied,
                len: n,
                source,
            })?;
        copied += n as u64;
        progress.write_progress(copied);
    }
    destination.flush()?;

    debug!(
        "Copied {} bytes to offset {:#x} in {}-byte blocks",
        copied, destination_offset, block_size
    );
    Ok(copied)
}

/// Fill `buf` as far as the source allows; short only at end of input
fn read_block<S: Read + ?Sized>(source: &mut S, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

impl RegionTarget for BlockDevice {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn write_region(
        &mut self,
        job: &RegionJob<'_>,
        progress: &mut dyn WriteProgress,
    ) -> std::result::Result<(), TargetError> {
        let mut image = File::open(job.image_path)?;
        self.copy_from(
            &mut image,
            job.image_size,
            job.block_size,
            job.region.offset,
            progress,
        )?;
        Ok(())
    }
}

/// Parse target options from key-value pairs
///
/// # Supported options
/// - `dev=PATH` - block device or image file (required)
/// - `create=yes|no` - create a missing image file and let writes past its
///   end grow it (default `no`)
///
/// # Example
/// ```ignore
/// let config = parse_options(&[("dev", "/dev/sdb")])?;
/// ```
pub fn parse_options(options: &[(&str, &str)]) -> Result<BlockDeviceConfig> {
    let mut path: Option<PathBuf> = None;
    let mut create = false;

    for (key, value) in options {
        match *key {
            "dev" | "path" => {
                if value.is_empty() {
                    return Err(BlockDevError::InvalidParameter {
                        name: "dev",
                        message: "path is empty".into(),
                    });
                }
                path = Some(PathBuf::from(value));
            }
            "create" => {
                create = match *value {
                    "1" | "yes" | "true" => true,
                    "0" | "no" | "false" => false,
                    other => {
                        return Err(BlockDevError::InvalidParameter {
                            name: "create",
                            message: format!("'{}' is not yes/no", other),
                        })
                    }
                };
            }
            _ => {
                warn!("Unknown blkdev option: {}={}", key, value);
            }
        }
    }

    let path = path.ok_or(BlockDevError::MissingParameter("dev"))?;
    Ok(BlockDeviceConfig { path, create })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootflash_core::flash::{ImageWriter, NoProgress};
    use bootflash_core::partition::{PartitionTable, ResolvedLayout};
    use std::io::Cursor;

    #[test]
    fn test_block_copy_at_offset() {
        let mut dest = Cursor::new(vec![0xFFu8; 64]);
        let mut src: &[u8] = &[1, 2, 3, 4, 5];

        let copied = block_copy(&mut src, &mut dest, 2, 10, &mut NoProgress).unwrap();

        assert_eq!(copied, 5);
        let dest = dest.into_inner();
        assert_eq!(&dest[10..15], &[1, 2, 3, 4, 5]);
        assert_eq!(dest[9], 0xFF);
        assert_eq!(dest[15], 0xFF);
        assert_eq!(dest.len(), 64);
    }

    #[test]
    fn test_block_copy_zero_block_size() {
        let mut dest = Cursor::new(Vec::new());
        let mut src: &[u8] = &[1];
        assert!(matches!(
            block_copy(&mut src, &mut dest, 0, 0, &mut NoProgress),
            Err(BlockDevError::InvalidBlockSize)
        ));
    }

    #[test]
    fn test_image_file_is_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("disk.img");
        std::fs::write(&disk, vec![0xAAu8; 8192]).unwrap();

        let mut dev = BlockDevice::open(&BlockDeviceConfig::new(&disk)).unwrap();
        assert_eq!(dev.device_size(), Some(8192));
        let mut src: &[u8] = &[0x55; 100];
        dev.copy_from(&mut src, 100, 1024, 4096, &mut NoProgress)
            .unwrap();

        let data = std::fs::read(&disk).unwrap();
        assert_eq!(data.len(), 8192);
        assert!(data[..4096].iter().all(|b| *b == 0xAA));
        assert!(data[4096..4196].iter().all(|b| *b == 0x55));
        assert!(data[4196..].iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn test_image_file_write_past_end() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("disk.img");
        std::fs::write(&disk, vec![0u8; 4096]).unwrap();

        let mut dev = BlockDevice::open(&BlockDeviceConfig::new(&disk)).unwrap();
        let mut src: &[u8] = &[0x55; 100];
        assert!(matches!(
            dev.copy_from(&mut src, 100, 1024, 8192, &mut NoProgress),
            Err(BlockDevError::OutOfRange {
                offset: 8192,
                len: 100,
                device_size: 4096,
            })
        ));
        assert_eq!(std::fs::metadata(&disk).unwrap().len(), 4096);

        // A write ending exactly at the end still fits
        let mut src: &[u8] = &[0x55; 96];
        dev.copy_from(&mut src, 96, 1024, 4000, &mut NoProgress)
            .unwrap();
        assert_eq!(std::fs::metadata(&disk).unwrap().len(), 4096);
    }

    #[test]
    fn test_created_image_file_grows() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("disk.img");
        std::fs::write(&disk, vec![0u8; 4096]).unwrap();

        let config = BlockDeviceConfig {
            path: disk.clone(),
            create: true,
        };
        let mut dev = BlockDevice::open(&config).unwrap();
        assert_eq!(dev.device_size(), None);
        let mut src: &[u8] = &[0x55; 100];
        assert_eq!(
            dev.copy_from(&mut src, 100, 1024, 8192, &mut NoProgress)
                .unwrap(),
            100
        );
        assert_eq!(std::fs::metadata(&disk).unwrap().len(), 8292);
    }

    #[test]
    fn test_open_missing_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("missing.img");
        assert!(matches!(
            BlockDevice::open(&BlockDeviceConfig::new(&disk)),
            Err(BlockDevError::OpenFailed { .. })
        ));

        let config = BlockDeviceConfig {
            path: disk.clone(),
            create: true,
        };
        BlockDevice::open(&config).unwrap();
        assert!(disk.is_file());
    }

    #[test]
    fn test_flash_layout_into_image_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("boot.img"), vec![0xB0u8; 1500]).unwrap();
        std::fs::write(dir.path().join("rootfs.img"), vec![0x20u8; 700]).unwrap();
        let disk = dir.path().join("disk.img");
        std::fs::write(&disk, vec![0u8; 16384]).unwrap();

        let table = PartitionTable::parse_line("blkdevparts=loop0:2K(boot),1K@8K(rootfs)").unwrap();
        let layout = ResolvedLayout::plan(&table).unwrap();
        let mut dev = BlockDevice::open(&BlockDeviceConfig::new(&disk)).unwrap();

        let reports = ImageWriter::new(&mut dev, &layout)
            .with_image_dir(dir.path())
            .write_all(&mut NoProgress)
            .unwrap();
        assert_eq!(reports[0].node, "loop0p1");

        let data = std::fs::read(&disk).unwrap();
        assert!(data[..1500].iter().all(|b| *b == 0xB0));
        assert!(data[1500..8192].iter().all(|b| *b == 0));
        assert!(data[8192..8892].iter().all(|b| *b == 0x20));
        assert_eq!(data.len(), 16384);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/sdb")]).unwrap();
        assert_eq!(config, BlockDeviceConfig::new("/dev/sdb"));

        let config = parse_options(&[("dev", "out.img"), ("create", "yes")]).unwrap();
        assert!(config.create);

        assert!(matches!(
            parse_options(&[]),
            Err(BlockDevError::MissingParameter("dev"))
        ));
        assert!(matches!(
            parse_options(&[("dev", "x"), ("create", "maybe")]),
            Err(BlockDevError::InvalidParameter { name: "create", .. })
        ));
    }
}
