//! Remote region target

use crate::error::{AdbError, Result};
use crate::transport::Transport;
use bootflash_core::flash::{RegionJob, RegionTarget, TargetError, WriteProgress};
use log::{info, warn};

/// Default remote staging directory
pub const DEFAULT_STAGING: &str = "/";

/// Configuration for a remote target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbConfig {
    /// Device serial; `None` uses the only attached device
    pub serial: Option<String>,
    /// Remote directory images are pushed to before writing
    pub staging: String,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            serial: None,
            staging: DEFAULT_STAGING.into(),
        }
    }
}

/// Writes regions on a running board
///
/// Each image is pushed to the staging directory and copied onto its
/// partition node with `dd` in the remote shell. Offsets are implied by the
/// node, so only the node and image name matter here.
pub struct AdbTarget<T: Transport> {
    transport: T,
    staging: String,
}

impl<T: Transport> AdbTarget<T> {
    /// Target staging images in `/`
    pub fn new(transport: T) -> Self {
        Self::with_staging(transport, DEFAULT_STAGING)
    }

    /// Target staging images in `staging`
    pub fn with_staging(transport: T, staging: impl Into<String>) -> Self {
        Self {
            transport,
            staging: staging.into(),
        }
    }

    /// Remote path an image is staged at
    pub fn staged_path(&self, image: &str) -> String {
        remote_join(&self.staging, image)
    }

    /// Reboot the board
    pub fn reboot(&mut self) -> Result<()> {
        info!("Rebooting device");
        self.transport.reboot()
    }

    /// The underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> RegionTarget for AdbTarget<T> {
    fn describe(&self) -> String {
        format!("adb device (staging {})", self.staging)
    }

    fn write_region(
        &mut self,
        job: &RegionJob<'_>,
        progress: &mut dyn WriteProgress,
    ) -> std::result::Result<(), TargetError> {
        let staged = self.staged_path(&job.region.image);
        info!("Pushing {} to {}", job.image_path.display(), staged);
        self.transport.push(job.image_path, &staged)?;

        let input = format!("if={}", staged);
        let output = format!("of=/dev/{}", job.node);
        let bs = format!("bs={}", dd_block_size(job.block_size));
        let result = self
            .transport
            .execute_checked(&["dd", input.as_str(), output.as_str(), bs.as_str()])?;
        if !result.stderr.is_empty() {
            log::debug!("dd: {}", result.stderr.trim());
        }
        progress.write_progress(job.image_size);
        Ok(())
    }
}

/// `dd` block size operand: `1k` for 1024, plain bytes otherwise
fn dd_block_size(block_size: usize) -> String {
    if block_size % 1024 == 0 {
        format!("{}k", block_size / 1024)
    } else {
        block_size.to_string()
    }
}

/// Join a remote directory and a name with exactly one `/`
pub(crate) fn remote_join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name.trim_start_matches('/'))
}

/// Parse target options from key-value pairs
///
/// # Supported options
/// - `serial=ID` - device serial (optional)
/// - `staging=DIR` - remote staging directory (default `/`)
pub fn parse_options(options: &[(&str, &str)]) -> Result<AdbConfig> {
    let mut config = AdbConfig::default();

    for (key, value) in options {
        match *key {
            "serial" | "device" => config.serial = Some(value.to_string()),
            "staging" => {
                if !value.starts_with('/') {
                    return Err(AdbError::InvalidParameter {
                        name: "staging",
                        message: format!("'{}' is not an absolute path", value),
                    });
                }
                config.staging = value.to_string();
            }
            _ => {
                warn!("Unknown adb option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockTransport};
    use bootflash_core::flash::{FlashError, ImageWriter, NoProgress};
    use bootflash_core::partition::{PartitionTable, ResolvedLayout};
    use std::path::Path;

    fn layout() -> ResolvedLayout {
        let table =
            PartitionTable::parse_line("blkdevparts=mmcblk0:32K(env),512K@32K(idblock),4M(boot)")
                .unwrap();
        ResolvedLayout::plan(&table).unwrap()
    }

    #[test]
    fn test_ota_writes_partition_node() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("boot.img"), [0u8; 16]).unwrap();
        let layout = layout();
        let mut target = AdbTarget::new(MockTransport::new());

        let report = ImageWriter::new(&mut target, &layout)
            .with_image_dir(dir.path())
            .write_image(Path::new("boot.img"), &mut NoProgress)
            .unwrap();
        target.reboot().unwrap();

        assert_eq!(report.node, "mmcblk0p3");
        let mock = target.transport_mut();
        assert_eq!(
            mock.pushes(),
            [(dir.path().join("boot.img").as_path(), "/boot.img")]
        );
        assert_eq!(
            mock.commands(),
            ["dd if=/boot.img of=/dev/mmcblk0p3 bs=1k"]
        );
        assert_eq!(mock.calls.last(), Some(&Call::Reboot));
    }

    #[test]
    fn test_staging_directory() {
        let target = AdbTarget::with_staging(MockTransport::new(), "/tmp/");
        assert_eq!(target.staged_path("boot.img"), "/tmp/boot.img");
        let target = AdbTarget::new(MockTransport::new());
        assert_eq!(target.staged_path("env.img"), "/env.img");
    }

    #[test]
    fn test_remote_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("env.img"), [0u8; 4]).unwrap();
        let layout = layout();
        let mut mock = MockTransport::new();
        mock.fail_on = Some("dd");
        let mut target = AdbTarget::new(mock);

        let err = ImageWriter::new(&mut target, &layout)
            .with_image_dir(dir.path())
            .write_image(Path::new("env.img"), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, FlashError::Target { ref image, .. } if image == "env.img"));
    }

    #[test]
    fn test_dd_block_size() {
        assert_eq!(dd_block_size(1024), "1k");
        assert_eq!(dd_block_size(4096), "4k");
        assert_eq!(dd_block_size(512), "512");
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options(&[]).unwrap(), AdbConfig::default());
        let config = parse_options(&[("serial", "9ad1s342"), ("staging", "/tmp")]).unwrap();
        assert_eq!(config.serial.as_deref(), Some("9ad1s342"));
        assert_eq!(config.staging, "/tmp");
        assert!(matches!(
            parse_options(&[("staging", "tmp")]),
            Err(AdbError::InvalidParameter { name: "staging", .. })
        ));
    }
}
