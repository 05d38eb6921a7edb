//! bootflash-adb - Flashing and provisioning over the Android debug bridge
//!
//! Boards that are already running (for example Luckfox/Rockchip boards with
//! an `adb` gadget) can be updated in place: an image is pushed to the board
//! and copied onto its partition node with `dd`. The same transport installs
//! kernel module trees.
//!
//! # Example
//!
//! ```ignore
//! use bootflash_adb::{AdbTarget, AdbTransport};
//! use bootflash_core::flash::{ImageWriter, NoProgress};
//!
//! let mut target = AdbTarget::new(AdbTransport::new(None));
//! ImageWriter::new(&mut target, &layout)
//!     .write_image(Path::new("boot.img"), &mut NoProgress)?;
//! target.reboot()?;
//! ```
//!
//! # Usage with bootflash CLI
//!
//! ```bash
//! bootflash ota boot.img
//! bootflash ota -s 9ad1s342 --staging /tmp rootfs.img
//! bootflash flash -t adb:serial=9ad1s342 boot.img
//! bootflash modules install ./modules-out
//! ```
//!
//! # System Requirements
//!
//! - `adb` on `PATH`
//! - a root shell on the board for writing partition nodes and installing
//!   modules

pub mod error;
pub mod modules;
pub mod target;
pub mod transport;

#[cfg(test)]
mod mock;

pub use error::{AdbError, Result};
pub use modules::{install_modules, require_root, InstallReport};
pub use target::{parse_options, AdbConfig, AdbTarget, DEFAULT_STAGING};
pub use transport::{AdbTransport, CommandOutput, Transport};

/// Open a debug-bridge target from `key=value` options
///
/// # Example Options
///
/// - `serial=9ad1s342` - device serial
/// - `staging=/tmp` - remote staging directory
pub fn open_adb(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn bootflash_core::flash::RegionTarget>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    Ok(Box::new(open_target(&config)))
}

/// Remote target for `config` using the `adb` executable
pub fn open_target(config: &AdbConfig) -> AdbTarget<AdbTransport> {
    AdbTarget::with_staging(AdbTransport::new(config.serial.clone()), config.staging.clone())
}
