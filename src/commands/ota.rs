//! Over-the-air update of a single image

use super::{confirm, load_layout};
use crate::cli::SpecArgs;
use crate::commands::flash::IndicatifProgress;
use bootflash_adb::AdbConfig;
use bootflash_core::flash::{ImageWriter, WriteOptions};
use std::error::Error;
use std::path::Path;

/// Push `image` to the board, write it to its partition and reboot
pub fn run_ota(
    image: &Path,
    spec: &SpecArgs,
    config: &AdbConfig,
    block_size: usize,
    reboot: bool,
    confident: bool,
) -> Result<(), Box<dyn Error>> {
    let layout = load_layout(spec)?;

    if !confident {
        confirm(&format!(
            "adb device {}",
            config.serial.as_deref().unwrap_or("(default)")
        ))?;
    }

    let mut target = bootflash_adb::open_target(config);
    println!("Pushing {} to {} ...", image.display(), config.staging);
    println!("Flashing on device...");
    ImageWriter::new(&mut target, &layout)
        .with_options(WriteOptions {
            block_size,
            strict_capacity: false,
        })
        .write_image(image, &mut IndicatifProgress::quiet())?;

    if reboot {
        println!("Rebooting device...");
        target.reboot()?;
    }
    Ok(())
}
