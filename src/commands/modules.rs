//! Module install command

use bootflash_adb::{install_modules, AdbTransport};
use std::error::Error;
use std::path::Path;

/// Install the module tree at `path` onto the board
pub fn cmd_install(path: &Path, serial: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut transport = AdbTransport::new(serial);
    let report = install_modules(&mut transport, path)?;
    println!(
        "Finished: {} file(s) pushed, {} director(ies) created",
        report.files, report.directories
    );
    Ok(())
}
