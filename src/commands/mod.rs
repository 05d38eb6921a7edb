//! CLI command implementations
//!
//! Commands load the partition spec through [`load_layout`], hand the
//! resulting layout to a write target and print what happened. Errors
//! propagate to `main` as boxed errors.

pub mod env;
pub mod flash;
pub mod layout;
mod list;
#[cfg(feature = "adb")]
pub mod modules;
#[cfg(feature = "adb")]
pub mod ota;

pub use list::list_targets;

use crate::cli::SpecArgs;
use bootflash_core::flash::{load_partition_table, WriteReport};
use bootflash_core::partition::ResolvedLayout;
use bootflash_core::size::format_size;
use std::error::Error;
use std::io::{self, Write};
use thiserror::Error;

/// Errors raised by the commands themselves
#[derive(Debug, Error)]
pub enum CommandError {
    /// Confirmation prompt closed without an answer
    #[error("Aborted")]
    Aborted,

    /// Env input was empty
    #[error("Error reading input file: no data")]
    EmptyInput,
}

/// Load and plan the partition spec named by `spec`
pub fn load_layout(spec: &SpecArgs) -> Result<ResolvedLayout, Box<dyn Error>> {
    let table = load_partition_table(&spec.spec, spec.device_key.as_deref())?;
    Ok(ResolvedLayout::plan(&table)?)
}

/// Ask before touching `what`
pub fn confirm(what: &str) -> Result<(), Box<dyn Error>> {
    println!("Writing to device: {}", what);
    println!("Disable alert: -c/--confident");
    print!("[Press Enter to continue, Ctrl-C to abort] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer)? == 0 {
        return Err(CommandError::Aborted.into());
    }
    println!();
    Ok(())
}

/// Print one region write
pub fn print_report(report: &WriteReport) {
    println!("block...: {}", report.node);
    println!("image...: {}", report.image);
    println!("image.sz: {}", format_size(report.image_size));
    println!("block.sz: {}", format_size(report.region_size));
    println!("used.sd.: {}", format_size(report.used));
    if let Some(offset) = report.explicit_offset {
        println!("offset..: {}", format_size(offset));
    }
    println!();
}
