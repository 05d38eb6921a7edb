//! bootflash-core - Core library for provisioning embedded Linux boards
//!
//! This crate holds the parts of bootflash that do not care how bytes reach
//! the board:
//!
//! - [`size`] - `256K` / `1M` style byte quantities
//! - [`partition`] - the `blkdevparts=` partition spec language and the
//!   layout planner that turns it into concrete offsets
//! - [`env`] - the bootloader environment image codec
//! - [`flash`] - the image writer and the [`flash::RegionTarget`] seam that
//!   block devices and remote boards implement (requires `std`)
//!
//! The parser, planner and env codec only need `alloc`, so they can be used
//! from `no_std` tooling as well.
//!
//! # Features
//!
//! - `std` (default) - file loading, the image writer, TOML layout export
//!
//! # Example
//!
//! ```ignore
//! use bootflash_core::partition::{PartitionTable, ResolvedLayout};
//!
//! let table = PartitionTable::parse_line("blkdevparts=mmcblk0:256K(boot),8M(rootfs)")?;
//! let layout = ResolvedLayout::plan(&table)?;
//! for region in &layout.regions {
//!     println!("{} at {:#x}", layout.partition_node(region), region.offset);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

pub mod env;
pub mod error;
#[cfg(feature = "std")]
pub mod flash;
pub mod partition;
pub mod size;

pub use error::{Error, Result};
