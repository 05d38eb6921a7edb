//! Writing images into their regions
//!
//! [`ImageWriter`] checks preconditions (image present, optionally within
//! its region) and hands each region to a [`RegionTarget`]. Targets decide
//! how bytes reach the board: a local block device seeks to the region
//! offset, a remote board writes the partition node.
//!
//! # Example
//!
//! ```ignore
//! let table = load_partition_table(".env.txt", None)?;
//! let layout = ResolvedLayout::plan(&table)?;
//! let mut writer = ImageWriter::new(&mut target, &layout);
//! for report in writer.write_all(&mut NoProgress)? {
//!     println!("{} <- {}", report.node, report.image);
//! }
//! ```

mod error;
mod progress;
mod target;
mod writer;

pub use error::FlashError;
pub use progress::{NoProgress, WriteProgress};
pub use target::{RegionJob, RegionTarget, TargetError};
pub use writer::{load_partition_table, ImageWriter, WriteOptions, WriteReport};

/// Default copy granularity (1 KiB, as `dd bs=1k`)
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Default partition spec / env text file
pub const DEFAULT_SPEC_FILE: &str = ".env.txt";
