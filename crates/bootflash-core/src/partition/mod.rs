//! Partition spec language and layout planning
//!
//! A board's storage is described by a single line in its env text file:
//!
//! ```text
//! blkdevparts=mmcblk0:32K(env),512K@32K(idblock),256K(uboot),32M(boot),6G(rootfs)
//! ```
//!
//! Each comma-separated token is either `SIZE(NAME)` (placed right after the
//! previously declared region) or `SIZE@OFFSET(NAME)` (placed at `OFFSET`).
//! Region `NAME` is flashed from `NAME.img`, and the n-th declared region is
//! partition `n` of the device (`mmcblk0p1`, `mmcblk0p2`, ...).
//!
//! Parsing produces a [`PartitionTable`]; [`ResolvedLayout::plan`] turns it
//! into concrete offsets:
//!
//! ```ignore
//! let table = PartitionTable::from_text(&env_txt, None)?;
//! let layout = ResolvedLayout::plan(&table)?;
//! let boot = layout.find_image("boot.img")?;
//! ```

mod parser;
mod plan;
#[cfg(feature = "std")]
mod toml;
mod types;

pub use parser::{parse_token, split_spec_line};
pub use plan::{ResolvedLayout, ResolvedRegion};
pub use types::*;
