//! Write target selection
//!
//! The CLI names a target with a short string such as `blkdev:dev=/dev/sdb`
//! or `adb:serial=9ad1s342` and gets back a boxed
//! [`RegionTarget`](bootflash_core::flash::RegionTarget). Backends are
//! compiled in through cargo features.
//!
//! ```text
//!   bootflash (CLI) ──► bootflash-target ──► bootflash-blkdev
//!                              │         └─► bootflash-adb
//!                              ▼
//!                       bootflash-core (ImageWriter, RegionTarget)
//! ```

mod registry;

pub use registry::{
    available_targets, open_target, parse_target_params, target_names_short, TargetInfo,
    TargetParams,
};
