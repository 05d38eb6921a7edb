//! Bootloader environment images
//!
//! U-Boot style environment storage is a fixed-size blob:
//!
//! ```text
//! offset 0      : CRC-32 of the payload (little or big endian)
//! offset 4      : redundancy flag (only with redundant storage)
//! offset 4 or 5 : "key=value\0key=value\0..." then fill bytes to the end
//! ```
//!
//! The checksum covers the whole payload area, fill bytes included.
//!
//! ```ignore
//! let image = EnvImageBuilder::new(0x8000).build_text(&env_txt)?;
//! std::fs::write("env.img", image.as_bytes())?;
//! ```

mod image;

pub use image::{DecodedEnv, EnvImage, EnvImageBuilder};

/// Size of the checksum field
pub const CRC_SIZE: usize = 4;

/// Default environment size (32 KiB)
pub const DEFAULT_ENV_SIZE: usize = 0x8000;

/// Flag value written into redundant environments
///
/// Only a single copy is produced, so it is always marked as copy 1.
pub const REDUNDANT_FLAG: u8 = 1;

/// Byte order of the stored checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little endian (default)
    #[default]
    Little,
    /// Big endian
    Big,
}

impl ByteOrder {
    /// Encode a checksum in this byte order
    pub fn encode(self, value: u32) -> [u8; CRC_SIZE] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    /// Decode a checksum stored in this byte order
    pub fn decode(self, bytes: [u8; CRC_SIZE]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }
}
