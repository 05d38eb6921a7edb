//! Partition spec line parsing
//!
//! Grammar, per comma-separated token (tried in this order):
//!
//! ```text
//! SIZE@OFFSET(NAME)    explicit placement
//! SIZE(NAME)           placed after the previous region
//! ```
//!
//! `SIZE` and `OFFSET` are [`crate::size`] literals and `NAME` is one or more
//! ASCII word characters. Tokens are matched as a whole; anything else is a
//! [`Error::MalformedPartitionToken`].

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::{PartitionTable, RegionDescriptor, SpecKey};
use crate::error::{Error, Result};
use crate::size::parse_size;

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse one region token such as `512K(boot)` or `1M@2M(rootfs)`
///
/// `index` is the token's position in its line and is only used for error
/// reporting.
pub fn parse_token(index: usize, token: &str) -> Result<RegionDescriptor> {
    let token = token.trim();
    let malformed = || Error::MalformedPartitionToken {
        index,
        token: token.to_string(),
    };

    let (head, rest) = token.split_once('(').ok_or_else(malformed)?;
    let name = rest.strip_suffix(')').ok_or_else(malformed)?;
    if !is_word(name) {
        return Err(malformed());
    }

    let (size, offset) = match head.split_once('@') {
        Some((size, offset)) => (size, Some(offset)),
        None => (head, None),
    };

    let size = parse_size(size).map_err(|_| malformed())?;
    if size == 0 {
        return Err(malformed());
    }

    let descriptor = match offset {
        Some(offset) => {
            let offset = parse_size(offset).map_err(|_| malformed())?;
            RegionDescriptor::at(name, size, offset)
        }
        None => RegionDescriptor::new(name, size),
    };

    Ok(descriptor)
}

/// Split a spec line into its key, device and region list
///
/// Returns `None` when the line does not start with a recognized key
/// followed by `<device>:`.
pub fn split_spec_line(line: &str) -> Option<(SpecKey, &str, &str)> {
    let line = line.trim();
    SpecKey::ALL.iter().find_map(|&key| {
        let value = line.strip_prefix(key.as_str())?.strip_prefix('=')?;
        let (device, regions) = value.split_once(':')?;
        is_word(device).then_some((key, device, regions))
    })
}

impl PartitionTable {
    /// Parse a single `blkdevparts=<dev>:...` or `sd_parts=<dev>:...` line
    pub fn parse_line(line: &str) -> Result<Self> {
        let (key, device, regions) = split_spec_line(line).ok_or(Error::NotAPartitionSpec)?;

        if regions.trim().is_empty() {
            return Err(Error::EmptyPartitionSpec);
        }

        let mut table = PartitionTable::new(key, device);
        for (index, token) in regions.split(',').enumerate() {
            table.regions.push(parse_token(index, token)?);
        }

        log::debug!(
            "Parsed {} spec for {} with {} region(s)",
            key,
            device,
            table.len()
        );
        Ok(table)
    }

    /// Select and parse the partition spec from a multi-line env text
    ///
    /// Lines that do not start with a recognized key are ignored. With a
    /// `device` the first line for that device is used. Without one the text
    /// must contain exactly one spec line.
    pub fn from_text(text: &str, device: Option<&str>) -> Result<Self> {
        let candidates: Vec<(&str, &str)> = text
            .lines()
            .filter_map(|line| split_spec_line(line).map(|(_, dev, _)| (line, dev)))
            .collect();

        let line = match device {
            Some(wanted) => candidates
                .iter()
                .find(|(_, dev)| *dev == wanted)
                .map(|(line, _)| *line)
                .ok_or_else(|| Error::DeviceNotFound(wanted.to_string()))?,
            None => match candidates.as_slice() {
                [] => return Err(Error::NoPartitionSpec),
                [(line, _)] => *line,
                many => {
                    return Err(Error::AmbiguousPartitionSpec {
                        devices: many.iter().map(|(_, dev)| String::from(*dev)).collect(),
                    })
                }
            },
        };

        Self::parse_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::{GIB, KIB, MIB};

    #[test]
    fn test_parse_sequential_token() {
        let region = parse_token(0, "512K(boot)").unwrap();
        assert_eq!(region.image_name(), "boot.img");
        assert_eq!(region.size, 524_288);
        assert_eq!(region.offset, None);
    }

    #[test]
    fn test_parse_explicit_offset_token() {
        let region = parse_token(0, "1M@2M(rootfs)").unwrap();
        assert_eq!(region.image_name(), "rootfs.img");
        assert_eq!(region.size, 1_048_576);
        assert_eq!(region.offset, Some(2_097_152));
    }

    #[test]
    fn test_parse_malformed_tokens() {
        for bad in [
            "",
            "boot",
            "512K",
            "512K()",
            "512K(boot",
            "512K(bo-ot)",
            "(boot)",
            "@2M(boot)",
            "1M@(boot)",
            "1M@2M@3M(boot)",
            "0K(boot)",
            "-(rootfs)",
            "512K(boot)x",
            "x512K(boot)",
        ] {
            match parse_token(3, bad) {
                Err(Error::MalformedPartitionToken { index, token }) => {
                    assert_eq!(index, 3);
                    assert_eq!(token, bad.trim());
                }
                other => panic!("{:?} parsed as {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_parse_line() {
        let table =
            PartitionTable::parse_line("blkdevparts=mmcblk0:256K(boot),1M@2M(rootfs),8M(userdata)\n")
                .unwrap();
        assert_eq!(table.key, SpecKey::Blkdevparts);
        assert_eq!(table.device, "mmcblk0");
        assert_eq!(
            table.regions,
            [
                RegionDescriptor::new("boot", 256 * KIB),
                RegionDescriptor::at("rootfs", MIB, 2 * MIB),
                RegionDescriptor::new("userdata", 8 * MIB),
            ]
        );
    }

    #[test]
    fn test_parse_sd_parts_line() {
        let table = PartitionTable::parse_line("sd_parts=mmcblk1:32K(env),6G(rootfs)").unwrap();
        assert_eq!(table.key, SpecKey::SdParts);
        assert_eq!(table.device, "mmcblk1");
        assert_eq!(table.regions[1], RegionDescriptor::new("rootfs", 6 * GIB));
    }

    #[test]
    fn test_parse_line_reports_bad_token() {
        let err = PartitionTable::parse_line("blkdevparts=mmcblk0:256K(boot),junk,8M(data)").unwrap_err();
        assert_eq!(
            err,
            Error::MalformedPartitionToken {
                index: 1,
                token: "junk".into()
            }
        );
    }

    #[test]
    fn test_parse_line_rejects_other_keys() {
        assert_eq!(
            PartitionTable::parse_line("bootcmd=boot"),
            Err(Error::NotAPartitionSpec)
        );
        assert_eq!(
            PartitionTable::parse_line("blkdevparts=:256K(boot)"),
            Err(Error::NotAPartitionSpec)
        );
        assert_eq!(
            PartitionTable::parse_line("#blkdevparts=mmcblk0:256K(boot)"),
            Err(Error::NotAPartitionSpec)
        );
        assert_eq!(
            PartitionTable::parse_line("blkdevparts=mmcblk0: "),
            Err(Error::EmptyPartitionSpec)
        );
    }

    #[test]
    fn test_from_text_picks_single_spec_line() {
        let text = "bootdelay=0\n# blkdevparts=mmcblk9:1M(old)\nblkdevparts=mmcblk0:32K(env),512K@32K(idblock)\nsys_bootargs= root=/dev/mmcblk0p3\n";
        let table = PartitionTable::from_text(text, None).unwrap();
        assert_eq!(table.device, "mmcblk0");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_from_text_without_spec() {
        assert_eq!(
            PartitionTable::from_text("bootdelay=0\n", None),
            Err(Error::NoPartitionSpec)
        );
    }

    #[test]
    fn test_from_text_multiple_devices() {
        let text = "blkdevparts=mmcblk0:1M(boot)\nsd_parts=mmcblk1:2M(boot)\n";
        assert_eq!(
            PartitionTable::from_text(text, None),
            Err(Error::AmbiguousPartitionSpec {
                devices: vec!["mmcblk0".to_string(), "mmcblk1".to_string()]
            })
        );

        let table = PartitionTable::from_text(text, Some("mmcblk1")).unwrap();
        assert_eq!(table.key, SpecKey::SdParts);
        assert_eq!(table.regions[0].size, 2 * MIB);

        assert_eq!(
            PartitionTable::from_text(text, Some("sda")),
            Err(Error::DeviceNotFound("sda".into()))
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let line = "blkdevparts=mmcblk0:32K(env),512K@32K(idblock),1536K(uboot),6G(rootfs)";
        let table = PartitionTable::parse_line(line).unwrap();
        assert_eq!(table.to_string(), line);
    }
}
