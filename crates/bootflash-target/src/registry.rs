//! Target registry

use bootflash_core::flash::RegionTarget;

/// Parsed target parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetParams {
    /// Target name as given
    pub name: String,
    /// Key-value parameters in the order given
    pub params: Vec<(String, String)>,
}

impl TargetParams {
    /// Parameters as borrowed pairs, the form backends take
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a target string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_target_params("blkdev:dev=/dev/sdb")?;
/// assert_eq!(params.name, "blkdev");
/// ```
pub fn parse_target_params(s: &str) -> Result<TargetParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("Empty target name".into());
    }

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            match opt.split_once('=') {
                Some((key, value)) => params.push((key.to_string(), value.to_string())),
                None => {
                    return Err(
                        format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                    )
                }
            }
        }
    }

    Ok(TargetParams {
        name: name.to_string(),
        params,
    })
}

/// Open a write target by string
#[allow(unused_variables)]
pub fn open_target(target: &str) -> Result<Box<dyn RegionTarget>, Box<dyn std::error::Error>> {
    let params = parse_target_params(target)?;
    let options = params.options();

    let opened: Box<dyn RegionTarget> = match params.name.as_str() {
        #[cfg(feature = "blkdev")]
        "blkdev" | "block" | "file" => bootflash_blkdev::open_blkdev(&options)?,

        #[cfg(feature = "adb")]
        "adb" => bootflash_adb::open_adb(&options)?,

        _ => return Err(unknown_target_error(&params.name)),
    };
    log::debug!("Opened target {}", opened.describe());
    Ok(opened)
}

fn unknown_target_error(name: &str) -> Box<dyn std::error::Error> {
    format!(
        "Unknown target: {} (available: {})\nUse 'bootflash list-targets' for more details",
        name,
        target_names_short()
    )
    .into()
}

/// Information about a target backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available targets (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_targets() -> Vec<TargetInfo> {
    let mut targets = Vec::new();

    #[cfg(feature = "blkdev")]
    targets.push(TargetInfo {
        name: "blkdev",
        aliases: &["block", "file"],
        description: "Local block device or disk image, regions at byte offsets (dev=<path>,create=yes)",
    });

    #[cfg(feature = "adb")]
    targets.push(TargetInfo {
        name: "adb",
        aliases: &[],
        description: "Running board over adb, dd onto partition nodes (serial=<id>,staging=<dir>)",
    });

    targets
}

/// Generate a short list of target names for CLI help
pub fn target_names_short() -> String {
    let targets = available_targets();
    if targets.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = targets.iter().map(|t| t.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_params() {
        let params = parse_target_params("blkdev:dev=/dev/sdb,create=no").unwrap();
        assert_eq!(params.name, "blkdev");
        assert_eq!(params.options(), [("dev", "/dev/sdb"), ("create", "no")]);

        let params = parse_target_params("adb").unwrap();
        assert!(params.params.is_empty());

        assert!(parse_target_params("adb:serial").is_err());
        assert!(parse_target_params(":dev=x").is_err());
    }

    #[test]
    fn test_unknown_target() {
        let err = open_target("jtag").err().unwrap();
        assert!(err.to_string().starts_with("Unknown target: jtag"));
    }

    #[cfg(feature = "blkdev")]
    #[test]
    fn test_open_blkdev() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("disk.img");
        let target = open_target(&format!("blkdev:dev={},create=yes", disk.display())).unwrap();
        assert_eq!(target.describe(), disk.display().to_string());
        assert!(disk.is_file());
    }

    #[test]
    fn test_names_match_registry() {
        let short = target_names_short();
        for info in available_targets() {
            assert!(short.contains(info.name));
        }
    }
}
