//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse an integer with an optional `0x`, `0o` or `0b` prefix
pub fn parse_int(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(oct) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        (oct, 8)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (s, 10)
    };
    u64::from_str_radix(digits, radix).map_err(|e| format!("Bad integer format '{}': {}", s, e))
}

fn parse_usize(s: &str) -> Result<usize, String> {
    let value = parse_int(s)?;
    usize::try_from(value).map_err(|_| format!("Value too large: {}", s))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_int(s)?;
    u8::try_from(value).map_err(|_| format!("Not a byte value: {}", s))
}

/// Remote staging directories are absolute paths on the board
fn parse_staging(s: &str) -> Result<String, String> {
    if s.starts_with('/') {
        Ok(s.to_string())
    } else {
        Err(format!("'{}' is not an absolute path", s))
    }
}

/// Generate dynamic help text for the target argument
fn target_help() -> String {
    format!(
        "Write target, e.g. blkdev:dev=/dev/sdX [available: {}]",
        bootflash_target::target_names_short()
    )
}

#[derive(Parser)]
#[command(name = "bootflash")]
#[command(
    author,
    version,
    about = "Partition-table driven image flasher for embedded Linux boards",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the partition spec comes from
#[derive(clap::Args, Debug, Clone)]
pub struct SpecArgs {
    /// Env text file holding the blkdevparts=/sd_parts= line
    #[arg(short = 'e', long = "env", default_value = bootflash_core::flash::DEFAULT_SPEC_FILE)]
    pub spec: PathBuf,

    /// Device key to use when the file describes several devices (e.g. mmcblk0)
    #[arg(long)]
    pub device_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write images into their regions on a local device or disk image
    Flash {
        /// Write target
        #[arg(short, long, help = target_help())]
        target: String,

        #[command(flatten)]
        spec: SpecArgs,

        /// Images to write (e.g. boot.img); all regions when omitted
        images: Vec<PathBuf>,

        /// Directory holding the <name>.img files
        #[arg(short = 'd', long, default_value = ".")]
        image_dir: PathBuf,

        /// Copy granularity in bytes
        #[arg(long, value_parser = parse_usize, default_value = "1024")]
        block_size: usize,

        /// Refuse images larger than their declared region
        #[arg(long)]
        strict: bool,

        /// Do not ask for confirmation before writing
        #[arg(short, long)]
        confident: bool,
    },

    /// Update one image on a running board over adb and reboot it
    Ota {
        /// Image to write (e.g. boot.img)
        image: PathBuf,

        #[command(flatten)]
        spec: SpecArgs,

        /// adb device serial
        #[arg(short = 's', long)]
        serial: Option<String>,

        /// Remote directory the image is pushed to
        #[arg(long, value_parser = parse_staging, default_value = "/")]
        staging: String,

        /// Copy granularity in bytes
        #[arg(long, value_parser = parse_usize, default_value = "1024")]
        block_size: usize,

        /// Leave the board running after the update
        #[arg(long)]
        no_reboot: bool,

        /// Do not ask for confirmation before writing
        #[arg(short, long)]
        confident: bool,
    },

    /// Bootloader environment image operations
    #[command(subcommand)]
    Env(EnvCommands),

    /// Partition layout operations
    #[command(subcommand)]
    Layout(LayoutCommands),

    /// Kernel module operations
    #[command(subcommand)]
    Modules(ModulesCommands),

    /// List available write targets
    ListTargets,
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// Build env.img from key=value lines
    Build {
        /// Env text file, or - for stdin
        #[arg(default_value = ".env.txt")]
        input: PathBuf,

        /// Output image
        #[arg(short, long, default_value = "env.img")]
        output: PathBuf,

        /// Image size in bytes
        #[arg(short, long, value_parser = parse_usize, default_value = "0x8000")]
        size: usize,

        /// The environment has multiple copies in flash
        #[arg(short, long)]
        redundant: bool,

        /// Store the checksum big endian
        #[arg(short, long)]
        big_endian: bool,

        /// Byte used for unused space
        #[arg(short = 'p', long, value_parser = parse_byte, default_value = "0")]
        fill: u8,
    },

    /// Verify an env image and print its variables
    Dump {
        /// Image to read
        #[arg(default_value = "env.img")]
        input: PathBuf,

        /// The image carries a redundancy flag byte
        #[arg(short, long)]
        redundant: bool,

        /// The checksum is stored big endian
        #[arg(short, long)]
        big_endian: bool,
    },
}

#[derive(Subcommand)]
pub enum LayoutCommands {
    /// Show where every region lands
    Show {
        #[command(flatten)]
        spec: SpecArgs,

        /// Print the layout as TOML
        #[arg(long)]
        toml: bool,

        /// Save the layout as TOML
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ModulesCommands {
    /// Copy an INSTALL_MOD_PATH tree onto a running board over adb
    Install {
        /// INSTALL_MOD_PATH directory
        path: PathBuf,

        /// adb device serial
        #[arg(short = 's', long)]
        serial: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("32768"), Ok(32768));
        assert_eq!(parse_int("0x8000"), Ok(0x8000));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("0b101"), Ok(5));
        assert!(parse_int("32K").is_err());
        assert!(parse_byte("0x100").is_err());
        assert_eq!(parse_byte("0xff"), Ok(0xFF));
    }

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_env_build_defaults() {
        let cli = Cli::try_parse_from(["bootflash", "env", "build"]).unwrap();
        match cli.command {
            Commands::Env(EnvCommands::Build {
                input,
                output,
                size,
                redundant,
                big_endian,
                fill,
            }) => {
                assert_eq!(input, PathBuf::from(".env.txt"));
                assert_eq!(output, PathBuf::from("env.img"));
                assert_eq!(size, 0x8000);
                assert!(!redundant && !big_endian);
                assert_eq!(fill, 0);
            }
            _ => panic!("expected env build"),
        }
    }

    #[test]
    fn test_ota_staging() {
        let cli = Cli::try_parse_from(["bootflash", "ota", "boot.img", "--staging", "/data/tmp"])
            .unwrap();
        match cli.command {
            Commands::Ota { staging, .. } => assert_eq!(staging, "/data/tmp"),
            _ => panic!("expected ota"),
        }

        let cli = Cli::try_parse_from(["bootflash", "ota", "boot.img"]).unwrap();
        match cli.command {
            Commands::Ota { staging, .. } => assert_eq!(staging, "/"),
            _ => panic!("expected ota"),
        }

        assert!(Cli::try_parse_from(["bootflash", "ota", "boot.img", "--staging", "tmp"]).is_err());
        assert!(parse_staging("").is_err());
    }

    #[test]
    fn test_flash_args() {
        let cli = Cli::try_parse_from([
            "bootflash",
            "flash",
            "-t",
            "blkdev:dev=/dev/sdb",
            "--device-key",
            "mmcblk1",
            "-c",
            "boot.img",
        ])
        .unwrap();
        match cli.command {
            Commands::Flash {
                target,
                spec,
                images,
                confident,
                block_size,
                ..
            } => {
                assert_eq!(target, "blkdev:dev=/dev/sdb");
                assert_eq!(spec.device_key.as_deref(), Some("mmcblk1"));
                assert_eq!(spec.spec, PathBuf::from(".env.txt"));
                assert_eq!(images, [PathBuf::from("boot.img")]);
                assert!(confident);
                assert_eq!(block_size, 1024);
            }
            _ => panic!("expected flash"),
        }
    }
}
