//! bootflash - Partition-table driven image flasher for embedded Linux boards
//!
//! A board's bootloader environment carries a `blkdevparts=` line describing
//! where each partition lives. bootflash reads that line and writes the
//! matching `<name>.img` files into place:
//!
//! - **Local targets** (`blkdev`) - an SD card, loop device or disk image;
//!   every region is written at its byte offset
//! - **Running boards** (`adb`) - images are pushed over adb and copied onto
//!   the partition node with `dd`
//!
//! It also builds the bootloader environment image itself and installs kernel
//! module trees on a running board.

mod cli;
mod commands;

use bootflash_core::env::{ByteOrder, EnvImageBuilder};
use bootflash_core::flash::WriteOptions;
use clap::Parser;
use cli::{Cli, Commands, EnvCommands, LayoutCommands, ModulesCommands};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Flash {
            target,
            spec,
            images,
            image_dir,
            block_size,
            strict,
            confident,
        } => commands::flash::run_flash(
            &target,
            &spec,
            &images,
            &image_dir,
            WriteOptions {
                block_size,
                strict_capacity: strict,
            },
            confident,
        ),

        #[cfg(feature = "adb")]
        Commands::Ota {
            image,
            spec,
            serial,
            staging,
            block_size,
            no_reboot,
            confident,
        } => {
            let config = bootflash_adb::AdbConfig { serial, staging };
            commands::ota::run_ota(&image, &spec, &config, block_size, !no_reboot, confident)
        }

        #[cfg(feature = "adb")]
        Commands::Modules(ModulesCommands::Install { path, serial }) => {
            commands::modules::cmd_install(&path, serial)
        }

        #[cfg(not(feature = "adb"))]
        Commands::Ota { .. } | Commands::Modules(ModulesCommands::Install { .. }) => {
            Err("bootflash was built without adb support".into())
        }

        Commands::Env(EnvCommands::Build {
            input,
            output,
            size,
            redundant,
            big_endian,
            fill,
        }) => {
            let builder = EnvImageBuilder::new(size)
                .redundant(redundant)
                .byte_order(byte_order(big_endian))
                .fill(fill);
            commands::env::cmd_build(&input, &output, &builder)
        }

        Commands::Env(EnvCommands::Dump {
            input,
            redundant,
            big_endian,
        }) => commands::env::cmd_dump(&input, redundant, byte_order(big_endian)),

        Commands::Layout(LayoutCommands::Show { spec, toml, output }) => {
            commands::layout::cmd_show(&spec, toml, output.as_deref())
        }

        Commands::ListTargets => {
            commands::list_targets();
            Ok(())
        }
    }
}

fn byte_order(big_endian: bool) -> ByteOrder {
    if big_endian {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    }
}
