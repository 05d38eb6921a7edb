//! Env image commands

use super::CommandError;
use bootflash_core::env::{ByteOrder, EnvImage, EnvImageBuilder};
use bootflash_core::size::format_size;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Build an env image from `input` (`-` reads stdin) into `output`
pub fn cmd_build(
    input: &Path,
    output: &Path,
    builder: &EnvImageBuilder,
) -> Result<(), Box<dyn Error>> {
    let text = read_input(input)?;
    let image = build_env_file(&text, output, builder)?;

    println!(
        "Wrote {} ({} bytes, {} variable(s), {} used, crc {:#010x})",
        output.display(),
        image.len(),
        image.variable_count(),
        format_size(image.used() as u64),
        image.checksum()
    );
    Ok(())
}

/// Build the image and write it; nothing is written on failure
pub fn build_env_file(
    text: &str,
    output: &Path,
    builder: &EnvImageBuilder,
) -> Result<EnvImage, Box<dyn Error>> {
    if text.is_empty() {
        return Err(CommandError::EmptyInput.into());
    }
    let image = builder.build_text(text)?;
    fs::write(output, image.as_bytes())?;
    Ok(image)
}

fn read_input(input: &Path) -> Result<String, Box<dyn Error>> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(input)
            .map_err(|e| format!("Failed to read {}: {}", input.display(), e).into())
    }
}

/// Verify an env image and print its variables
pub fn cmd_dump(input: &Path, redundant: bool, byte_order: ByteOrder) -> Result<(), Box<dyn Error>> {
    let data = fs::read(input)?;
    let env = EnvImage::decode(&data, redundant, byte_order)?;

    println!("# {} ({} bytes), crc {:#010x} ok", input.display(), data.len(), env.checksum);
    if let Some(flag) = env.flag {
        println!("# flag {}", flag);
    }
    for variable in &env.variables {
        println!("{}", variable);
    }
    Ok(())
}
