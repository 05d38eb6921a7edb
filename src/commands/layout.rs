//! Layout command implementations

use super::load_layout;
use crate::cli::SpecArgs;
use bootflash_core::partition::ResolvedLayout;
use bootflash_core::size::format_size;
use std::error::Error;
use std::path::Path;

/// Show the planned layout, optionally as TOML
pub fn cmd_show(spec: &SpecArgs, toml: bool, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let layout = load_layout(spec)?;
    print_layout(&layout);

    if toml {
        println!("\n--- TOML Output ---\n");
        println!("{}", layout.to_toml_string()?);
    }
    if let Some(out) = output {
        layout.to_toml_file(out)?;
        println!("\nSaved layout to {:?}", out);
    }
    Ok(())
}

/// Print layout information
pub fn print_layout(layout: &ResolvedLayout) {
    println!("Layout Information");
    println!("==================");
    println!("Device: {}", layout.device);
    println!("Used:   {}", format_size(layout.total_reserved()));

    println!("\nRegions ({}):", layout.len());
    println!(
        "{:<12} {:<16} {:>12} {:>10} {:>10} {:>8}",
        "Node", "Image", "Offset", "Size", "Used", "Fixed"
    );
    println!("{:-<73}", "");

    for region in &layout.regions {
        println!(
            "{:<12} {:<16} {:#012X} {:>10} {:>10} {:>8}",
            layout.partition_node(region),
            region.image,
            region.offset,
            format_size(region.size),
            format_size(region.used),
            if region.explicit_offset.is_some() { "yes" } else { "-" }
        );
    }
}
