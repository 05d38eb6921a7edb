//! List commands implementation

use bootflash_target::available_targets;

/// List all write targets compiled into this build
pub fn list_targets() {
    let targets = available_targets();
    if targets.is_empty() {
        println!("No targets available (recompile with features)");
        return;
    }

    println!("Available targets:");
    println!();
    for target in &targets {
        let aliases = if target.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", target.aliases.join(", "))
        };
        println!("  {:<8} - {}{}", target.name, target.description, aliases);
    }
}
