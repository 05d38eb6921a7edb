//! Flash command implementation

use super::{confirm, load_layout, print_report};
use crate::cli::SpecArgs;
use bootflash_core::flash::{ImageWriter, WriteOptions, WriteProgress, WriteReport};
use bootflash_core::size::format_size;
use bootflash_target::open_target;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Progress reporter using indicatif progress bars
pub struct IndicatifProgress {
    current_bar: Option<ProgressBar>,
    quiet: bool,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            current_bar: None,
            quiet: false,
        }
    }

    /// Only print reports, no bars
    pub fn quiet() -> Self {
        Self {
            current_bar: None,
            quiet: true,
        }
    }

    fn create_bar(&mut self, total: u64, image: &str) {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(image.to_string());
        self.current_bar = Some(pb);
    }

    fn finish(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteProgress for IndicatifProgress {
    fn writing(&mut self, image: &str, total_bytes: u64) {
        self.finish();
        if !self.quiet {
            self.create_bar(total_bytes, image);
        }
    }

    fn write_progress(&mut self, bytes_written: u64) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_written);
        }
    }

    fn complete(&mut self, report: &WriteReport) {
        self.finish();
        print_report(report);
    }
}

/// Run the flash command
pub fn run_flash(
    target: &str,
    spec: &SpecArgs,
    images: &[PathBuf],
    image_dir: &Path,
    options: WriteOptions,
    confident: bool,
) -> Result<(), Box<dyn Error>> {
    let layout = load_layout(spec)?;
    log::info!(
        "Layout for {}: {} region(s), {} reserved",
        layout.device,
        layout.len(),
        format_size(layout.total_reserved())
    );

    if !confident {
        confirm(target)?;
    }

    let mut device = open_target(target)?;
    let name = device.describe();
    let mut progress = IndicatifProgress::new();
    let mut writer = ImageWriter::new(&mut device, &layout)
        .with_image_dir(image_dir)
        .with_options(options);

    let reports = if images.is_empty() {
        println!("Writing all to {}\n", name);
        writer.write_all(&mut progress)?
    } else {
        let mut reports = Vec::with_capacity(images.len());
        for image in images {
            println!("Writing {} to {}\n", image.display(), name);
            reports.push(writer.write_image(image, &mut progress)?);
        }
        reports
    };

    let written: u64 = reports.iter().map(|r| r.image_size).sum();
    println!(
        "Flashed {} image(s), {} written",
        reports.len(),
        format_size(written)
    );
    Ok(())
}
