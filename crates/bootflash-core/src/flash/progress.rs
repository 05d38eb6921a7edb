//! Progress reporting

use super::WriteReport;

/// Progress callbacks for region writes
pub trait WriteProgress {
    /// Called when an image starts streaming to its region
    fn writing(&mut self, image: &str, total_bytes: u64);

    /// Called as bytes are written
    fn write_progress(&mut self, bytes_written: u64);

    /// Called when the region is done
    fn complete(&mut self, report: &WriteReport);
}

/// A no-op progress reporter
pub struct NoProgress;

impl WriteProgress for NoProgress {
    fn writing(&mut self, _image: &str, _total_bytes: u64) {}
    fn write_progress(&mut self, _bytes_written: u64) {}
    fn complete(&mut self, _report: &WriteReport) {}
}
