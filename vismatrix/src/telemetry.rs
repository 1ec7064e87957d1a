use std::fmt;

use log::info;

use crate::VisMatrix;

const KILOBYTE: f64 = 1024.0;
const MEGABYTE: f64 = 1024.0 * 1024.0;

/// Storage used by a finished matrix and its transparency records
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReport {
    pub columns: usize,
    pub rows: usize,
    pub matrix_bytes: usize,
    pub transparency_records: usize,
    pub transparency_peak_bytes: usize,
}

impl MemoryReport {
    pub fn of(vis: &VisMatrix) -> Self {
        Self {
            columns: vis.matrix.num_patches(),
            rows: vis.matrix.row_count(),
            matrix_bytes: vis.matrix.memory_usage(),
            transparency_records: vis.transparency.len(),
            transparency_peak_bytes: vis.transparency.peak_bytes(),
        }
    }

    pub fn log(&self) {
        for line in self.to_string().lines() {
            info!("{line}");
        }
    }
}

/// `"  1.5 megs"` at or above a megabyte, `" 12.0 kilos"` below
pub fn human_bytes(bytes: usize) -> String {
    let bytes = bytes as f64;
    if bytes >= MEGABYTE {
        format!("{:5.1} megs", bytes / MEGABYTE)
    } else {
        format!("{:5.1} kilos", bytes / KILOBYTE)
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20}: {:5.1} megs ({} rows over {} columns)",
            "visibility matrix",
            self.matrix_bytes as f64 / MEGABYTE,
            self.rows,
            self.columns
        )?;
        if self.transparency_records > 0 {
            write!(
                f,
                "\n{:<20}: {} ({} records)",
                "custom shadow array",
                human_bytes(self.transparency_peak_bytes),
                self.transparency_records
            )?;
        }
        Ok(())
    }
}
