use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::{CurveType, Scan, ScanBatch};

// ---------------------------------------------------------------------------
// Per-curve CSV output
// ---------------------------------------------------------------------------

/// Header row of every curve table.
pub const TABLE_HEADER: [&str; 2] = ["distance_mm", "dose"];

/// File name for the curve at final position `index`.
///
/// `pdd_[i].csv`, `inplaneprofile_<depth>mm_[i].csv` or
/// `crossplaneprofile_<depth>mm_[i].csv`, with the depth truncated to whole mm.
pub fn table_file_name(scan: &Scan, index: usize) -> String {
    let depth = scan.depth.trunc() as i64;
    match scan.curve_type {
        CurveType::Pdd => format!("pdd_[{index}].csv"),
        CurveType::InPlaneProfile => format!("inplaneprofile_{depth}mm_[{index}].csv"),
        CurveType::CrossPlaneProfile => format!("crossplaneprofile_{depth}mm_[{index}].csv"),
    }
}

/// Directory used when none is configured: a sibling of `input` named after
/// its file stem (`scans/water.mcc` → `scans/water/`).
pub fn default_output_directory(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "mephisto".into());
    input
        .parent()
        .map(|p| p.join(&stem))
        .unwrap_or_else(|| PathBuf::from(stem))
}

/// Write one two-column CSV per curve into `dir`, creating it if needed.
/// Returns the written paths in batch order.
pub fn write_tables(dir: &Path, batch: &ScanBatch) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    batch
        .scans
        .iter()
        .enumerate()
        .map(|(index, scan)| {
            let path = dir.join(table_file_name(scan, index));
            write_table(&path, scan)?;
            log::debug!("wrote {}", path.display());
            Ok(path)
        })
        .collect()
}

fn write_table(path: &Path, scan: &Scan) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(TABLE_HEADER)?;
    for (distance, dose) in scan.distance.iter().zip(&scan.dose) {
        writer.write_record(&[distance.to_string(), dose.to_string()])?;
    }
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
