//! Runs one file end to end: parse, classify, normalise, order, write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::data::loader;
use crate::data::model::{RawScan, ScanBatch};
use crate::data::normalise::{NormalisationMode, normalise_batch};
use crate::data::ordering::reorder_batch;
use crate::data::writer;
use crate::error::Result as CurveResult;

/// Result of running the pipeline on one input file.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub source: PathBuf,
    /// Classified scans in file order, before normalisation.
    pub classified: ScanBatch,
    /// Final curves handed to the sinks.
    pub curves: ScanBatch,
    /// Tables written for `curves`, in the same order.
    pub written: Vec<PathBuf>,
}

impl ProcessedFile {
    /// File name for display purposes.
    pub fn label(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Normalise (optional) then order (optional) an already classified batch.
pub fn prepare(
    classified: &ScanBatch,
    mode: NormalisationMode,
    reorder: bool,
) -> CurveResult<ScanBatch> {
    let normalised = normalise_batch(classified, mode)?;
    if reorder {
        reorder_batch(&normalised)
    } else {
        Ok(normalised)
    }
}

/// Classify raw scans and run [`prepare`]. Returns the classified and final
/// batches.
pub fn process_scans(
    raw: Vec<RawScan>,
    config: &PipelineConfig,
) -> CurveResult<(ScanBatch, ScanBatch)> {
    let classified = ScanBatch::classify(raw)?;
    let curves = prepare(&classified, config.normalisation, config.reorder)?;
    Ok((classified, curves))
}

/// Parse `.mcc` text and run it through the pipeline, without any I/O.
pub fn process_contents(text: &str, config: &PipelineConfig) -> Result<ScanBatch> {
    let raw = loader::parse_mcc(text)?;
    let (_, curves) = process_scans(raw, config)?;
    Ok(curves)
}

/// Run the whole pipeline for one file.
///
/// Tables are written only after every stage has succeeded, and only when
/// `write_tables` is set (`write_tables` overrides the config for callers
/// such as the viewer that never write).
pub fn process_file(
    path: &Path,
    config: &PipelineConfig,
    write_tables: bool,
) -> Result<ProcessedFile> {
    let raw = loader::load_file(path)?;
    log::info!("{}: {} scans", path.display(), raw.len());

    let (classified, curves) =
        process_scans(raw, config).with_context(|| format!("processing {}", path.display()))?;
    if curves.is_empty() {
        log::warn!("{}: no scans found", path.display());
    }

    let written = if write_tables {
        let dir = config.output_directory_for(path);
        let written = writer::write_tables(&dir, &curves)?;
        log::info!("{}: wrote {} tables to {}", path.display(), written.len(), dir.display());
        written
    } else {
        Vec::new()
    };

    Ok(ProcessedFile {
        source: path.to_path_buf(),
        classified,
        curves,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::interpolate::interpolate_at;
    use crate::error::CurveError;
    use crate::data::model::CurveType;
    use std::fs;
    use tempfile::tempdir;

    fn mcc(scans: &[(&str, f64, Vec<(f64, f64)>)]) -> String {
        let mut text = String::from("BEGIN_SCAN_DATA\n\tFORMAT=MEPHISTO\n");
        for (i, (tag, depth, rows)) in scans.iter().enumerate() {
            text.push_str(&format!("\tBEGIN_SCAN  {}\n", i + 1));
            text.push_str(&format!("\t\tSCAN_CURVETYPE={tag}\n\t\tSCAN_DEPTH={depth:.2}\n"));
            text.push_str("\t\tBEGIN_DATA\n");
            for (d, y) in rows.iter() {
                text.push_str(&format!("\t\t\t{d:.2}\t{y:.3}\n"));
            }
            text.push_str(&format!("\t\tEND_DATA\n\tEND_SCAN  {}\n", i + 1));
        }
        text.push_str("END_SCAN_DATA\n");
        text
    }

    fn scenario() -> String {
        mcc(&[
            ("PDD", 0.0, vec![(0.0, 80.0), (10.0, 100.0), (20.0, 60.0)]),
            ("INPLANE_PROFILE", 10.0, vec![(-5.0, 40.0), (0.0, 50.0), (5.0, 45.0)]),
            ("CROSSPLANE_PROFILE", 10.0, vec![(-5.0, 30.0), (0.0, 40.0), (5.0, 35.0)]),
        ])
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_end_to_end_pdd_scenario() {
        let config = PipelineConfig {
            normalisation: NormalisationMode::Pdd,
            ..Default::default()
        };
        let curves = process_contents(&scenario(), &config).unwrap();

        assert_eq!(
            curves.curve_types(),
            vec![CurveType::Pdd, CurveType::InPlaneProfile, CurveType::CrossPlaneProfile]
        );
        assert_close(&curves.scans[0].dose, &[80.0, 100.0, 60.0]);
        assert_close(&curves.scans[1].dose, &[80.0, 100.0, 90.0]);
        assert_close(&curves.scans[2].dose, &[75.0, 100.0, 87.5]);
    }

    #[test]
    fn test_pdd_reference_consistency_after_reordering() {
        // Profiles come first in the file; the reference is still the first PDD.
        let text = mcc(&[
            ("CROSSPLANE_PROFILE", 5.0, vec![(-5.0, 30.0), (0.0, 40.0), (5.0, 35.0)]),
            ("PDD", 0.0, vec![(0.0, 40.0), (10.0, 80.0), (20.0, 60.0)]),
            ("INPLANE_PROFILE", 15.0, vec![(-5.0, 40.0), (0.0, 50.0), (5.0, 45.0)]),
            ("PDD", 0.0, vec![(0.0, 1.0), (20.0, 2.0)]),
        ]);
        let config = PipelineConfig {
            normalisation: NormalisationMode::Pdd,
            ..Default::default()
        };
        let curves = process_contents(&text, &config).unwrap();
        let sources: Vec<usize> = curves.scans.iter().map(|s| s.source_index).collect();
        assert_eq!(sources, vec![1, 3, 2, 0]);

        // Reference PDD normalised: [50, 100, 75]; at 15 mm -> 87.5, at 5 mm -> 75.
        let at_zero = |i: usize| {
            let scan = &curves.scans[i];
            interpolate_at(&scan.distance, &scan.dose, 0.0).unwrap()
        };
        assert!((at_zero(2) - 87.5).abs() < 1e-9);
        assert!((at_zero(3) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_reorder_keeps_file_order() {
        let text = mcc(&[
            ("CROSSPLANE_PROFILE", 5.0, vec![(-1.0, 1.0), (1.0, 1.0)]),
            ("PDD", 0.0, vec![(0.0, 1.0), (1.0, 2.0)]),
        ]);
        let config = PipelineConfig {
            reorder: false,
            ..Default::default()
        };
        let curves = process_contents(&text, &config).unwrap();
        assert_eq!(
            curves.curve_types(),
            vec![CurveType::CrossPlaneProfile, CurveType::Pdd]
        );
        // No normalisation by default.
        assert_eq!(curves.scans[1].dose, vec![1.0, 2.0]);
    }

    #[test]
    fn test_classification_error_is_surfaced() {
        let text = mcc(&[
            ("PDD", 0.0, vec![(0.0, 1.0), (1.0, 2.0)]),
            ("DIAGONAL_PROFILE", 5.0, vec![(-1.0, 1.0), (1.0, 1.0)]),
        ]);
        let err = process_contents(&text, &PipelineConfig::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CurveError>(),
            Some(&CurveError::Classification {
                scan: 1,
                tag: "DIAGONAL_PROFILE".to_string()
            })
        );
    }

    #[test]
    fn test_process_file_writes_tables() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("water.mcc");
        fs::write(&input, scenario()).unwrap();

        let config = PipelineConfig {
            normalisation: NormalisationMode::Cra,
            ..Default::default()
        };
        let processed = process_file(&input, &config, true).unwrap();

        let out = dir.path().join("water");
        assert_eq!(
            processed.written,
            vec![
                out.join("pdd_[0].csv"),
                out.join("inplaneprofile_10mm_[1].csv"),
                out.join("crossplaneprofile_10mm_[2].csv"),
            ]
        );
        let content = fs::read_to_string(&processed.written[1]).unwrap();
        assert_eq!(content.lines().nth(2), Some("0,100"));
        assert_eq!(processed.label(), "water.mcc");
        assert_eq!(processed.classified.len(), 3);
    }

    #[test]
    fn test_failed_file_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.mcc");
        // Profile does not cover distance 0.
        let text = mcc(&[
            ("PDD", 0.0, vec![(0.0, 1.0), (1.0, 2.0)]),
            ("INPLANE_PROFILE", 0.5, vec![(1.0, 1.0), (2.0, 1.0)]),
        ]);
        fs::write(&input, text).unwrap();

        let config = PipelineConfig {
            normalisation: NormalisationMode::Cra,
            ..Default::default()
        };
        let err = process_file(&input, &config, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CurveError>(),
            Some(CurveError::InterpolationDomain { scan: Some(1), .. })
        ));
        assert!(!dir.path().join("broken").exists());
    }

    #[test]
    fn test_process_file_without_tables() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.mcc");
        fs::write(&input, scenario()).unwrap();
        let processed = process_file(&input, &PipelineConfig::default(), false).unwrap();
        assert!(processed.written.is_empty());
        assert!(!dir.path().join("scan").exists());
    }
}
