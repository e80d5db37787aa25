use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::RawScan;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse a Mephisto `.mcc` file.
pub fn load_file(path: &Path) -> Result<Vec<RawScan>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_mcc(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Parse the text of a Mephisto `.mcc` export.
///
/// Expected layout (indentation is irrelevant):
///
/// ```text
/// BEGIN_SCAN_DATA
///     BEGIN_SCAN  1
///         SCAN_CURVETYPE=INPLANE_PROFILE
///         SCAN_DEPTH=100.00
///         BEGIN_DATA
///             -60.00    12.31    ...
///              ...
///         END_DATA
///     END_SCAN  1
/// END_SCAN_DATA
/// ```
///
/// Only `SCAN_CURVETYPE`, `SCAN_DEPTH` and the first two data columns
/// (distance, dose) are used. Tags are not validated here.
pub fn parse_mcc(text: &str) -> Result<Vec<RawScan>> {
    let mut scans = Vec::new();
    let mut current: Option<ScanBuilder> = None;

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        if line.is_empty() {
            continue;
        }

        // Outside a scan: file-level header, ignored.
        let Some(scan) = current.as_mut() else {
            let opens_scan = line == "BEGIN_SCAN"
                || line.starts_with("BEGIN_SCAN ")
                || line.starts_with("BEGIN_SCAN\t");
            if opens_scan {
                current = Some(ScanBuilder::new(line_no));
            }
            continue;
        };

        if scan.in_data {
            if line == "END_DATA" {
                scan.in_data = false;
            } else {
                let (distance, dose) = parse_data_row(line, line_no)?;
                scan.distance.push(distance);
                scan.dose.push(dose);
            }
            continue;
        }

        if line == "BEGIN_DATA" {
            scan.in_data = true;
        } else if line.starts_with("END_SCAN") && !line.starts_with("END_SCAN_DATA") {
            if let Some(finished) = current.take() {
                scans.push(finished.finish(scans.len())?);
            }
        } else if line.starts_with("BEGIN_SCAN") && !line.starts_with("BEGIN_SCAN_DATA") {
            bail!(
                "line {line_no}: new scan begins before scan opened on line {} ended",
                scan.start_line
            );
        } else if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                "SCAN_CURVETYPE" => scan.curve_type = Some(value.trim().to_string()),
                "SCAN_DEPTH" => {
                    let depth = value.trim().parse::<f64>().with_context(|| {
                        format!("line {line_no}: SCAN_DEPTH '{value}' is not a number")
                    })?;
                    scan.depth = Some(depth);
                }
                _ => {}
            }
        }
    }

    if let Some(scan) = current {
        if scan.in_data {
            bail!("data block of scan opened on line {} is never closed", scan.start_line);
        }
        bail!("scan opened on line {} is never closed", scan.start_line);
    }

    log::debug!("parsed {} scans", scans.len());
    Ok(scans)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct ScanBuilder {
    start_line: usize,
    in_data: bool,
    curve_type: Option<String>,
    depth: Option<f64>,
    distance: Vec<f64>,
    dose: Vec<f64>,
}

impl ScanBuilder {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            in_data: false,
            curve_type: None,
            depth: None,
            distance: Vec::new(),
            dose: Vec::new(),
        }
    }

    fn finish(self, index: usize) -> Result<RawScan> {
        let curve_type = self.curve_type.with_context(|| {
            format!(
                "scan {index} (line {}): missing SCAN_CURVETYPE",
                self.start_line
            )
        })?;
        let depth = self.depth.unwrap_or_else(|| {
            log::warn!(
                "scan {index} (line {}): no SCAN_DEPTH, assuming 0 mm",
                self.start_line
            );
            0.0
        });
        Ok(RawScan {
            distance: self.distance,
            dose: self.dose,
            curve_type,
            depth,
        })
    }
}

fn parse_data_row(line: &str, line_no: usize) -> Result<(f64, f64)> {
    let mut columns = line.split_whitespace();
    let (Some(distance), Some(dose)) = (columns.next(), columns.next()) else {
        bail!("line {line_no}: data row '{line}' needs at least two columns");
    };
    let parse = |tok: &str| {
        tok.parse::<f64>()
            .with_context(|| format!("line {line_no}: '{tok}' is not a number"))
    };
    Ok((parse(distance)?, parse(dose)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
BEGIN_SCAN_DATA
\tFORMAT=MEPHISTO
\tFILE_CREATION_DATE=01-Jan-2015 10:00:00
\tBEGIN_SCAN  1
\t\tTASK_NAME=tbaScan
\t\tSCAN_CURVETYPE=PDD
\t\tSCAN_DEPTH=0.00
\t\tBEGIN_DATA
\t\t\t0.00\t80.0\t0.0
\t\t\t10.00\t100.0\t0.0
\t\t\t20.00\t60.0\t0.0
\t\tEND_DATA
\tEND_SCAN  1
\tBEGIN_SCAN  2
\t\tSCAN_CURVETYPE=INPLANE_PROFILE
\t\tSCAN_DEPTH=100.00
\t\tBEGIN_DATA
\t\t\t-5.00\t4.0E+001
\t\t\t0.00\t50.0
\t\t\t5.00\t45.0
\t\tEND_DATA
\tEND_SCAN  2
END_SCAN_DATA
";

    #[test]
    fn test_parse_sample() {
        let scans = parse_mcc(SAMPLE).unwrap();
        assert_eq!(scans.len(), 2);

        assert_eq!(scans[0].curve_type, "PDD");
        assert_eq!(scans[0].depth, 0.0);
        assert_eq!(scans[0].distance, vec![0.0, 10.0, 20.0]);
        assert_eq!(scans[0].dose, vec![80.0, 100.0, 60.0]);

        assert_eq!(scans[1].curve_type, "INPLANE_PROFILE");
        assert_eq!(scans[1].depth, 100.0);
        assert_eq!(scans[1].dose, vec![40.0, 50.0, 45.0]);
    }

    #[test]
    fn test_parse_keeps_unknown_tags_for_classifier() {
        let text = SAMPLE.replace("INPLANE_PROFILE", "DIAGONAL_PROFILE");
        let scans = parse_mcc(&text).unwrap();
        assert_eq!(scans[1].curve_type, "DIAGONAL_PROFILE");
    }

    #[test]
    fn test_missing_depth_defaults_to_zero() {
        let text = SAMPLE.replace("\t\tSCAN_DEPTH=100.00\n", "");
        let scans = parse_mcc(&text).unwrap();
        assert_eq!(scans[1].depth, 0.0);
    }

    #[test]
    fn test_missing_curve_type_is_error() {
        let text = SAMPLE.replace("\t\tSCAN_CURVETYPE=PDD\n", "");
        let err = parse_mcc(&text).unwrap_err();
        assert!(format!("{err:#}").contains("missing SCAN_CURVETYPE"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = SAMPLE.replace("10.00\t100.0", "10.00\tabc");
        let err = parse_mcc(&text).unwrap_err();
        assert!(format!("{err:#}").contains("line 10"));
    }

    #[test]
    fn test_short_data_row_is_error() {
        let text = SAMPLE.replace("\t\t\t0.00\t50.0\n", "\t\t\t0.00\n");
        assert!(parse_mcc(&text).is_err());
    }

    #[test]
    fn test_unterminated_scan_is_error() {
        let text = SAMPLE.replace("\tEND_SCAN  2\n", "");
        let err = parse_mcc(&text).unwrap_err();
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn test_empty_file_has_no_scans() {
        assert!(parse_mcc("").unwrap().is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let scans = load_file(file.path()).unwrap();
        assert_eq!(scans.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file(Path::new("/definitely/not/here.mcc")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
