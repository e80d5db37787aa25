use std::fmt;

use crate::error::{CurveError, Result};

// ---------------------------------------------------------------------------
// CurveType – what kind of measurement a scan is
// ---------------------------------------------------------------------------

/// The three scan kinds a Mephisto export can contain.
///
/// The declaration order is the output order used by
/// [`crate::data::ordering`], so `Ord` is meaningful here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CurveType {
    /// Percentage depth dose along the beam axis.
    Pdd,
    /// Lateral profile in the gun-target direction.
    InPlaneProfile,
    /// Lateral profile perpendicular to the in-plane direction.
    CrossPlaneProfile,
}

impl CurveType {
    pub const ALL: [CurveType; 3] = [
        CurveType::Pdd,
        CurveType::InPlaneProfile,
        CurveType::CrossPlaneProfile,
    ];

    /// Map a raw `SCAN_CURVETYPE` tag to a curve type.
    ///
    /// Only the exact literals `PDD`, `INPLANE_PROFILE` and
    /// `CROSSPLANE_PROFILE` are accepted; `scan` is used for error reporting.
    pub fn classify(tag: &str, scan: usize) -> Result<Self> {
        match tag {
            "PDD" => Ok(CurveType::Pdd),
            "INPLANE_PROFILE" => Ok(CurveType::InPlaneProfile),
            "CROSSPLANE_PROFILE" => Ok(CurveType::CrossPlaneProfile),
            other => Err(CurveError::Classification {
                scan,
                tag: other.to_string(),
            }),
        }
    }

    pub fn is_profile(self) -> bool {
        !matches!(self, CurveType::Pdd)
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveType::Pdd => write!(f, "PDD"),
            CurveType::InPlaneProfile => write!(f, "in-plane profile"),
            CurveType::CrossPlaneProfile => write!(f, "cross-plane profile"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawScan – one scan as delivered by the parser
// ---------------------------------------------------------------------------

/// An unclassified scan straight out of the `.mcc` parser.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScan {
    /// Sampling positions in mm.
    pub distance: Vec<f64>,
    /// Relative dose, index-aligned with `distance`.
    pub dose: Vec<f64>,
    /// Value of the `SCAN_CURVETYPE` header field.
    pub curve_type: String,
    /// Value of the `SCAN_DEPTH` header field in mm.
    pub depth: f64,
}

// ---------------------------------------------------------------------------
// Scan – one classified curve
// ---------------------------------------------------------------------------

/// A classified, sampled curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Position of the scan in the source file (0-based). Survives reordering.
    pub source_index: usize,
    pub distance: Vec<f64>,
    pub dose: Vec<f64>,
    pub curve_type: CurveType,
    /// Measurement depth in mm. Carried but unused for PDD scans.
    pub depth: f64,
}

impl Scan {
    /// Copy of this scan with a replacement dose array.
    pub fn with_dose(&self, dose: Vec<f64>) -> Scan {
        Scan {
            dose,
            ..self.clone()
        }
    }

    /// Short human label, e.g. `in-plane profile 100 mm [3]`.
    pub fn label(&self) -> String {
        match self.curve_type {
            CurveType::Pdd => format!("PDD [{}]", self.source_index),
            kind => format!("{kind} {} mm [{}]", self.depth, self.source_index),
        }
    }
}

// ---------------------------------------------------------------------------
// ScanBatch – all scans of one file
// ---------------------------------------------------------------------------

/// All scans of one input file, in significant order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanBatch {
    pub scans: Vec<Scan>,
}

impl ScanBatch {
    /// Classify every raw scan. The first unrecognised tag or shape mismatch
    /// aborts the whole batch.
    pub fn classify(raw: Vec<RawScan>) -> Result<Self> {
        let scans = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                if r.distance.len() != r.dose.len() {
                    return Err(CurveError::BatchShape {
                        scan: i,
                        distance_len: r.distance.len(),
                        dose_len: r.dose.len(),
                    });
                }
                let curve_type = CurveType::classify(&r.curve_type, i)?;
                Ok(Scan {
                    source_index: i,
                    distance: r.distance,
                    dose: r.dose,
                    curve_type,
                    depth: r.depth,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ScanBatch { scans })
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    pub fn curve_types(&self) -> Vec<CurveType> {
        self.scans.iter().map(|s| s.curve_type).collect()
    }

    /// Number of scans of the given kind.
    pub fn count(&self, kind: CurveType) -> usize {
        self.scans.iter().filter(|s| s.curve_type == kind).count()
    }
}
