use thiserror::Error;

// ---------------------------------------------------------------------------
// CurveError – every failure the numeric core can report
// ---------------------------------------------------------------------------

/// Errors raised while classifying, normalising or ordering a batch of scans.
///
/// `scan` is the position of the offending scan in the source file. Pure
/// resolver functions do not know which scan they work on and leave it as
/// `None`; the normalisation stage fills it in via [`CurveError::at_scan`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// The curve-type tag is not one of the three recognised literals.
    #[error("scan {scan}: unrecognised curve type '{tag}'")]
    Classification { scan: usize, tag: String },

    /// Interpolation was asked for a point outside the sampled range.
    #[error("{}query {query} lies outside the sampled range [{min}, {max}]", scan_prefix(.scan))]
    InterpolationDomain {
        scan: Option<usize>,
        query: f64,
        min: f64,
        max: f64,
    },

    /// A normalisation reference dose is not strictly positive.
    #[error("{}degenerate curve, reference dose {reference} is not positive", scan_prefix(.scan))]
    DegenerateCurve { scan: Option<usize>, reference: f64 },

    /// PDD-referenced normalisation was requested without any PDD scan.
    #[error("PDD normalisation requested but the batch contains no PDD scan")]
    MissingReference,

    /// Distance and dose arrays of one scan differ in length.
    #[error("scan {scan}: distance has {distance_len} samples but dose has {dose_len}")]
    BatchShape {
        scan: usize,
        distance_len: usize,
        dose_len: usize,
    },

    /// The curve ordering is not a permutation of the batch.
    #[error("curve ordering covers {actual} of {expected} scans")]
    OrderingInconsistent { expected: usize, actual: usize },
}

fn scan_prefix(scan: &Option<usize>) -> String {
    match scan {
        Some(i) => format!("scan {i}: "),
        None => String::new(),
    }
}

impl CurveError {
    /// Attach the scan position to errors raised by scan-agnostic helpers.
    pub fn at_scan(self, index: usize) -> Self {
        match self {
            CurveError::InterpolationDomain {
                scan: None,
                query,
                min,
                max,
            } => CurveError::InterpolationDomain {
                scan: Some(index),
                query,
                min,
                max,
            },
            CurveError::DegenerateCurve {
                scan: None,
                reference,
            } => CurveError::DegenerateCurve {
                scan: Some(index),
                reference,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;
