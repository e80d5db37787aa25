use std::fmt;

use serde::{Deserialize, Serialize};

use super::interpolate::{centroid, interpolate_at, max_dose};
use super::model::{CurveType, Scan, ScanBatch};
use crate::error::{CurveError, Result};

// ---------------------------------------------------------------------------
// NormalisationMode – which reference each profile is scaled to
// ---------------------------------------------------------------------------

/// How profile curves are rescaled. PDD curves are always scaled to their own
/// maximum, whatever the mode (except `None`, which leaves everything as is).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalisationMode {
    /// Leave the raw doses untouched.
    #[default]
    None,
    /// Central-axis dose (distance 0) becomes 100.
    Cra,
    /// Dose at the half-max thresholded centre of mass becomes 100.
    Cm,
    /// Central-axis dose becomes the PDD value at the profile's depth.
    Pdd,
}

impl NormalisationMode {
    pub const ALL: [NormalisationMode; 4] = [
        NormalisationMode::None,
        NormalisationMode::Cra,
        NormalisationMode::Cm,
        NormalisationMode::Pdd,
    ];
}

impl fmt::Display for NormalisationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalisationMode::None => write!(f, "NONE"),
            NormalisationMode::Cra => write!(f, "CRA"),
            NormalisationMode::Cm => write!(f, "CM"),
            NormalisationMode::Pdd => write!(f, "PDD"),
        }
    }
}

/// Dose every normalised reference point is scaled to.
pub const NORMALISED_DOSE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Per-curve primitives
// ---------------------------------------------------------------------------

/// Scale a PDD so its maximum becomes 100.
pub fn normalise_pdd(dose: &[f64]) -> Result<Vec<f64>> {
    let max = max_dose(dose);
    scale(dose, NORMALISED_DOSE, max)
}

/// Scale a profile so its dose at distance 0 becomes 100.
pub fn normalise_profile_to_cra(distance: &[f64], dose: &[f64]) -> Result<Vec<f64>> {
    let reference = interpolate_at(distance, dose, 0.0)?;
    scale(dose, NORMALISED_DOSE, reference)
}

/// Scale a profile so its dose at the centre of mass becomes 100.
pub fn normalise_profile_to_cm(distance: &[f64], dose: &[f64]) -> Result<Vec<f64>> {
    let cm = centroid(distance, dose)?;
    let reference = interpolate_at(distance, dose, cm)?;
    scale(dose, NORMALISED_DOSE, reference)
}

/// Scale a profile so its dose at distance 0 equals `target`.
pub fn normalise_profile_to_value(
    distance: &[f64],
    dose: &[f64],
    target: f64,
) -> Result<Vec<f64>> {
    let reference = interpolate_at(distance, dose, 0.0)?;
    scale(dose, target, reference)
}

fn scale(dose: &[f64], target: f64, reference: f64) -> Result<Vec<f64>> {
    if !(reference > 0.0) {
        return Err(CurveError::DegenerateCurve {
            scan: None,
            reference,
        });
    }
    let factor = target / reference;
    Ok(dose.iter().map(|&d| d * factor).collect())
}

// ---------------------------------------------------------------------------
// PDD reference for profile normalisation
// ---------------------------------------------------------------------------

/// A self-normalised PDD used to look up the central-axis dose at depth.
///
/// Always built from the first PDD in source order, never the closest or
/// deepest one.
#[derive(Debug, Clone)]
pub struct PddReference {
    pub scan: usize,
    distance: Vec<f64>,
    dose: Vec<f64>,
}

impl PddReference {
    /// Pick the first PDD in batch order and self-normalise it.
    pub fn from_batch(batch: &ScanBatch) -> Result<Self> {
        let pdd = batch
            .scans
            .iter()
            .find(|s| s.curve_type == CurveType::Pdd)
            .ok_or(CurveError::MissingReference)?;
        let dose = normalise_pdd(&pdd.dose).map_err(|e| e.at_scan(pdd.source_index))?;
        Ok(PddReference {
            scan: pdd.source_index,
            distance: pdd.distance.clone(),
            dose,
        })
    }

    /// Normalised PDD dose at `depth` mm.
    pub fn dose_at(&self, depth: f64) -> Result<f64> {
        interpolate_at(&self.distance, &self.dose, depth)
    }
}

// ---------------------------------------------------------------------------
// Batch normalisation
// ---------------------------------------------------------------------------

/// Normalise every scan of `batch`, returning a new batch of the same shape
/// and order. The first failing scan aborts the call.
pub fn normalise_batch(batch: &ScanBatch, mode: NormalisationMode) -> Result<ScanBatch> {
    let reference = match mode {
        NormalisationMode::Pdd => {
            let reference = PddReference::from_batch(batch)?;
            log::debug!("PDD reference: scan {}", reference.scan);
            Some(reference)
        }
        NormalisationMode::None | NormalisationMode::Cra | NormalisationMode::Cm => None,
    };

    let scans = batch
        .scans
        .iter()
        .map(|scan| {
            normalise_scan(scan, mode, reference.as_ref())
                .map(|dose| scan.with_dose(dose))
                .map_err(|e| e.at_scan(scan.source_index))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScanBatch { scans })
}

fn normalise_scan(
    scan: &Scan,
    mode: NormalisationMode,
    reference: Option<&PddReference>,
) -> Result<Vec<f64>> {
    use NormalisationMode as Mode;

    match (mode, scan.curve_type, reference) {
        (Mode::None, _, _) => Ok(scan.dose.clone()),
        (_, CurveType::Pdd, _) => normalise_pdd(&scan.dose),
        (Mode::Cra, _, _) => normalise_profile_to_cra(&scan.distance, &scan.dose),
        (Mode::Cm, _, _) => normalise_profile_to_cm(&scan.distance, &scan.dose),
        (Mode::Pdd, _, Some(pdd)) => {
            let target = pdd.dose_at(scan.depth)?;
            normalise_profile_to_value(&scan.distance, &scan.dose, target)
        }
        (Mode::Pdd, _, None) => Err(CurveError::MissingReference),
    }
}
