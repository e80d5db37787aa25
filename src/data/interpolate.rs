use crate::error::{CurveError, Result};

// ---------------------------------------------------------------------------
// Reference resolution on a sampled curve
// ---------------------------------------------------------------------------

/// Fraction of the maximum dose below which samples get zero weight in
/// [`centroid`].
pub const CENTROID_THRESHOLD: f64 = 0.5;

/// Linearly interpolate `dose` at `query`.
///
/// `distance` must be monotonic (ascending or descending); it is never
/// sorted here. No extrapolation: a query outside
/// `[min(distance), max(distance)]` is an [`CurveError::InterpolationDomain`]
/// error, as is any query against an empty curve or a NaN query. A query
/// equal to a sample position returns that sample's dose exactly.
pub fn interpolate_at(distance: &[f64], dose: &[f64], query: f64) -> Result<f64> {
    let (min, max) = bounds(distance);
    let domain_error = CurveError::InterpolationDomain {
        scan: None,
        query,
        min,
        max,
    };

    if distance.is_empty() || !(query >= min && query <= max) {
        return Err(domain_error);
    }

    for (k, (&x, &y)) in distance.iter().zip(dose).enumerate() {
        if x == query {
            return Ok(y);
        }
        let (Some(&x1), Some(&y1)) = (distance.get(k + 1), dose.get(k + 1)) else {
            break;
        };
        let inside = (x < query && query < x1) || (x1 < query && query < x);
        if inside {
            return Ok(y + (query - x) * (y1 - y) / (x1 - x));
        }
    }

    // Only reachable for non-monotonic input where the query falls in a gap.
    Err(domain_error)
}

/// Dose-weighted mean position of the curve.
///
/// Samples below `CENTROID_THRESHOLD * max(dose)` are given zero weight, the
/// rest are weighted by their dose. A curve whose total weight is not
/// positive (empty, all zero, all negative) is a
/// [`CurveError::DegenerateCurve`].
pub fn centroid(distance: &[f64], dose: &[f64]) -> Result<f64> {
    let threshold = CENTROID_THRESHOLD * max_dose(dose);

    let (weighted_sum, total_weight) = distance
        .iter()
        .zip(dose)
        .map(|(&x, &w)| if w < threshold { (x, 0.0) } else { (x, w) })
        .fold((0.0, 0.0), |(sum, total), (x, w)| (sum + x * w, total + w));

    if !(total_weight > 0.0) {
        return Err(CurveError::DegenerateCurve {
            scan: None,
            reference: total_weight,
        });
    }
    Ok(weighted_sum / total_weight)
}

/// Largest dose value, `-inf` for an empty curve.
pub fn max_dose(dose: &[f64]) -> f64 {
    dose.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

fn bounds(distance: &[f64]) -> (f64, f64) {
    let min = distance.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = distance.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}
