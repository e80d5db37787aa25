use super::model::{CurveType, ScanBatch};
use crate::error::{CurveError, Result};

// ---------------------------------------------------------------------------
// Curve ordering: PDDs, then in-plane, then cross-plane profiles
// ---------------------------------------------------------------------------

/// Output order of the curve groups.
pub const GROUP_ORDER: [CurveType; 3] = [
    CurveType::Pdd,
    CurveType::InPlaneProfile,
    CurveType::CrossPlaneProfile,
];

/// Stable grouping permutation for a list of curve types.
///
/// Returns the input indices grouped by [`GROUP_ORDER`], each group keeping
/// its original relative order. Fails if the result is not a permutation of
/// `0..types.len()`.
pub fn curve_order(types: &[CurveType]) -> Result<Vec<usize>> {
    let order: Vec<usize> = GROUP_ORDER
        .iter()
        .flat_map(|group| {
            types
                .iter()
                .enumerate()
                .filter(move |(_, t)| *t == group)
                .map(|(i, _)| i)
        })
        .collect();

    let mut seen = vec![false; types.len()];
    for &i in &order {
        if std::mem::replace(&mut seen[i], true) {
            return Err(CurveError::OrderingInconsistent {
                expected: types.len(),
                actual: order.len(),
            });
        }
    }
    if order.len() != types.len() {
        return Err(CurveError::OrderingInconsistent {
            expected: types.len(),
            actual: order.len(),
        });
    }
    Ok(order)
}

/// A new batch holding the scans of `batch` in [`curve_order`].
pub fn reorder_batch(batch: &ScanBatch) -> Result<ScanBatch> {
    let order = curve_order(&batch.curve_types())?;
    log::debug!("curve order: {order:?}");
    Ok(ScanBatch {
        scans: order.into_iter().map(|i| batch.scans[i].clone()).collect(),
    })
}
