//! Position-wise aggregation of per-learner probability outputs.

use linfa::Float;
use ndarray::Array2;

use crate::error::Result;

/// Sum per-learner probability matrices position-wise and normalize each row
/// by its sum.
///
/// Learners may report fewer classes than already accumulated; their rows are
/// extended on the fly. Rows whose accumulated sum is zero are left as zero
/// vectors. Returns `None` when any learner output is structurally
/// incompatible: an error, a row count other than `nsamples`, or more columns
/// than `max_label + 1` (probability columns are indexed by class label).
pub(crate) fn aggregate<F: Float>(
    partials: impl IntoIterator<Item = Result<Array2<F>>>,
    nsamples: usize,
    max_label: usize,
) -> Option<Array2<F>> {
    let mut rows: Vec<Vec<F>> = vec![Vec::new(); nsamples];
    for partial in partials {
        let partial = partial.ok()?;
        if partial.nrows() != nsamples || partial.ncols() > max_label + 1 {
            return None;
        }
        for (acc, row) in rows.iter_mut().zip(partial.outer_iter()) {
            for (label, &p) in row.iter().enumerate() {
                if label < acc.len() {
                    acc[label] = acc[label] + p;
                } else {
                    acc.push(p);
                }
            }
        }
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut proba = Array2::zeros((nsamples, width));
    for (mut out, acc) in proba.outer_iter_mut().zip(rows.iter()) {
        let total = acc.iter().fold(F::zero(), |sum, &p| sum + p);
        for (label, &p) in acc.iter().enumerate() {
            out[label] = if total > F::zero() { p / total } else { p };
        }
    }
    Some(proba)
}
