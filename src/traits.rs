use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::Result;
use linfa::Float;

/// Contract of an incrementally trainable classifier usable as an ensemble
/// base learner.
///
/// `Clone` doubles as the deep-copy capability: every ensemble member is an
/// independent clone of a freshly reset prototype, with no shared mutable
/// state.
pub trait OnlineClassifier<F: Float>: Clone {
    /// Drop all learned state, restoring the freshly constructed model
    fn reset(&mut self);

    /// Incorporate a batch of samples.
    ///
    /// `classes` must list every label the learner will ever see; it is
    /// required while the learner is untrained and ignored afterwards.
    fn partial_fit(
        &mut self,
        x: ArrayView2<F>,
        y: &[usize],
        classes: Option<&[usize]>,
        sample_weight: Option<ArrayView1<F>>,
    ) -> Result<()>;

    /// Predicted label per row. Entries may be absent when the learner cannot
    /// commit to a label.
    fn predict(&self, x: ArrayView2<F>) -> Result<Vec<Option<usize>>>;

    /// Per-row probability vectors, with one column per class label known to
    /// this learner (which may be fewer than the ensemble knows).
    fn predict_proba(&self, x: ArrayView2<F>) -> Result<Array2<F>>;
}

/// Contract of a streaming change detector monitoring a bounded signal.
///
/// `Clone` doubles as the fresh-instance capability used when a drifted
/// ensemble member has its detector replaced.
pub trait DriftDetector: Clone {
    /// Feed one observation of the monitored signal
    fn add_element(&mut self, value: f64);

    /// Current estimate of the monitored signal's mean
    fn estimation(&self) -> f64;

    /// Whether the most recent observation triggered a change
    fn detected_change(&self) -> bool;
}
