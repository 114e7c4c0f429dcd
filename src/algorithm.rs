use std::collections::HashSet;

use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::{Distribution, Poisson};
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;

use crate::adwin::Adwin;
use crate::aggregate::aggregate;
use crate::error::{Result, SmoteBaggingError};
use crate::hyperparams::{SmoteBaggingParams, SmoteBaggingValidParams};
use crate::smote::OnlineSmote;
use crate::traits::{DriftDetector, OnlineClassifier};
use linfa::traits::PredictInplace;
use linfa::{Float, ParamGuard};

/// Label of the minority class targeted for oversampling
pub const POSITIVE_LABEL: usize = 1;

/// One ensemble position: a learner paired with the detector tracking its
/// correctness stream. Both are refreshed together on replacement.
#[derive(Debug, Clone)]
struct EnsembleMember<L, D> {
    learner: L,
    detector: D,
}

/// Online SMOTEBagging ensemble classifier for imbalanced data streams.
///
/// Maintains a pool of base learners trained by online bagging: each incoming
/// sample is presented to every learner a Poisson-distributed number of
/// times, with a rate that grows linearly with the learner's position for
/// positive (minority) samples. The synthesis budget moves the opposite way,
/// so early positions mostly train on SMOTE-synthesized minority samples and
/// late positions mostly resample the original. A drift detector per member
/// tracks its correctness stream and drives in-place replacement of decayed
/// members.
///
/// The ensemble grows (never shrinks) to hold at least one member per known
/// class.
///
/// ## Example
///
/// ```
/// use linfa_smote_bagging::{GaussianNb, OnlineSmoteBagging, SmoteBaggingParams};
/// use ndarray::array;
///
/// let x = array![[0.0, 1.2], [5.0, 6.1], [0.2, 0.8], [5.2, 5.9]];
/// let y = array![0, 1, 0, 1];
///
/// let params = SmoteBaggingParams::new(GaussianNb::<f64>::new()).n_estimators(3);
/// let mut model = OnlineSmoteBagging::new(params).unwrap();
/// model.partial_fit(&x, &y, Some(&[0, 1]), None).unwrap();
///
/// let proba = model.predict_proba(&x);
/// assert_eq!(proba.nrows(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct OnlineSmoteBagging<F, L, D = Adwin, R = Xoshiro256Plus>
where
    F: Float,
    L: OnlineClassifier<F>,
    D: DriftDetector,
    R: Rng,
{
    params: SmoteBaggingValidParams<L, D, R>,
    /// Freshly reset prototype, cloned for every (new or grown) member
    base_estimator: L,
    members: Vec<EnsembleMember<L, D>>,
    n_estimators: usize,
    classes: Option<Vec<usize>>,
    smote: OnlineSmote<F>,
    rng: R,
}

impl<F, L, D, R> OnlineSmoteBagging<F, L, D, R>
where
    F: Float,
    L: OnlineClassifier<F>,
    D: DriftDetector,
    R: Rng + Clone,
{
    /// Validate the hyperparameters and construct the ensemble.
    ///
    /// Every member starts as an independent clone of the reset prototype
    /// learner paired with a clone of the pristine detector.
    pub fn new(params: SmoteBaggingParams<L, D, R>) -> Result<Self> {
        let params = params.check()?;
        let mut base_estimator = params.base_estimator().clone();
        base_estimator.reset();
        let rng = params.rng().clone();

        let mut model = OnlineSmoteBagging {
            params,
            base_estimator,
            members: Vec::new(),
            n_estimators: 0,
            classes: None,
            smote: OnlineSmote::new(),
            rng,
        };
        model.configure();
        Ok(model)
    }

    fn configure(&mut self) {
        self.n_estimators = self.params.n_estimators();
        self.members = (0..self.n_estimators)
            .map(|_| EnsembleMember {
                learner: self.base_estimator.clone(),
                detector: self.params.detector().clone(),
            })
            .collect();
        self.classes = None;
        self.smote = OnlineSmote::new();
        self.rng = self.params.rng().clone();
    }

    /// Restore the just-constructed state, reusing the original prototype
    /// learner and re-seeding the generator
    pub fn reset(&mut self) {
        self.configure();
    }

    /// Current ensemble size
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// The class set announced by the first training call
    pub fn classes(&self) -> Option<&[usize]> {
        self.classes.as_deref()
    }

    /// Number of positive samples buffered for SMOTE synthesis
    pub fn n_positive_samples(&self) -> usize {
        self.smote.len()
    }

    /// Incorporate a batch of labeled samples, one sample at a time.
    ///
    /// `classes` must announce the full class set on the first call; later
    /// calls may omit it, but when supplied it must match the stored set as
    /// an unordered set. Positive samples (label [`POSITIVE_LABEL`]) are
    /// buffered and oversampled, each member training on
    /// `Poisson(a * sampling_rate)` original repetitions and
    /// `Poisson((1 - a) * sampling_rate)` synthetic repetitions, where
    /// `a = (i + 1) / n_estimators` at position `i`. With drift detection
    /// enabled, each member's detector ingests its correctness on the current
    /// batch; at most one member is replaced per processed sample.
    pub fn partial_fit(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = usize>, Ix1>,
        classes: Option<&[usize]>,
        sample_weight: Option<&Array1<F>>,
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(SmoteBaggingError::MismatchedTargets(x.nrows(), y.len()));
        }
        if let Some(weights) = sample_weight {
            if weights.len() != x.nrows() {
                return Err(SmoteBaggingError::MismatchedWeights(
                    x.nrows(),
                    weights.len(),
                ));
            }
        }

        match (&self.classes, classes) {
            (None, None) => return Err(SmoteBaggingError::MissingClasses),
            (None, Some(classes)) => self.classes = Some(classes.to_vec()),
            (Some(stored), Some(supplied)) => {
                let stored: HashSet<usize> = stored.iter().copied().collect();
                let supplied: HashSet<usize> = supplied.iter().copied().collect();
                if stored != supplied {
                    return Err(SmoteBaggingError::InconsistentClasses);
                }
            }
            (Some(_), None) => {}
        }

        self.adjust_ensemble_size();

        // Members added by growth or reset by replacement must be able to
        // learn the class set mid-stream, so the stored set is forwarded
        // rather than the caller's per-call argument
        let known_classes = self.classes.clone().unwrap();
        let sampling_rate = self.params.sampling_rate() as f64;
        let smote_neighbours = self.params.smote_neighbours();
        let drift_detection = self.params.drift_detection();

        for j in 0..x.nrows() {
            let sample = x.row(j);
            let label = y[j];
            let weight = sample_weight.map(|w| w.slice(s![j..j + 1]));

            let mut change_candidate = false;
            // `lam` is carried across positions; only the positive branch
            // reassigns it
            let mut lam = 1.0;

            if label == POSITIVE_LABEL {
                self.smote.push(sample.to_owned());
            }

            for i in 0..self.n_estimators {
                let a = (i + 1) as f64 / self.n_estimators as f64;
                let single = sample.insert_axis(Axis(0));

                if label == POSITIVE_LABEL {
                    lam = a * sampling_rate;
                    let lam_smote = (1.0 - a) * sampling_rate;

                    let k = poisson_draw(&mut self.rng, lam);
                    for _ in 0..k {
                        self.members[i].learner.partial_fit(
                            single,
                            &[label],
                            Some(known_classes.as_slice()),
                            weight,
                        )?;
                    }

                    let k_smote = poisson_draw(&mut self.rng, lam_smote);
                    for _ in 0..k_smote {
                        let synthetic = self.smote.synthesize(smote_neighbours, &mut self.rng);
                        if let Some(synthetic) = synthetic {
                            self.members[i].learner.partial_fit(
                                synthetic.view().insert_axis(Axis(0)),
                                &[label],
                                Some(known_classes.as_slice()),
                                weight,
                            )?;
                        }
                    }
                } else {
                    let k = poisson_draw(&mut self.rng, lam);
                    for _ in 0..k {
                        self.members[i].learner.partial_fit(
                            single,
                            &[label],
                            Some(known_classes.as_slice()),
                            weight,
                        )?;
                    }
                }

                if drift_detection {
                    let member = &mut self.members[i];
                    let previous = member.detector.estimation();
                    // A learner that cannot predict yet simply skips the
                    // check for this sample
                    if let Ok(predictions) = member.learner.predict(x.view()) {
                        for (prediction, target) in predictions.iter().zip(y.iter()) {
                            if let Some(prediction) = prediction {
                                let correct = if prediction == target { 1.0 } else { 0.0 };
                                member.detector.add_element(correct);
                            }
                        }
                        if member.detector.detected_change()
                            && member.detector.estimation() > previous
                        {
                            change_candidate = true;
                        }
                    }
                }
            }

            if change_candidate && drift_detection {
                self.replace_decayed_member();
            }
        }

        Ok(())
    }

    /// Grow the ensemble until it holds at least one member per known class.
    /// Growth is monotonic; the ensemble never shrinks.
    fn adjust_ensemble_size(&mut self) {
        if let Some(classes) = &self.classes {
            while self.members.len() < classes.len() {
                self.members.push(EnsembleMember {
                    learner: self.base_estimator.clone(),
                    detector: self.params.detector().clone(),
                });
                self.n_estimators += 1;
            }
        }
    }

    /// Reset the single member whose detector reports the globally largest
    /// estimate and hand it a fresh detector. The strict comparison against
    /// zero means no member is replaced while every estimate is still flat.
    fn replace_decayed_member(&mut self) {
        let mut max_estimation = 0.0;
        let mut decayed = None;
        for (i, member) in self.members.iter().enumerate() {
            if member.detector.estimation() > max_estimation {
                max_estimation = member.detector.estimation();
                decayed = Some(i);
            }
        }
        if let Some(i) = decayed {
            self.members[i].learner.reset();
            self.members[i].detector = self.params.detector().clone();
        }
    }

    fn aggregate_proba(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Option<Array2<F>> {
        let classes = self.classes.as_ref()?;
        let max_label = *classes.iter().max()?;
        aggregate(
            self.members
                .iter()
                .map(|member| member.learner.predict_proba(x.view())),
            x.nrows(),
            max_label,
        )
    }

    /// Probability of each sample belonging to each of the known classes,
    /// averaged over all members and normalized per row.
    ///
    /// Degrades to a `samples x 1` zero matrix when any member's output is
    /// incompatible with the ensemble (more classes than known, wrong shape,
    /// untrained member).
    pub fn predict_proba(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        self.aggregate_proba(x)
            .unwrap_or_else(|| Array2::zeros((x.nrows(), 1)))
    }

    /// Most likely class label per sample, or `None` when aggregation failed
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Option<Array1<usize>> {
        let proba = self.aggregate_proba(x)?;
        Some(
            proba
                .outer_iter()
                .map(|row| row.argmax().unwrap_or(0))
                .collect(),
        )
    }

    /// Not applicable: a streaming model is trained with
    /// [`partial_fit`](OnlineSmoteBagging::partial_fit)
    pub fn fit(
        &mut self,
        _x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        _y: &ArrayBase<impl Data<Elem = usize>, Ix1>,
    ) -> Result<()> {
        Err(SmoteBaggingError::NotApplicable("fit"))
    }

    /// Not applicable in a streaming context
    pub fn score(
        &self,
        _x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        _y: &ArrayBase<impl Data<Elem = usize>, Ix1>,
    ) -> Result<F> {
        Err(SmoteBaggingError::NotApplicable("score"))
    }
}

impl<F, L, D, R, DA> PredictInplace<ArrayBase<DA, Ix2>, Array1<usize>>
    for OnlineSmoteBagging<F, L, D, R>
where
    F: Float,
    L: OnlineClassifier<F>,
    D: DriftDetector,
    R: Rng + Clone,
    DA: Data<Elem = F>,
{
    /// Fills `y` with the most likely class label per sample; rows for which
    /// aggregation failed receive label 0, the argmax of the zero matrix
    fn predict_inplace(&self, x: &ArrayBase<DA, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let predictions = self
            .predict(x)
            .unwrap_or_else(|| Array1::zeros(x.nrows()));
        y.assign(&predictions);
    }

    fn default_target(&self, x: &ArrayBase<DA, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

fn poisson_draw<R: Rng>(rng: &mut R, lam: f64) -> usize {
    if lam <= 0.0 {
        return 0;
    }
    match Poisson::new(lam) {
        Ok(poisson) => poisson.sample(rng) as usize,
        Err(_) => 0,
    }
}
