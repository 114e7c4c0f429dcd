use crate::adwin::Adwin;
use crate::error::SmoteBaggingError;
use linfa::ParamGuard;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

/// A verified hyper-parameter set ready for the construction of an
/// [`OnlineSmoteBagging`](crate::OnlineSmoteBagging) ensemble.
///
/// See [`SmoteBaggingParams`](crate::SmoteBaggingParams) for more information.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoteBaggingValidParams<L, D, R> {
    /// Prototype learner; every ensemble member is a clone of its reset state
    base_estimator: L,
    /// Initial ensemble size
    n_estimators: usize,
    /// Sampling rate of the positive instances
    sampling_rate: usize,
    /// Whether drift detectors track the members and drive replacement
    drift_detection: bool,
    /// Neighbour pool size of the SMOTE synthesis step
    smote_neighbours: usize,
    /// Prototype drift detector, cloned for every member
    detector: D,
    /// The random number generator
    rng: R,
}

/// An helper struct used to construct a set of [valid
/// hyperparameters](SmoteBaggingValidParams) for the online SMOTEBagging
/// ensemble (using the builder pattern).
#[derive(Clone, Debug, PartialEq)]
pub struct SmoteBaggingParams<L, D, R>(pub(crate) SmoteBaggingValidParams<L, D, R>);

impl<L> SmoteBaggingParams<L, Adwin, Xoshiro256Plus> {
    /// Configure an ensemble around a prototype `base_estimator`, with an
    /// [`Adwin`] detector prototype and a deterministically seeded generator.
    ///
    /// Defaults are provided if the optional parameters are not specified:
    /// * `n_estimators = 10`
    /// * `sampling_rate = 1`
    /// * `drift_detection = true`
    /// * `smote_neighbours = 5`
    pub fn new(base_estimator: L) -> Self {
        Self::new_with_rng(base_estimator, Xoshiro256Plus::seed_from_u64(42))
    }
}

impl<L, R> SmoteBaggingParams<L, Adwin, R> {
    /// Configure an ensemble around a prototype `base_estimator` with a
    /// pre-defined random number generator
    pub fn new_with_rng(base_estimator: L, rng: R) -> Self {
        SmoteBaggingParams(SmoteBaggingValidParams {
            base_estimator,
            n_estimators: 10,
            sampling_rate: 1,
            drift_detection: true,
            smote_neighbours: 5,
            detector: Adwin::default(),
            rng,
        })
    }
}

impl<L, D, R> SmoteBaggingParams<L, D, R> {
    /// Change the initial ensemble size.
    ///
    /// The ensemble still grows beyond this whenever more classes than
    /// members are announced.
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.0.n_estimators = n_estimators;
        self
    }

    /// Change the sampling rate of the positive instances
    pub fn sampling_rate(mut self, sampling_rate: usize) -> Self {
        self.0.sampling_rate = sampling_rate;
        self
    }

    /// Enable or disable drift-driven member replacement
    pub fn drift_detection(mut self, drift_detection: bool) -> Self {
        self.0.drift_detection = drift_detection;
        self
    }

    /// Change the neighbour pool size of the SMOTE synthesis step
    pub fn smote_neighbours(mut self, smote_neighbours: usize) -> Self {
        self.0.smote_neighbours = smote_neighbours;
        self
    }

    /// Change the drift detector prototype
    pub fn detector<D2>(self, detector: D2) -> SmoteBaggingParams<L, D2, R> {
        SmoteBaggingParams(SmoteBaggingValidParams {
            base_estimator: self.0.base_estimator,
            n_estimators: self.0.n_estimators,
            sampling_rate: self.0.sampling_rate,
            drift_detection: self.0.drift_detection,
            smote_neighbours: self.0.smote_neighbours,
            detector,
            rng: self.0.rng,
        })
    }

    /// Change the random number generator
    pub fn rng<R2>(self, rng: R2) -> SmoteBaggingParams<L, D, R2> {
        SmoteBaggingParams(SmoteBaggingValidParams {
            base_estimator: self.0.base_estimator,
            n_estimators: self.0.n_estimators,
            sampling_rate: self.0.sampling_rate,
            drift_detection: self.0.drift_detection,
            smote_neighbours: self.0.smote_neighbours,
            detector: self.0.detector,
            rng,
        })
    }
}

impl<L, D, R> ParamGuard for SmoteBaggingParams<L, D, R> {
    type Checked = SmoteBaggingValidParams<L, D, R>;
    type Error = SmoteBaggingError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_estimators == 0 {
            Err(SmoteBaggingError::NEstimators)
        } else if self.0.sampling_rate == 0 {
            Err(SmoteBaggingError::SamplingRate)
        } else if self.0.smote_neighbours == 0 {
            Err(SmoteBaggingError::SmoteNeighbours)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<L, D, R> SmoteBaggingValidParams<L, D, R> {
    /// The prototype learner every member is cloned from
    pub fn base_estimator(&self) -> &L {
        &self.base_estimator
    }

    /// The initial ensemble size
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// The sampling rate of the positive instances
    pub fn sampling_rate(&self) -> usize {
        self.sampling_rate
    }

    /// Whether drift detectors track the members and drive replacement
    pub fn drift_detection(&self) -> bool {
        self.drift_detection
    }

    /// The neighbour pool size of the SMOTE synthesis step
    pub fn smote_neighbours(&self) -> usize {
        self.smote_neighbours
    }

    /// The prototype drift detector
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Returns the random generator
    pub fn rng(&self) -> &R {
        &self.rng
    }
}
