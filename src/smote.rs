//! Streaming SMOTE synthesis over a rolling buffer of minority samples.

use std::cmp::Ordering;

use linfa::Float;
use linfa_nn::distance::{Distance, L2Dist};
use ndarray::Array1;
use rand::Rng;

/// Append-only buffer of positive-class samples with streaming SMOTE
/// synthesis.
///
/// Synthesis always works relative to the most recently appended sample: a
/// neighbour is drawn uniformly from its `k` nearest buffered samples and the
/// synthetic sample extrapolates from the neighbour towards (and past) the
/// newest sample. The buffer is never evicted.
#[derive(Debug, Clone)]
pub struct OnlineSmote<F: Float, DM: Distance<F> = L2Dist> {
    samples: Vec<Array1<F>>,
    dist_fn: DM,
}

impl<F: Float> OnlineSmote<F> {
    /// Create an empty buffer using Euclidean distance for neighbour ranking
    pub fn new() -> Self {
        OnlineSmote::with_dist_fn(L2Dist)
    }
}

impl<F: Float> Default for OnlineSmote<F> {
    fn default() -> Self {
        OnlineSmote::new()
    }
}

impl<F: Float, DM: Distance<F>> OnlineSmote<F, DM> {
    /// Create an empty buffer with a custom distance metric
    pub fn with_dist_fn(dist_fn: DM) -> Self {
        OnlineSmote {
            samples: Vec::new(),
            dist_fn,
        }
    }

    /// Append one positive sample
    pub fn push(&mut self, sample: Array1<F>) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Synthesize one sample around the most recently buffered entry.
    ///
    /// With fewer than two buffered entries no interpolation is possible and
    /// the newest entry is returned unchanged. Otherwise a neighbour rank is
    /// drawn uniformly from `[0, k)` (`k` clamped to the neighbour count,
    /// with a floor of one), a blending factor `gamma` uniformly from
    /// `[0, 1)`, and the result is `x + gamma * (x - neighbour)`.
    ///
    /// Returns `None` on an empty buffer.
    pub fn synthesize<R: Rng>(&self, k: usize, rng: &mut R) -> Option<Array1<F>> {
        let x = self.samples.last()?;
        if self.samples.len() < 2 {
            return Some(x.clone());
        }

        let others = &self.samples[..self.samples.len() - 1];
        let mut neighbours: Vec<(usize, F)> = others
            .iter()
            .enumerate()
            .map(|(i, other)| (i, self.dist_fn.distance(x.view(), other.view())))
            .collect();
        neighbours.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Greater));

        let k = k.min(neighbours.len()).max(1);
        let rank = rng.gen_range(0..k);
        let gamma = F::cast(rng.gen::<f64>());

        let neighbour = &others[neighbours[rank].0];
        let step = (x - neighbour).mapv(|v| v * gamma);
        Some(x + &step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn singleton_buffer_is_returned_unchanged() {
        let mut smote = OnlineSmote::<f64>::new();
        smote.push(array![2.0, -1.0]);

        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        for k in &[0, 1, 5, 100] {
            let sample = smote.synthesize(*k, &mut rng).unwrap();
            assert_abs_diff_eq!(sample, array![2.0, -1.0]);
        }
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let smote = OnlineSmote::<f64>::new();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        assert!(smote.synthesize(5, &mut rng).is_none());
    }

    #[test]
    fn zero_gamma_returns_newest_sample() {
        let mut smote = OnlineSmote::<f64>::new();
        smote.push(array![0.0, 0.0]);
        smote.push(array![3.0, 4.0]);

        // StepRng yields constant zeros, so gamma lands on the boundary of
        // the blending interval
        let mut rng = StepRng::new(0, 0);
        let sample = smote.synthesize(5, &mut rng).unwrap();
        assert_abs_diff_eq!(sample, array![3.0, 4.0]);
    }

    #[test]
    fn synthesis_extrapolates_away_from_the_neighbour() {
        let mut smote = OnlineSmote::<f64>::new();
        smote.push(array![0.0, 0.0]);
        smote.push(array![10.0, 10.0]);
        smote.push(array![1.0, 1.0]);

        // k = 1 pins the neighbour to the nearest entry, the origin
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        for _ in 0..20 {
            let sample = smote.synthesize(1, &mut rng).unwrap();
            // x + gamma * (x - neighbour) with x = (1, 1), neighbour = (0, 0)
            let gamma = sample[0] - 1.0;
            assert_abs_diff_eq!(sample[1] - 1.0, gamma, epsilon = 1e-12);
            assert!((0.0..1.0).contains(&gamma));
        }
    }

    #[test]
    fn neighbour_rank_is_clamped_to_buffer_size() {
        let mut smote = OnlineSmote::<f64>::new();
        smote.push(array![0.0]);
        smote.push(array![1.0]);

        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        // only one neighbour exists, so any k is valid
        let sample = smote.synthesize(50, &mut rng).unwrap();
        assert!(sample[0] >= 1.0 && sample[0] < 2.0);
    }
}
