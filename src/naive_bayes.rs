//! Incremental Gaussian naive Bayes, the crate's reference base learner.
//!
//! The likelihood of each feature is assumed Gaussian; mean and variance are
//! pooled online across batches, so the learner fits the one-sample-at-a-time
//! regime of the ensemble.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_stats::QuantileExt;

use crate::error::{Result, SmoteBaggingError};
use crate::traits::OnlineClassifier;
use linfa::Float;

/// Incremental Gaussian naive Bayes classifier.
///
/// All state lives in `Option` fields; the unfitted model carries none. The
/// class set is fixed by the first training call and every subsequent batch
/// updates the per-class running mean and variance.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNb<F> {
    classes: Option<Vec<usize>>,
    class_count: Option<Array1<usize>>,
    priors: Option<Array1<F>>,
    theta: Option<Array2<F>>,
    sigma: Option<Array2<F>>,
    var_smoothing: f64,
}

impl<F> GaussianNb<F> {
    /// Create an unfitted model with default variance smoothing
    pub fn new() -> Self {
        GaussianNb {
            classes: None,
            class_count: None,
            priors: None,
            theta: None,
            sigma: None,
            var_smoothing: 1e-9,
        }
    }

    /// Portion added to every variance at likelihood time, guarding against
    /// zero variances early in the stream
    pub fn var_smoothing(mut self, var_smoothing: f64) -> Self {
        self.var_smoothing = var_smoothing;
        self
    }
}

impl<F> Default for GaussianNb<F> {
    fn default() -> Self {
        GaussianNb::new()
    }
}

impl<F: Float> GaussianNb<F> {
    fn fit_batch(&mut self, x: ArrayView2<F>, y: &[usize], classes: Option<&[usize]>) -> Result<()> {
        // The `If` branch signifies the learner is being trained for the
        // first time
        if self.classes.is_none() {
            let classes = classes.ok_or(SmoteBaggingError::MissingClasses)?;
            let nclasses = classes.len();
            let nfeatures = x.ncols();

            self.classes = Some(classes.to_vec());
            self.theta = Some(Array2::zeros((nclasses, nfeatures)));
            self.sigma = Some(Array2::zeros((nclasses, nfeatures)));
            self.class_count = Some(Array1::zeros(nclasses));
            self.priors = Some(Array1::zeros(nclasses));
        } else if x.ncols() != self.theta.as_ref().unwrap().ncols() {
            return Err(SmoteBaggingError::MismatchedFeatures(
                x.ncols(),
                self.theta.as_ref().unwrap().ncols(),
            ));
        }

        let classes = self.classes.as_ref().unwrap().clone();

        let mut yunique = y.to_vec();
        yunique.sort_unstable();
        yunique.dedup();

        // No new labels may appear after the class set is fixed
        for label in &yunique {
            if !classes.contains(label) {
                return Err(SmoteBaggingError::UnknownLabel(*label));
            }
        }

        for &label in &yunique {
            // unwrap is safe, membership was checked above
            let position = classes.iter().position(|&class| class == label).unwrap();

            // We filter x for records that correspond to the current class
            let xclass = Self::filter(&x, y, label);
            let nclass = xclass.nrows();

            // We compute the update of the gaussian mean and variance
            let (theta_new, sigma_new) = Self::update_mean_variance(
                self.class_count.as_ref().unwrap()[position],
                &self.theta.as_ref().unwrap().slice(s![position, ..]),
                &self.sigma.as_ref().unwrap().slice(s![position, ..]),
                &xclass,
            );

            self.theta
                .as_mut()
                .unwrap()
                .row_mut(position)
                .assign(&theta_new);
            self.sigma
                .as_mut()
                .unwrap()
                .row_mut(position)
                .assign(&sigma_new);
            self.class_count.as_mut().unwrap()[position] += nclass;
        }

        // Priors track the running class frequencies
        let class_count = self.class_count.as_ref().unwrap();
        let total = class_count.sum();
        self.priors = Some(class_count.mapv(|count| F::cast(count) / F::cast(total)));

        Ok(())
    }

    // Compute online update of gaussian mean and variance
    fn update_mean_variance(
        count_old: usize,
        mu_old: &ArrayView1<F>,
        var_old: &ArrayView1<F>,
        x_new: &Array2<F>,
    ) -> (Array1<F>, Array1<F>) {
        // If incoming data is empty no updates required
        if x_new.nrows() == 0 {
            return (mu_old.to_owned(), var_old.to_owned());
        }

        let count_new = x_new.nrows();
        // unwrap is safe because new observations are non-empty
        let mu_new = x_new.mean_axis(Axis(0)).unwrap();
        let var_new = x_new.var_axis(Axis(0), F::zero());

        // If previous batch was empty, we send the new mean and variance calculated
        if count_old == 0 {
            return (mu_new, var_new);
        }

        let count_total = count_old + count_new;

        // Combine old and new mean, taking into consideration the number
        // of observations
        let mu_new_weighted = &mu_new * F::cast(count_new);
        let mu_old_weighted = mu_old * F::cast(count_old);
        let mu_weighted = (mu_new_weighted + mu_old_weighted).mapv(|x| x / F::cast(count_total));

        // Combine old and new variance by combining the sums of squared
        // differences
        let ssd_old = var_old * F::cast(count_old);
        let ssd_new = var_new * F::cast(count_new);
        let weight = F::cast(count_new * count_old) / F::cast(count_total);
        let ssd_weighted = ssd_old + ssd_new + (mu_old - &mu_new).mapv(|x| weight * x.powi(2));
        let var_weighted = ssd_weighted.mapv(|x| x / F::cast(count_total));

        (mu_weighted, var_weighted)
    }

    // Returns the subset of x whose rows carry the requested label
    fn filter(x: &ArrayView2<F>, y: &[usize], label: usize) -> Array2<F> {
        let index = y
            .iter()
            .enumerate()
            .filter_map(|(i, y)| if label == *y { Some(i) } else { None })
            .collect::<Vec<_>>();

        let mut xsubset = Array2::zeros((index.len(), x.ncols()));
        index
            .iter()
            .enumerate()
            .for_each(|(i, &r)| xsubset.row_mut(i).assign(&x.slice(s![r, ..])));

        xsubset
    }

    // Compute unnormalized posterior log probability, one column per known
    // class in declaration order
    fn joint_log_likelihood(&self, x: ArrayView2<F>) -> Array2<F> {
        let classes = self.classes.as_ref().unwrap();
        let eps = F::cast(self.var_smoothing);
        let mut joint_log_likelihood = Array2::zeros((x.nrows(), classes.len()));

        for i in 0..classes.len() {
            let jointi = self.priors.as_ref().unwrap()[i].ln();
            let theta = self.theta.as_ref().unwrap().row(i);
            let sigma = self.sigma.as_ref().unwrap().row(i).mapv(|v| v + eps);

            let mut nij = sigma
                .mapv(|v| (F::cast(2. * std::f64::consts::PI) * v).ln())
                .sum();
            nij = F::cast(-0.5) * nij;

            let nij = ((x.to_owned() - &theta).mapv(|v| v.powi(2)) / &sigma)
                .sum_axis(Axis(1))
                .mapv(|v| v * F::cast(0.5))
                .mapv(|v| nij - v);

            joint_log_likelihood.column_mut(i).assign(&(nij + jointi));
        }

        joint_log_likelihood
    }
}

impl<F: Float> OnlineClassifier<F> for GaussianNb<F> {
    fn reset(&mut self) {
        self.classes = None;
        self.class_count = None;
        self.priors = None;
        self.theta = None;
        self.sigma = None;
    }

    /// Sample weights are accepted for contract compatibility but not used by
    /// this learner.
    fn partial_fit(
        &mut self,
        x: ArrayView2<F>,
        y: &[usize],
        classes: Option<&[usize]>,
        _sample_weight: Option<ArrayView1<F>>,
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(SmoteBaggingError::MismatchedTargets(x.nrows(), y.len()));
        }
        self.fit_batch(x, y, classes)
    }

    fn predict(&self, x: ArrayView2<F>) -> Result<Vec<Option<usize>>> {
        let classes = self
            .classes
            .as_ref()
            .ok_or(SmoteBaggingError::UntrainedModel)?;
        if x.ncols() != self.theta.as_ref().unwrap().ncols() {
            return Err(SmoteBaggingError::MismatchedFeatures(
                x.ncols(),
                self.theta.as_ref().unwrap().ncols(),
            ));
        }

        let joint_log_likelihood = self.joint_log_likelihood(x);
        Ok(joint_log_likelihood
            .outer_iter()
            .map(|row| row.argmax().ok().map(|i| classes[i]))
            .collect())
    }

    fn predict_proba(&self, x: ArrayView2<F>) -> Result<Array2<F>> {
        let classes = self
            .classes
            .as_ref()
            .ok_or(SmoteBaggingError::UntrainedModel)?;
        if x.ncols() != self.theta.as_ref().unwrap().ncols() {
            return Err(SmoteBaggingError::MismatchedFeatures(
                x.ncols(),
                self.theta.as_ref().unwrap().ncols(),
            ));
        }

        // Columns are indexed by class label, so labels the learner never saw
        // keep probability zero
        let max_label = classes.iter().max().copied().unwrap_or(0);
        let joint_log_likelihood = self.joint_log_likelihood(x);
        let mut proba = Array2::zeros((x.nrows(), max_label + 1));

        for (n, row) in joint_log_likelihood.outer_iter().enumerate() {
            let max = row.fold(F::neg_infinity(), |m, &v| if v > m { v } else { m });
            if !max.is_finite() {
                continue;
            }
            let exps = row.mapv(|v| (v - max).exp());
            let total = exps.sum();
            for (i, &e) in exps.iter().enumerate() {
                proba[(n, classes[i])] = e / total;
            }
        }

        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn incremental_fit_matches_reference_statistics() {
        let x = array![
            [-2., -1.],
            [-1., -1.],
            [-1., -2.],
            [1., 1.],
            [1., 2.],
            [2., 1.]
        ];
        let y = vec![1, 1, 1, 2, 2, 2];
        let classes = vec![1, 2];

        let mut model = GaussianNb::<f64>::new();
        for (xchunk, ychunk) in x.axis_chunks_iter(Axis(0), 2).zip(y.chunks(2)) {
            model
                .partial_fit(xchunk, ychunk, Some(&classes), None)
                .unwrap();
        }

        let pred = model.predict(x.view()).unwrap();
        assert_eq!(pred, y.iter().map(|&label| Some(label)).collect::<Vec<_>>());

        let jll = model.joint_log_likelihood(x.view());
        let expected = array![
            [-2.276946847943017, -38.27694652394301],
            [-1.5269468546930165, -25.52694663869301],
            [-2.276946847943017, -38.27694652394301],
            [-25.52694663869301, -1.5269468546930165],
            [-38.27694652394301, -2.276946847943017],
            [-38.27694652394301, -2.276946847943017]
        ];
        assert_abs_diff_eq!(jll, expected, epsilon = 1e-5);
    }

    #[test]
    fn running_priors_follow_class_frequencies() {
        let x = array![[-2., -1.], [-1., -1.], [-1., -2.], [1., 1.]];
        let y = vec![1, 1, 1, 2];

        let mut model = GaussianNb::<f64>::new();
        model
            .partial_fit(x.view(), &y, Some(&[1, 2]), None)
            .unwrap();

        assert_abs_diff_eq!(model.priors.unwrap(), array![0.75, 0.25]);
    }

    #[test]
    fn probabilities_are_label_indexed_and_normalized() {
        let x = array![[-2., -1.], [-1., -1.], [1., 1.], [2., 1.]];
        let y = vec![1, 1, 2, 2];

        let mut model = GaussianNb::<f64>::new();
        model
            .partial_fit(x.view(), &y, Some(&[1, 2]), None)
            .unwrap();

        let proba = model.predict_proba(x.view()).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.outer_iter() {
            // label 0 was never announced
            assert_abs_diff_eq!(row[0], 0.0);
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn first_call_requires_classes() {
        let x = array![[0.0, 1.0]];
        let mut model = GaussianNb::<f64>::new();
        let res = model.partial_fit(x.view(), &[1], None, None);
        assert!(matches!(res, Err(SmoteBaggingError::MissingClasses)));
    }

    #[test]
    fn labels_outside_the_class_set_are_rejected() {
        let x = array![[0.0, 1.0]];
        let mut model = GaussianNb::<f64>::new();
        let res = model.partial_fit(x.view(), &[7], Some(&[0, 1]), None);
        assert!(matches!(res, Err(SmoteBaggingError::UnknownLabel(7))));
    }

    #[test]
    fn untrained_model_cannot_predict() {
        let model = GaussianNb::<f64>::new();
        let res = model.predict(array![[0.0]].view());
        assert!(matches!(res, Err(SmoteBaggingError::UntrainedModel)));
    }

    #[test]
    fn reset_restores_unfitted_state() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let mut model = GaussianNb::<f64>::new();
        model
            .partial_fit(x.view(), &[0, 1], Some(&[0, 1]), None)
            .unwrap();

        model.reset();
        assert_eq!(model, GaussianNb::new());
    }
}
