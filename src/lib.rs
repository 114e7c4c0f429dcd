//! # Online SMOTEBagging
//!
//! ## The Big Picture
//!
//! `linfa-smote-bagging` is a crate in the [`linfa`](https://crates.io/crates/linfa)
//! ecosystem, an effort to create a toolkit for classical Machine Learning
//! implemented in pure Rust, akin to Python's `scikit-learn`.
//!
//! ## Current state
//!
//! `linfa-smote-bagging` provides a pure Rust implementation of the Online
//! SMOTEBagging ensemble classifier for streaming, class-imbalanced data
//! (Wang and Pineau, "Online Bagging and Boosting for Imbalanced Data
//! Streams", IEEE TKDE 2016), improved by an adaptive-windowing change
//! detector per ensemble member.
//!
//! The negative class is resampled online at full rate while positive
//! (minority) examples are both resampled and synthesized with a streaming
//! variant of SMOTE, at a mix that varies linearly across ensemble positions.
//! Each member's correctness is tracked by a drift detector; a member whose
//! error statistics decay is reset in place.
//!
//! Any incrementally trainable classifier implementing
//! [`OnlineClassifier`] can serve as the base learner; the crate ships an
//! incremental Gaussian naive Bayes ([`GaussianNb`]) and an adaptive
//! windowing detector ([`Adwin`]) as ready-made collaborators.
//!
//! ## Examples
//!
//! ```
//! use linfa_smote_bagging::{GaussianNb, OnlineSmoteBagging, SmoteBaggingParams};
//! use ndarray::array;
//!
//! // a small imbalanced stream: class 1 is the minority
//! let x = array![
//!     [0.2, 0.3],
//!     [0.1, 0.4],
//!     [3.1, 3.3],
//!     [0.3, 0.2],
//!     [0.2, 0.1],
//!     [3.0, 3.2]
//! ];
//! let y = array![0, 0, 1, 0, 0, 1];
//!
//! let params = SmoteBaggingParams::new(GaussianNb::<f64>::new())
//!     .n_estimators(3)
//!     .sampling_rate(2);
//! let mut model = OnlineSmoteBagging::new(params).unwrap();
//!
//! model.partial_fit(&x, &y, Some(&[0, 1]), None).unwrap();
//!
//! // every positive sample was buffered for SMOTE synthesis
//! assert_eq!(model.n_positive_samples(), 2);
//! let proba = model.predict_proba(&x);
//! assert_eq!(proba.nrows(), 6);
//! ```

mod adwin;
mod aggregate;
mod algorithm;
mod error;
mod hyperparams;
mod naive_bayes;
mod smote;
mod traits;

pub use adwin::Adwin;
pub use algorithm::{OnlineSmoteBagging, POSITIVE_LABEL};
pub use error::{Result, SmoteBaggingError};
pub use hyperparams::{SmoteBaggingParams, SmoteBaggingValidParams};
pub use naive_bayes::GaussianNb;
pub use smote::OnlineSmote;
pub use traits::{DriftDetector, OnlineClassifier};
