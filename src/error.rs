use thiserror::Error;

/// Simplified `Result` using [`SmoteBaggingError`](crate::SmoteBaggingError) as error type
pub type Result<T> = std::result::Result<T, SmoteBaggingError>;

#[derive(Error, Debug)]
pub enum SmoteBaggingError {
    #[error("number of estimators must be positive")]
    NEstimators,
    #[error("sampling rate must be positive")]
    SamplingRate,
    #[error("number of SMOTE neighbours must be positive")]
    SmoteNeighbours,
    #[error("the first partial_fit call must pass the set of all classes")]
    MissingClasses,
    #[error("the classes passed to partial_fit differ from those passed earlier")]
    InconsistentClasses,
    #[error("records have {0} rows but targets have {1} entries")]
    MismatchedTargets(usize, usize),
    #[error("records have {0} rows but sample weights have {1} entries")]
    MismatchedWeights(usize, usize),
    #[error("records have {0} features but the model was trained with {1}")]
    MismatchedFeatures(usize, usize),
    #[error("target label {0} does not exist in the initial classes")]
    UnknownLabel(usize),
    #[error("attempt to use an untrained model")]
    UntrainedModel,
    #[error("{0} is not applicable to a streaming model")]
    NotApplicable(&'static str),
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
