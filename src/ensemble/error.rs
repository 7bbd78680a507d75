use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("ensemble size must be positive")]
    EmptyEnsemble,

    #[error("weight shrink must be finite and positive, got {0}")]
    InvalidWeightShrink(f64),

    #[error("drift confidence must lie in (0, 1), got {0}")]
    InvalidConfidence(f64),

    #[error("invalid degree of parallelism {0}: expected -1, 0, 1 or a pool size above 1")]
    InvalidCores(i32),
}

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("training failed on member {member} ({failed} member task(s) failed): {message}")]
    MemberTask {
        member: usize,
        failed: usize,
        message: String,
    },

    #[error("expected {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    #[error("weight for member {member} must be finite and non-negative, got {weight}")]
    NegativeWeight { member: usize, weight: f64 },

    #[error(
        "output codes cannot balance {num_classes} classes over an even ensemble of {ensemble_size}"
    )]
    UnbalancedOutputCodes {
        num_classes: usize,
        ensemble_size: usize,
    },

    #[error("class index {class} out of range for {num_classes} classes")]
    ClassOutOfRange { class: usize, num_classes: usize },
}
