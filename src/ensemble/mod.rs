mod bank;
mod batch;
mod config;
mod error;
mod executor;
mod leveraging_bag;
mod member;
mod output_codes;
pub mod voting;
mod weighting;

pub use bank::DriftMonitorBank;
pub use batch::{BatchController, WeightBatch};
pub use config::{
    EnsembleConfig, LearnerChoice, LearnerKind, NoParams, Parallelism, WeightingStrategy,
};
pub use error::{ConfigError, EnsembleError};
pub use leveraging_bag::{LeveragingBag, RoundReport};
pub use member::Member;
pub use output_codes::OutputCodeMatrix;
pub use weighting::WeightSampler;
