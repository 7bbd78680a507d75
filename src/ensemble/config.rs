use crate::ensemble::ConfigError;
use anyhow::Context;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{
    Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr,
};

fn default_ensemble_size() -> usize {
    10
}
fn default_weight_shrink() -> f64 {
    6.0
}
fn default_drift_confidence() -> f64 {
    0.002
}
fn default_cores() -> i32 {
    1
}
fn default_detect_drift() -> bool {
    true
}

/// Empty parameter object for learners without options.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(LearnerKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum LearnerChoice {
    #[strum_discriminants(strum(
        message = "Naive Bayes Classifier",
        detailed_message = "Gaussian naive Bayes over numeric features."
    ))]
    NaiveBayes(NoParams),
    #[strum_discriminants(strum(
        message = "Majority Class",
        detailed_message = "Predicts the weighted class distribution seen so far."
    ))]
    MajorityClass(NoParams),
}

impl Default for LearnerChoice {
    fn default() -> Self {
        Self::NaiveBayes(NoParams::default())
    }
}

/// How each member's resample weight is drawn for an incoming example.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
    EnumMessage,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WeightingStrategy {
    #[default]
    #[strum(message = "Poisson(weight shrink) resampling")]
    PoissonBootstrap,
    #[strum(message = "1 if misclassified, otherwise 1 with probability error/(1-error)")]
    MarginError,
    #[strum(message = "Fair coin over {0, 1}")]
    Half,
    #[strum(message = "1 + Poisson(1), no example is left out")]
    WithoutReplacement,
    #[strum(message = "1 if Poisson(1) > 0, else 0")]
    Subagging,
}

/// Execution strategy for member training tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Members trained one after another on the calling thread.
    Sequential,
    /// Fan-out over rayon's global pool.
    Unbounded,
    /// Fan-out over a dedicated pool with this many threads.
    Bounded(usize),
}

impl TryFrom<i32> for Parallelism {
    type Error = ConfigError;

    fn try_from(cores: i32) -> Result<Self, Self::Error> {
        match cores {
            -1 => Ok(Parallelism::Bounded(
                std::thread::available_parallelism().map_or(1, |n| n.get()),
            )),
            0 => Ok(Parallelism::Unbounded),
            1 => Ok(Parallelism::Sequential),
            n if n > 1 => Ok(Parallelism::Bounded(n as usize)),
            n => Err(ConfigError::InvalidCores(n)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnsembleConfig {
    #[serde(default = "default_ensemble_size")]
    #[schemars(
        title = "Ensemble size",
        description = "Number of members in the bag.",
        range(min = 1),
        default = "default_ensemble_size"
    )]
    pub ensemble_size: usize,

    #[serde(default = "default_weight_shrink")]
    #[schemars(
        title = "Weight shrink",
        description = "Poisson rate used by the Poisson-bootstrap strategy.",
        default = "default_weight_shrink"
    )]
    pub weight_shrink: f64,

    #[serde(default = "default_drift_confidence")]
    #[schemars(
        title = "Drift confidence",
        description = "ADWIN confidence delta, in (0, 1).",
        default = "default_drift_confidence"
    )]
    pub drift_confidence: f64,

    #[serde(default)]
    #[schemars(
        title = "Output codes",
        description = "Train members on random binary output codes."
    )]
    pub output_codes: bool,

    #[serde(default)]
    #[schemars(title = "Weighting", description = "Resample weight strategy.")]
    pub weighting: WeightingStrategy,

    #[serde(default = "default_cores")]
    #[schemars(
        title = "Cores",
        description = "-1 = all hardware threads, 0 = unbounded fan-out, 1 = sequential, N > 1 = pool of N.",
        default = "default_cores"
    )]
    pub cores: i32,

    #[serde(default = "default_detect_drift")]
    #[schemars(
        title = "Detect drift",
        description = "Replace the worst member when a change is detected.",
        default = "default_detect_drift"
    )]
    pub detect_drift: bool,

    #[serde(default)]
    #[schemars(title = "Base learner")]
    pub learner: LearnerChoice,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            ensemble_size: default_ensemble_size(),
            weight_shrink: default_weight_shrink(),
            drift_confidence: default_drift_confidence(),
            output_codes: false,
            weighting: WeightingStrategy::default(),
            cores: default_cores(),
            detect_drift: default_detect_drift(),
            learner: LearnerChoice::default(),
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ensemble_size == 0 {
            return Err(ConfigError::EmptyEnsemble);
        }
        if !self.weight_shrink.is_finite() || self.weight_shrink <= 0.0 {
            return Err(ConfigError::InvalidWeightShrink(self.weight_shrink));
        }
        if !(self.drift_confidence > 0.0 && self.drift_confidence < 1.0) {
            return Err(ConfigError::InvalidConfidence(self.drift_confidence));
        }
        self.parallelism()?;
        Ok(())
    }

    pub fn parallelism(&self) -> Result<Parallelism, ConfigError> {
        Parallelism::try_from(self.cores)
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("malformed ensemble config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading ensemble config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn json_schema() -> Schema {
        schema_for!(EnsembleConfig)
    }
}
