pub mod attribute_class_observers;
mod base_learner;
pub mod bayes;
pub mod classifier;
mod majority_class;

pub use base_learner::BaseLearner;
pub use bayes::NaiveBayes;
pub use classifier::Classifier;
pub use majority_class::MajorityClass;
