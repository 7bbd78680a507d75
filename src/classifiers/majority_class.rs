use crate::classifiers::Classifier;
use crate::core::{Example, WeightedExample};

/// Votes with the weighted class distribution seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MajorityClass {
    observed_class_distribution: Vec<f64>,
}

impl MajorityClass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed_class_distribution(&self) -> &[f64] {
        &self.observed_class_distribution
    }
}

impl Classifier for MajorityClass {
    fn get_votes_for_instance(&self, _example: &Example) -> Vec<f64> {
        self.observed_class_distribution.clone()
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        if example.weight() <= 0.0 {
            return;
        }
        let idx = example.class_value();
        if idx >= self.observed_class_distribution.len() {
            self.observed_class_distribution.resize(idx + 1, 0.0);
        }
        self.observed_class_distribution[idx] += example.weight();
    }

    fn reset_learning(&mut self) {
        self.observed_class_distribution.clear();
    }
}
