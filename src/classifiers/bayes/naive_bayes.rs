use crate::classifiers::Classifier;
use crate::classifiers::attribute_class_observers::{
    AttributeClassObserver, GaussianNumericAttributeClassObserver,
};
use crate::core::{Example, WeightedExample};

/// Gaussian naive Bayes over numeric features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NaiveBayes {
    observed_class_distribution: Vec<f64>,
    attribute_observers: Vec<GaussianNumericAttributeClassObserver>,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed_class_distribution(&self) -> &[f64] {
        &self.observed_class_distribution
    }

    pub fn do_naive_bayes_prediction<O: AttributeClassObserver>(
        features: &[f64],
        observed_class_distribution: &[f64],
        attribute_observers: &[O],
    ) -> Vec<f64> {
        let total: f64 = observed_class_distribution.iter().sum();
        let mut votes = vec![0.0; observed_class_distribution.len()];
        if total <= 0.0 {
            return votes;
        }
        for (class_index, vote) in votes.iter_mut().enumerate() {
            *vote = observed_class_distribution[class_index] / total;
            for (observer, &value) in attribute_observers.iter().zip(features) {
                if value.is_nan() {
                    continue;
                }
                *vote *= observer
                    .likelihood(value, class_index)
                    .unwrap_or(0.0);
            }
        }
        votes
    }
}

impl Classifier for NaiveBayes {
    fn get_votes_for_instance(&self, example: &Example) -> Vec<f64> {
        Self::do_naive_bayes_prediction(
            example.features(),
            &self.observed_class_distribution,
            &self.attribute_observers,
        )
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        let weight = example.weight();
        if weight <= 0.0 {
            return;
        }
        let class_index = example.class_value();
        if class_index >= self.observed_class_distribution.len() {
            self.observed_class_distribution.resize(class_index + 1, 0.0);
        }
        self.observed_class_distribution[class_index] += weight;

        let features = example.features();
        if self.attribute_observers.len() < features.len() {
            self.attribute_observers
                .resize_with(features.len(), GaussianNumericAttributeClassObserver::new);
        }
        for (observer, &value) in self.attribute_observers.iter_mut().zip(features) {
            observer.observe(value, class_index, weight);
        }
    }

    fn reset_learning(&mut self) {
        self.observed_class_distribution.clear();
        self.attribute_observers.clear();
    }
}
