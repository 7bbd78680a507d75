use crate::classifiers::Classifier;
use crate::core::{Example, WeightedExample};

/// Always votes for the example's true class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleClassifier {
    trained_weight: f64,
}

impl OracleClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trained_weight(&self) -> f64 {
        self.trained_weight
    }
}

impl Classifier for OracleClassifier {
    fn get_votes_for_instance(&self, example: &Example) -> Vec<f64> {
        let mut votes = vec![0.0; example.number_of_classes()];
        if let Some(v) = votes.get_mut(example.class_value()) {
            *v = 1.0;
        }
        votes
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        self.trained_weight += example.weight();
    }

    fn reset_learning(&mut self) {
        self.trained_weight = 0.0;
    }
}

/// Returns the same votes whatever it is asked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedVoteClassifier {
    votes: Vec<f64>,
}

impl FixedVoteClassifier {
    pub fn new(votes: Vec<f64>) -> Self {
        Self { votes }
    }
}

impl Classifier for FixedVoteClassifier {
    fn get_votes_for_instance(&self, _example: &Example) -> Vec<f64> {
        self.votes.clone()
    }

    fn train_on_instance(&mut self, _example: &WeightedExample<'_>) {}

    fn reset_learning(&mut self) {}
}

/// Records the (weight, class) of every training call and has no opinion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainSpyClassifier {
    seen: Vec<(f64, usize)>,
}

impl TrainSpyClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> &[(f64, usize)] {
        &self.seen
    }
}

impl Classifier for TrainSpyClassifier {
    fn get_votes_for_instance(&self, _example: &Example) -> Vec<f64> {
        Vec::new()
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        self.seen.push((example.weight(), example.class_value()));
    }

    fn reset_learning(&mut self) {
        self.seen.clear();
    }
}

/// Panics when asked to train on a weight above its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PanickingClassifier {
    threshold: f64,
    trained_weight: f64,
}

impl PanickingClassifier {
    pub fn panicking_above(threshold: f64) -> Self {
        Self {
            threshold,
            trained_weight: 0.0,
        }
    }

    pub fn trained_weight(&self) -> f64 {
        self.trained_weight
    }
}

impl Classifier for PanickingClassifier {
    fn get_votes_for_instance(&self, _example: &Example) -> Vec<f64> {
        Vec::new()
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        if example.weight() > self.threshold {
            panic!("refusing to train on weight {}", example.weight());
        }
        self.trained_weight += example.weight();
    }

    fn reset_learning(&mut self) {
        self.trained_weight = 0.0;
    }
}
