use crate::classifiers::{Classifier, MajorityClass, NaiveBayes};
use crate::core::{Example, WeightedExample};
use crate::ensemble::LearnerChoice;

/// The learners an ensemble can be configured with.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseLearner {
    NaiveBayes(NaiveBayes),
    MajorityClass(MajorityClass),
}

impl From<&LearnerChoice> for BaseLearner {
    fn from(choice: &LearnerChoice) -> Self {
        match choice {
            LearnerChoice::NaiveBayes(_) => BaseLearner::NaiveBayes(NaiveBayes::new()),
            LearnerChoice::MajorityClass(_) => BaseLearner::MajorityClass(MajorityClass::new()),
        }
    }
}

impl Classifier for BaseLearner {
    fn get_votes_for_instance(&self, example: &Example) -> Vec<f64> {
        match self {
            BaseLearner::NaiveBayes(l) => l.get_votes_for_instance(example),
            BaseLearner::MajorityClass(l) => l.get_votes_for_instance(example),
        }
    }

    fn train_on_instance(&mut self, example: &WeightedExample<'_>) {
        match self {
            BaseLearner::NaiveBayes(l) => l.train_on_instance(example),
            BaseLearner::MajorityClass(l) => l.train_on_instance(example),
        }
    }

    fn reset_learning(&mut self) {
        match self {
            BaseLearner::NaiveBayes(l) => l.reset_learning(),
            BaseLearner::MajorityClass(l) => l.reset_learning(),
        }
    }
}
