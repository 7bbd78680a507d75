use crate::core::{Example, WeightedExample};
use crate::utils::math::max_index;

/// Incremental learner that can sit in an ensemble slot.
///
/// Learners grow their class space on demand: a learner trained on
/// output-code labels only ever sees classes `0` and `1` and votes over
/// those two.
pub trait Classifier: Send + Sync {
    /// One score per class index; an empty or all-zero vector means "no opinion".
    fn get_votes_for_instance(&self, example: &Example) -> Vec<f64>;

    fn train_on_instance(&mut self, example: &WeightedExample<'_>);

    /// Forgets everything learned so far.
    fn reset_learning(&mut self);

    fn correctly_classifies(&self, example: &WeightedExample<'_>) -> bool {
        let votes = self.get_votes_for_instance(example.example());
        max_index(&votes) == Some(example.class_value())
    }
}
