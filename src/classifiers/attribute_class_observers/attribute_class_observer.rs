/// Per-feature summary of the values seen under each class.
///
/// Class slots are created on first use, so the same observer serves a
/// learner over the full class space and one over binary output codes.
pub trait AttributeClassObserver {
    /// Folds `value` into the summary of `class` with `weight`. Missing
    /// values and non-positive weights are ignored.
    fn observe(&mut self, value: f64, class: usize, weight: f64);

    /// Density of `value` under `class`, or `None` if `class` never had
    /// weight.
    fn likelihood(&self, value: f64, class: usize) -> Option<f64>;
}
