use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::core::estimators::GaussianEstimator;

#[derive(Debug, Clone, PartialEq)]
struct ClassSummary {
    estimator: GaussianEstimator,
    min: f64,
    max: f64,
}

/// Models each class's values of one numeric feature as a normal
/// distribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaussianNumericAttributeClassObserver {
    per_class: Vec<Option<ClassSummary>>,
}

impl GaussianNumericAttributeClassObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest and largest value seen under `class`.
    pub fn observed_range(&self, class: usize) -> Option<(f64, f64)> {
        self.summary(class).map(|s| (s.min, s.max))
    }

    pub fn estimator(&self, class: usize) -> Option<&GaussianEstimator> {
        self.summary(class).map(|s| &s.estimator)
    }

    fn summary(&self, class: usize) -> Option<&ClassSummary> {
        self.per_class.get(class)?.as_ref()
    }
}

impl AttributeClassObserver for GaussianNumericAttributeClassObserver {
    fn observe(&mut self, value: f64, class: usize, weight: f64) {
        if value.is_nan() || !weight.is_finite() || weight <= 0.0 {
            return;
        }
        if class >= self.per_class.len() {
            self.per_class.resize(class + 1, None);
        }
        let summary = self.per_class[class].get_or_insert_with(|| ClassSummary {
            estimator: GaussianEstimator::new(),
            min: value,
            max: value,
        });
        summary.min = summary.min.min(value);
        summary.max = summary.max.max(value);
        summary.estimator.add_observation(value, weight);
    }

    fn likelihood(&self, value: f64, class: usize) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        self.summary(class)
            .map(|s| s.estimator.probability_density(value))
    }
}
