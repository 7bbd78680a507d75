use crate::classifiers::Classifier;
use crate::core::WeightedExample;
use crate::drift::DriftMonitor;

/// One ensemble slot: a learner and the monitor tracking its error.
///
/// Learner and monitor are only ever replaced together.
#[derive(Debug, Clone)]
pub struct Member<C, M> {
    learner: C,
    monitor: M,
    last_error_estimate: f64,
}

impl<C: Classifier, M: DriftMonitor> Member<C, M> {
    pub fn new(learner: C, monitor: M) -> Self {
        let last_error_estimate = monitor.estimate();
        Self {
            learner,
            monitor,
            last_error_estimate,
        }
    }

    pub fn learner(&self) -> &C {
        &self.learner
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn last_error_estimate(&self) -> f64 {
        self.last_error_estimate
    }

    /// Trains on `view` and reports whether the updated learner now
    /// misclassifies it.
    pub fn train_and_evaluate(&mut self, view: &WeightedExample<'_>) -> bool {
        self.learner.train_on_instance(view);
        !self.learner.correctly_classifies(view)
    }

    /// Feeds one outcome to the monitor. Returns whether the window shrank,
    /// along with the estimates before and after.
    pub(crate) fn observe(&mut self, misclassified: bool) -> (bool, f64, f64) {
        let before = self.monitor.estimate();
        let shrank = self.monitor.observe(misclassified);
        self.last_error_estimate = self.monitor.estimate();
        (shrank, before, self.last_error_estimate)
    }

    /// Forgets the learner and swaps in a fresh monitor.
    pub(crate) fn replace(&mut self, monitor: M) {
        self.learner.reset_learning();
        self.monitor = monitor;
        self.last_error_estimate = self.monitor.estimate();
    }
}
