use crate::drift::DriftMonitor;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Monitor with a unique id per instance and optionally scripted behaviour.
///
/// Unscripted, it estimates the plain mean of what it observed and never
/// shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct StubMonitor {
    id: usize,
    delta: f64,
    observed: Vec<bool>,
    scripted_estimate: Option<f64>,
    always_shrinks: bool,
}

impl StubMonitor {
    fn build(delta: f64, scripted_estimate: Option<f64>, always_shrinks: bool) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            delta,
            observed: Vec::new(),
            scripted_estimate,
            always_shrinks,
        }
    }

    /// Reports `estimate` whatever it observes.
    pub fn scripted(estimate: f64, always_shrinks: bool) -> Self {
        Self::build(0.002, Some(estimate), always_shrinks)
    }

    /// Running mean that claims its window shrank on every observation.
    pub fn shrinking() -> Self {
        Self::build(0.002, None, true)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn observed(&self) -> &[bool] {
        &self.observed
    }
}

impl DriftMonitor for StubMonitor {
    fn with_confidence(delta: f64) -> Self {
        Self::build(delta, None, false)
    }

    fn observe(&mut self, misclassified: bool) -> bool {
        self.observed.push(misclassified);
        self.always_shrinks
    }

    fn estimate(&self) -> f64 {
        if let Some(e) = self.scripted_estimate {
            return e;
        }
        if self.observed.is_empty() {
            return 0.0;
        }
        self.observed.iter().filter(|&&m| m).count() as f64 / self.observed.len() as f64
    }

    fn width(&self) -> usize {
        self.observed.len()
    }
}
