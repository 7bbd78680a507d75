/// Adaptive estimator of a member's error rate.
///
/// Implementations consume one outcome per observation and keep a running
/// estimate of the recent mean. `observe` reports whether the internal
/// window shrank, which is the raw change signal the ensemble builds on.
pub trait DriftMonitor: Send + Sync {
    /// Fresh monitor with confidence `delta` in `(0, 1)`.
    fn with_confidence(delta: f64) -> Self
    where
        Self: Sized;

    /// Feeds one outcome (`true` = misclassified). Returns `true` when the
    /// window shrank on this observation.
    fn observe(&mut self, misclassified: bool) -> bool;

    /// Current mean estimate; 0 for a fresh monitor.
    fn estimate(&self) -> f64;

    /// Number of observations currently summarized.
    fn width(&self) -> usize;
}
