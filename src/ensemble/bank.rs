use crate::classifiers::Classifier;
use crate::drift::DriftMonitor;
use crate::ensemble::Member;
use parking_lot::RwLock;
use tracing::info;

/// Wires one drift monitor per member and owns the replacement policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftMonitorBank {
    delta: f64,
    replace_on_change: bool,
}

impl DriftMonitorBank {
    pub fn new(delta: f64, replace_on_change: bool) -> Self {
        Self {
            delta,
            replace_on_change,
        }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn fresh_monitor<M: DriftMonitor>(&self) -> M {
        M::with_confidence(self.delta)
    }

    /// Records one outcome for `member`. Returns `true` when the window shrank
    /// and the error estimate went up.
    pub fn observe<C: Classifier, M: DriftMonitor>(
        &self,
        member: &mut Member<C, M>,
        misclassified: bool,
    ) -> bool {
        let (shrank, before, after) = member.observe(misclassified);
        shrank && after > before
    }

    /// Index of the largest estimate, first index on ties. `None` unless some
    /// estimate is above zero.
    pub fn select_worst(estimates: impl IntoIterator<Item = f64>) -> Option<usize> {
        let mut max = 0.0;
        let mut worst = None;
        for (i, e) in estimates.into_iter().enumerate() {
            if e > max {
                max = e;
                worst = Some(i);
            }
        }
        worst
    }

    /// Resets the worst member after a round that flagged change. Must only
    /// be called once every member task of the round has joined.
    pub fn apply_policy<C: Classifier, M: DriftMonitor>(
        &self,
        members: &[RwLock<Member<C, M>>],
    ) -> Option<usize> {
        if !self.replace_on_change {
            return None;
        }
        let worst =
            Self::select_worst(members.iter().map(|m| m.read().monitor().estimate()))?;
        let estimate = {
            let mut member = members[worst].write();
            let estimate = member.monitor().estimate();
            member.replace(self.fresh_monitor());
            estimate
        };
        info!(member = worst, estimate, "replacing member after drift");
        Some(worst)
    }
}
