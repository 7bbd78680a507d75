use crate::core::Example;
use crate::ensemble::EnsembleError;

/// Resample weights for every (member, position) of one training pass.
///
/// Stored member-major so each member task reads a contiguous row. Each
/// training pass builds a fresh batch and hands it back in its report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightBatch {
    rows: Vec<Vec<f64>>,
    len: usize,
}

impl WeightBatch {
    pub fn new(ensemble_size: usize) -> Self {
        Self {
            rows: vec![Vec::new(); ensemble_size],
            len: 0,
        }
    }

    /// Batch for a single example.
    pub fn single(weights: &[f64]) -> Result<Self, EnsembleError> {
        let mut batch = Self::new(weights.len());
        batch.push_column(weights)?;
        Ok(batch)
    }

    /// Appends one example's weights, one per member.
    pub fn push_column(&mut self, weights: &[f64]) -> Result<(), EnsembleError> {
        if weights.len() != self.rows.len() {
            return Err(EnsembleError::WeightCount {
                expected: self.rows.len(),
                actual: weights.len(),
            });
        }
        if let Some((member, &weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(EnsembleError::NegativeWeight { member, weight });
        }
        for (row, &w) in self.rows.iter_mut().zip(weights) {
            row.push(w);
        }
        self.len += 1;
        Ok(())
    }

    pub fn ensemble_size(&self) -> usize {
        self.rows.len()
    }

    /// Number of examples covered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn member(&self, member: usize) -> &[f64] {
        &self.rows[member]
    }

    pub fn get(&self, member: usize, position: usize) -> Option<f64> {
        self.rows.get(member)?.get(position).copied()
    }

    /// Weights of every member for the example at `position`.
    pub fn column(&self, position: usize) -> Option<Vec<f64>> {
        self.rows.iter().map(|r| r.get(position).copied()).collect()
    }
}

/// Groups incoming examples into fixed-size batches.
#[derive(Debug, Clone)]
pub struct BatchController {
    batch_size: usize,
    pending: Vec<Example>,
}

impl BatchController {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Buffers `example`; hands back a full batch once one is ready.
    pub fn push(&mut self, example: Example) -> Option<Vec<Example>> {
        self.pending.push(example);
        if self.pending.len() >= self.batch_size {
            Some(std::mem::replace(
                &mut self.pending,
                Vec::with_capacity(self.batch_size),
            ))
        } else {
            None
        }
    }

    /// Flushes whatever is left over.
    pub fn finish(&mut self) -> Option<Vec<Example>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
