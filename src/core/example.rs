use crate::core::StreamHeader;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExampleError {
    #[error("weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),

    #[error("class index {class} out of range for {num_classes} classes")]
    ClassOutOfRange { class: usize, num_classes: usize },

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// A labeled, weighted observation drawn from a stream.
///
/// Examples are immutable once built. Per-member variations (resample
/// weight, output-code label) are expressed through [`WeightedExample`]
/// views instead of copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    header: Arc<StreamHeader>,
    features: Vec<f64>,
    class_value: usize,
    weight: f64,
}

impl Example {
    pub fn new(
        header: Arc<StreamHeader>,
        features: Vec<f64>,
        class_value: usize,
        weight: f64,
    ) -> Result<Self, ExampleError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ExampleError::InvalidWeight(weight));
        }
        let num_classes = header.number_of_classes();
        if class_value >= num_classes {
            return Err(ExampleError::ClassOutOfRange {
                class: class_value,
                num_classes,
            });
        }
        if features.len() != header.number_of_features() {
            return Err(ExampleError::FeatureCount {
                expected: header.number_of_features(),
                actual: features.len(),
            });
        }
        Ok(Self {
            header,
            features,
            class_value,
            weight,
        })
    }

    pub fn header(&self) -> &Arc<StreamHeader> {
        &self.header
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn feature_at(&self, index: usize) -> Option<f64> {
        self.features.get(index).copied()
    }

    pub fn class_value(&self) -> usize {
        self.class_value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn number_of_classes(&self) -> usize {
        self.header.number_of_classes()
    }

    /// View of this example with its own weight and label unchanged.
    pub fn as_weighted(&self) -> WeightedExample<'_> {
        WeightedExample {
            example: self,
            weight: self.weight,
            class_value: self.class_value,
        }
    }

    /// View of this example carrying `weight` and `class_value` in place of
    /// the originals.
    pub fn reweighted(&self, weight: f64, class_value: usize) -> WeightedExample<'_> {
        WeightedExample {
            example: self,
            weight,
            class_value,
        }
    }
}

/// Borrowed view of an [`Example`] with an overridden weight and label.
#[derive(Debug, Clone, Copy)]
pub struct WeightedExample<'a> {
    example: &'a Example,
    weight: f64,
    class_value: usize,
}

impl<'a> WeightedExample<'a> {
    pub fn example(&self) -> &'a Example {
        self.example
    }

    pub fn features(&self) -> &'a [f64] {
        self.example.features()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn class_value(&self) -> usize {
        self.class_value
    }
}
