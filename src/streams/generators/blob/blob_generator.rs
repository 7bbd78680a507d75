use std::io::{Error, ErrorKind};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::core::{Example, StreamHeader};
use crate::streams::Stream;

/// Gaussian clusters, one per class, centred at `class * 10` on every
/// feature.
///
/// With `drift_at` set, labels rotate (`c -> (c + 1) % k`) from that
/// instance on, so the features keep their distribution while the concept
/// changes abruptly.
#[derive(Debug)]
pub struct BlobGenerator {
    seed: u64,
    rng: StdRng,
    clusters: Vec<Normal<f64>>,
    noise_fraction: f64,
    drift_at: Option<usize>,
    header: Arc<StreamHeader>,
    max_instances: Option<usize>,
    produced: usize,
}

impl BlobGenerator {
    pub fn new(
        num_classes: usize,
        num_features: usize,
        spread: f64,
        noise_fraction: f64,
        drift_at: Option<usize>,
        max_instances: Option<usize>,
        seed: u64,
    ) -> Result<Self, Error> {
        if num_classes == 0 || num_features == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Blob streams need at least one class and one feature",
            ));
        }
        if !spread.is_finite() || spread <= 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Spread must be finite and positive",
            ));
        }
        if !(0.0..=1.0).contains(&noise_fraction) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Noise fraction must be in [0.0, 1.0]",
            ));
        }

        let clusters = (0..num_classes)
            .map(|class| Normal::new(Self::centre(class), spread))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;

        let header = Arc::new(StreamHeader::new(
            "Blobs".into(),
            (1..=num_features).map(|i| format!("attrib{i}")).collect(),
            (0..num_classes).map(|c| format!("class{c}")).collect(),
        ));

        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            clusters,
            noise_fraction,
            drift_at,
            header,
            max_instances,
            produced: 0,
        })
    }

    /// Centre of `class` on every feature.
    pub fn centre(class: usize) -> f64 {
        class as f64 * 10.0
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    fn concept_label(&self, cluster: usize) -> usize {
        let k = self.header.number_of_classes();
        match self.drift_at {
            Some(at) if self.produced >= at => (cluster + 1) % k,
            _ => cluster,
        }
    }

    fn maybe_flip_with_noise(&mut self, label: usize) -> usize {
        let k = self.header.number_of_classes();
        if self.noise_fraction <= 0.0 || k < 2 {
            return label;
        }
        if self.rng.random::<f64>() < self.noise_fraction {
            (label + 1 + self.rng.random_range(0..k - 1)) % k
        } else {
            label
        }
    }
}

impl Stream for BlobGenerator {
    fn header(&self) -> &Arc<StreamHeader> {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.max_instances.is_none_or(|max| self.produced < max)
    }

    fn next_instance(&mut self) -> Option<Example> {
        if !self.has_more_instances() {
            return None;
        }

        let cluster = self.rng.random_range(0..self.clusters.len());
        let distribution = &self.clusters[cluster];
        let features: Vec<f64> = (0..self.header.number_of_features())
            .map(|_| distribution.sample(&mut self.rng))
            .collect();

        let label = self.concept_label(cluster);
        let label = self.maybe_flip_with_noise(label);

        let example = Example::new(Arc::clone(&self.header), features, label, 1.0).ok()?;
        self.produced += 1;
        Some(example)
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        Ok(())
    }
}
