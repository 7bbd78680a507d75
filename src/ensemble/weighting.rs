use crate::ensemble::{ConfigError, WeightingStrategy};
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Draws one member's resample weight for the current example.
#[derive(Debug, Clone)]
pub struct WeightSampler {
    strategy: WeightingStrategy,
    weight_shrink: f64,
    leveraged: Poisson<f64>,
    unit: Poisson<f64>,
}

impl WeightSampler {
    pub fn new(strategy: WeightingStrategy, weight_shrink: f64) -> Result<Self, ConfigError> {
        if !weight_shrink.is_finite() || weight_shrink <= 0.0 {
            return Err(ConfigError::InvalidWeightShrink(weight_shrink));
        }
        let leveraged = Poisson::new(weight_shrink)
            .map_err(|_| ConfigError::InvalidWeightShrink(weight_shrink))?;
        let unit = Poisson::new(1.0).map_err(|_| ConfigError::InvalidWeightShrink(1.0))?;
        Ok(Self {
            strategy,
            weight_shrink,
            leveraged,
            unit,
        })
    }

    pub fn strategy(&self) -> WeightingStrategy {
        self.strategy
    }

    pub fn weight_shrink(&self) -> f64 {
        self.weight_shrink
    }

    /// `error_estimate` is the member's monitor estimate before this round.
    /// `misclassifies` is only evaluated by the margin-error strategy, and
    /// the generator is only consulted when it reports a correct prediction.
    pub fn sample<R, F>(&self, rng: &mut R, error_estimate: f64, misclassifies: F) -> f64
    where
        R: Rng + ?Sized,
        F: FnOnce() -> bool,
    {
        match self.strategy {
            WeightingStrategy::PoissonBootstrap => self.leveraged.sample(rng),
            WeightingStrategy::MarginError => {
                if misclassifies() {
                    1.0
                } else {
                    let odds = error_estimate / (1.0 - error_estimate);
                    if rng.random::<f64>() < odds { 1.0 } else { 0.0 }
                }
            }
            WeightingStrategy::Half => {
                if rng.random_bool(0.5) {
                    0.0
                } else {
                    1.0
                }
            }
            WeightingStrategy::WithoutReplacement => 1.0 + self.unit.sample(rng),
            WeightingStrategy::Subagging => {
                if self.unit.sample(rng) > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    fn strategies() -> impl Strategy<Value = WeightingStrategy> {
        prop::sample::select(WeightingStrategy::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn weights_are_never_negative(
            strategy in strategies(),
            seed in any::<u64>(),
            members in 1usize..32,
            shrink in 0.01f64..200.0,
            error in 0.0f64..=1.0,
            wrong in any::<bool>(),
        ) {
            let sampler = WeightSampler::new(strategy, shrink).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..members {
                let k = sampler.sample(&mut rng, error, || wrong);
                prop_assert!(k >= 0.0 && k.is_finite(), "k = {}", k);
            }
        }
    }

    #[test]
    fn margin_error_misclassified_is_one_without_touching_rng() {
        let sampler = WeightSampler::new(WeightingStrategy::MarginError, 6.0).unwrap();
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        assert_eq!(sampler.sample(&mut a, 0.4, || true), 1.0);
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn margin_error_with_zero_error_and_correct_prediction_is_zero() {
        let sampler = WeightSampler::new(WeightingStrategy::MarginError, 6.0).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng, 0.0, || false), 0.0);
        }
    }

    #[test]
    fn strategy_supports() {
        let mut rng = StdRng::seed_from_u64(11);
        let draw = |s: WeightingStrategy, rng: &mut StdRng| -> Vec<f64> {
            let sampler = WeightSampler::new(s, 6.0).unwrap();
            (0..2_000).map(|_| sampler.sample(&mut *rng, 0.2, || false)).collect()
        };

        let half = draw(WeightingStrategy::Half, &mut rng);
        assert!(half.iter().all(|&k| k == 0.0 || k == 1.0));
        let ones = half.iter().filter(|&&k| k == 1.0).count();
        assert!((800..1_200).contains(&ones), "ones = {ones}");

        let wt = draw(WeightingStrategy::WithoutReplacement, &mut rng);
        assert!(wt.iter().all(|&k| k >= 1.0 && k.fract() == 0.0));

        let sub = draw(WeightingStrategy::Subagging, &mut rng);
        assert!(sub.iter().all(|&k| k == 0.0 || k == 1.0));
        let kept = sub.iter().filter(|&&k| k == 1.0).count() as f64 / 2_000.0;
        // P(Poisson(1) > 0) = 1 - e^-1
        assert!((kept - 0.632).abs() < 0.05, "kept = {kept}");

        let lbag = draw(WeightingStrategy::PoissonBootstrap, &mut rng);
        let mean = lbag.iter().sum::<f64>() / lbag.len() as f64;
        assert!((mean - 6.0).abs() < 0.3, "mean = {mean}");
    }

    #[test]
    fn shrink_must_be_a_valid_poisson_rate() {
        assert_eq!(
            WeightSampler::new(WeightingStrategy::Half, 0.0).unwrap_err(),
            ConfigError::InvalidWeightShrink(0.0)
        );
        assert!(WeightSampler::new(WeightingStrategy::Half, f64::NAN).is_err());
        let sampler = WeightSampler::new(WeightingStrategy::PoissonBootstrap, 2.5).unwrap();
        assert_eq!(sampler.weight_shrink(), 2.5);
    }

    #[test]
    fn leveraged_weights_are_whole_counts_around_the_shrink() {
        let sampler = WeightSampler::new(WeightingStrategy::PoissonBootstrap, 150.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let draws: Vec<f64> = (0..5_000).map(|_| sampler.sample(&mut rng, 0.0, || false)).collect();
        assert!(draws.iter().all(|k| k.fract() == 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 150.0).abs() < 2.0, "mean = {mean}");
    }
}
