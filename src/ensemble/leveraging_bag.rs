use crate::classifiers::{BaseLearner, Classifier};
use crate::core::{Example, StreamHeader};
use crate::drift::{Adwin, DriftMonitor};
use crate::ensemble::executor::Executor;
use crate::ensemble::voting::{combine_output_code_votes, combine_votes};
use crate::ensemble::{
    BatchController, DriftMonitorBank, EnsembleConfig, EnsembleError, Member, OutputCodeMatrix,
    Parallelism, WeightBatch, WeightSampler,
};
use crate::evaluation::Measurement;
use crate::streams::Stream;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Outcome of one training pass (a single example or a whole batch).
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub change_detected: bool,
    pub replaced_member: Option<usize>,
    pub weights: WeightBatch,
}

/// State owned by the coordinating thread. Holding its lock for the whole
/// round makes training calls single-writer.
#[derive(Debug)]
struct Coordinator {
    rng: StdRng,
    member_rngs: Vec<StdRng>,
    header: Option<Arc<StreamHeader>>,
    changes_detected: u64,
    rounds: u64,
    batches: u64,
}

/// Leveraging bagging with one ADWIN-style monitor per member.
///
/// Each round samples a resample weight per member, trains every member
/// with a positive weight on its own view of the example, feeds the
/// member's updated correctness to its monitor and, when some monitor saw
/// its error rise, resets the member with the highest error.
///
/// Training and prediction both take `&self`. Training calls serialize on
/// the coordinator; predictions only take member read locks and can run
/// from other threads while a round is in flight.
pub struct LeveragingBag<C = BaseLearner, M = Adwin> {
    config: EnsembleConfig,
    prototype: C,
    sampler: WeightSampler,
    bank: DriftMonitorBank,
    executor: Executor,
    members: Vec<RwLock<Member<C, M>>>,
    coordinator: Mutex<Coordinator>,
    codes: OnceLock<OutputCodeMatrix>,
    initial_rng: StdRng,
}

impl LeveragingBag<BaseLearner, Adwin> {
    /// Builds the ensemble with the learner named in `config`.
    pub fn from_config(config: EnsembleConfig, rng: StdRng) -> Result<Self, EnsembleError> {
        let prototype = BaseLearner::from(&config.learner);
        Self::new(prototype, config, rng)
    }
}

impl<C, M> LeveragingBag<C, M>
where
    C: Classifier + Clone,
    M: DriftMonitor,
{
    pub fn new(prototype: C, config: EnsembleConfig, rng: StdRng) -> Result<Self, EnsembleError> {
        config.validate()?;
        let executor = Executor::new(config.parallelism()?)?;
        let mut bag = Self {
            sampler: WeightSampler::new(config.weighting, config.weight_shrink)?,
            bank: DriftMonitorBank::new(config.drift_confidence, config.detect_drift),
            executor,
            members: Vec::new(),
            coordinator: Mutex::new(Coordinator {
                rng: rng.clone(),
                member_rngs: Vec::new(),
                header: None,
                changes_detected: 0,
                rounds: 0,
                batches: 0,
            }),
            codes: OnceLock::new(),
            initial_rng: rng,
            prototype,
            config,
        };
        bag.reset();
        Ok(bag)
    }

    /// Rebuilds every member from the prototype and rewinds the generator
    /// to the one given at construction. The output-code matrix is drawn
    /// again on the next training call.
    pub fn reset(&mut self) {
        let n = self.config.ensemble_size;
        self.members = (0..n)
            .map(|_| {
                let mut learner = self.prototype.clone();
                learner.reset_learning();
                RwLock::new(Member::new(learner, self.bank.fresh_monitor()))
            })
            .collect();
        self.codes = OnceLock::new();

        let coord = self.coordinator.get_mut();
        coord.rng = self.initial_rng.clone();
        coord.member_rngs = if self.executor.is_sequential() {
            Vec::new()
        } else {
            (0..n)
                .map(|_| StdRng::seed_from_u64(coord.rng.random()))
                .collect()
        };
        coord.changes_detected = 0;
        coord.rounds = 0;
        coord.batches = 0;
        debug!(ensemble_size = n, threads = self.executor.threads(), "ensemble reset");
    }

    /// Binds the stream header. With output codes on, fails early when the
    /// class count cannot be balanced over this ensemble.
    pub fn set_model_context(&mut self, header: Arc<StreamHeader>) -> Result<(), EnsembleError> {
        let num_classes = header.number_of_classes();
        if self.config.output_codes
            && !OutputCodeMatrix::is_satisfiable(self.config.ensemble_size, num_classes)
        {
            return Err(EnsembleError::UnbalancedOutputCodes {
                num_classes,
                ensemble_size: self.config.ensemble_size,
            });
        }
        self.coordinator.get_mut().header = Some(header);
        Ok(())
    }

    pub fn model_context(&self) -> Option<Arc<StreamHeader>> {
        self.coordinator.lock().header.clone()
    }

    pub fn train_on_example(&self, example: &Example) -> Result<RoundReport, EnsembleError> {
        let mut coord = self.coordinator.lock();
        let codes = self.output_codes(&mut coord, example)?;
        let weights = self.sample_weights(&mut coord, example, codes);
        let batch = WeightBatch::single(&weights)?;
        self.run_round(&mut coord, std::slice::from_ref(example), batch, codes)
    }

    /// Trains with caller-chosen weights, one per member, instead of sampling.
    pub fn train_with_weights(
        &self,
        example: &Example,
        weights: &[f64],
    ) -> Result<RoundReport, EnsembleError> {
        if weights.len() != self.members.len() {
            return Err(EnsembleError::WeightCount {
                expected: self.members.len(),
                actual: weights.len(),
            });
        }
        let batch = WeightBatch::single(weights)?;
        let mut coord = self.coordinator.lock();
        let codes = self.output_codes(&mut coord, example)?;
        self.run_round(&mut coord, std::slice::from_ref(example), batch, codes)
    }

    /// Samples weights for the whole batch up front, then trains every
    /// member over its sub-sequence in a single task. The replacement
    /// policy runs once, after the batch.
    pub fn train_on_batch(&self, examples: &[Example]) -> Result<RoundReport, EnsembleError> {
        let mut coord = self.coordinator.lock();
        let mut codes = None;
        for example in examples {
            codes = self.output_codes(&mut coord, example)?;
        }
        let mut batch = WeightBatch::new(self.members.len());
        for example in examples {
            let column = self.sample_weights(&mut coord, example, codes);
            batch.push_column(&column)?;
        }
        self.run_batch(&mut coord, examples, batch, codes)
    }

    pub fn train_batch_with_weights(
        &self,
        examples: &[Example],
        weights: WeightBatch,
    ) -> Result<RoundReport, EnsembleError> {
        if weights.ensemble_size() != self.members.len() {
            return Err(EnsembleError::WeightCount {
                expected: self.members.len(),
                actual: weights.ensemble_size(),
            });
        }
        if weights.len() != examples.len() {
            return Err(EnsembleError::WeightCount {
                expected: examples.len(),
                actual: weights.len(),
            });
        }
        let mut coord = self.coordinator.lock();
        let mut codes = None;
        for example in examples {
            codes = self.output_codes(&mut coord, example)?;
        }
        self.run_batch(&mut coord, examples, weights, codes)
    }

    /// Drains `stream`, one example per round when `batch_size <= 1` and in
    /// batches otherwise. Returns how many examples were trained on.
    pub fn train_on_stream<S: Stream + ?Sized>(
        &self,
        stream: &mut S,
        batch_size: usize,
    ) -> Result<u64, EnsembleError> {
        let mut seen = 0u64;
        if batch_size <= 1 {
            while let Some(example) = stream.next_instance() {
                self.train_on_example(&example)?;
                seen += 1;
            }
            return Ok(seen);
        }
        let mut controller = BatchController::new(batch_size);
        while let Some(example) = stream.next_instance() {
            seen += 1;
            if let Some(batch) = controller.push(example) {
                self.train_on_batch(&batch)?;
            }
        }
        if let Some(rest) = controller.finish() {
            self.train_on_batch(&rest)?;
        }
        Ok(seen)
    }

    /// Combined class scores. With output codes on and no matrix drawn yet,
    /// every class scores zero.
    pub fn get_votes_for_instance(&self, example: &Example) -> Vec<f64> {
        let votes = self
            .members
            .iter()
            .map(|m| m.read().learner().get_votes_for_instance(example));
        if !self.config.output_codes {
            return combine_votes(votes);
        }
        let num_classes = example.number_of_classes();
        match self.codes.get() {
            Some(codes) => combine_output_code_votes(codes, num_classes, votes),
            None => vec![0.0; num_classes],
        }
    }

    pub fn model_measurements(&self) -> Vec<Measurement> {
        let coord = self.coordinator.lock();
        vec![
            Measurement::new("ensemble size", self.members.len() as f64),
            Measurement::new("change detections", coord.changes_detected as f64),
            Measurement::new("batches processed", coord.batches as f64),
            Measurement::new("rounds", coord.rounds as f64),
        ]
    }

    pub fn changes_detected(&self) -> u64 {
        self.coordinator.lock().changes_detected
    }

    pub fn error_estimates(&self) -> Vec<f64> {
        self.members
            .iter()
            .map(|m| m.read().last_error_estimate())
            .collect()
    }

    /// Snapshot of every member's learner.
    pub fn learners(&self) -> Vec<C> {
        self.members
            .iter()
            .map(|m| m.read().learner().clone())
            .collect()
    }

    /// Runs `f` against member `index` under its read lock.
    pub fn with_member<R>(&self, index: usize, f: impl FnOnce(&Member<C, M>) -> R) -> Option<R> {
        self.members.get(index).map(|m| f(&m.read()))
    }

    pub fn output_code_matrix(&self) -> Option<&OutputCodeMatrix> {
        self.codes.get()
    }

    pub fn ensemble_size(&self) -> usize {
        self.members.len()
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn parallelism(&self) -> Parallelism {
        match &self.executor {
            Executor::Sequential => Parallelism::Sequential,
            Executor::Unbounded => Parallelism::Unbounded,
            Executor::Pool(pool) => Parallelism::Bounded(pool.current_num_threads()),
        }
    }

    /// The output-code matrix for this round, drawn on first use. `None`
    /// when output codes are off.
    fn output_codes(
        &self,
        coord: &mut Coordinator,
        example: &Example,
    ) -> Result<Option<&OutputCodeMatrix>, EnsembleError> {
        if !self.config.output_codes {
            return Ok(None);
        }
        let codes = match self.codes.get() {
            Some(codes) => codes,
            None => {
                let num_classes = coord
                    .header
                    .as_ref()
                    .map_or(example.number_of_classes(), |h| h.number_of_classes());
                let drawn =
                    OutputCodeMatrix::generate(self.members.len(), num_classes, &mut coord.rng)?;
                debug!(num_classes, "output codes drawn");
                self.codes.get_or_init(|| drawn)
            }
        };
        if example.class_value() >= codes.num_classes() {
            return Err(EnsembleError::ClassOutOfRange {
                class: example.class_value(),
                num_classes: codes.num_classes(),
            });
        }
        Ok(Some(codes))
    }

    fn sample_weights(
        &self,
        coord: &mut Coordinator,
        example: &Example,
        codes: Option<&OutputCodeMatrix>,
    ) -> Vec<f64> {
        let Coordinator {
            rng, member_rngs, ..
        } = coord;
        self.members
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let member = slot.read();
                let view = example.reweighted(example.weight(), label_for(codes, i, example));
                let rng = if member_rngs.is_empty() {
                    &mut *rng
                } else {
                    &mut member_rngs[i]
                };
                self.sampler
                    .sample(rng, member.monitor().estimate(), || {
                        !member.learner().correctly_classifies(&view)
                    })
            })
            .collect()
    }

    fn run_batch(
        &self,
        coord: &mut Coordinator,
        examples: &[Example],
        weights: WeightBatch,
        codes: Option<&OutputCodeMatrix>,
    ) -> Result<RoundReport, EnsembleError> {
        if examples.is_empty() {
            return Ok(RoundReport {
                change_detected: false,
                replaced_member: None,
                weights,
            });
        }
        let report = self.run_round(coord, examples, weights, codes)?;
        coord.batches += 1;
        Ok(report)
    }

    fn run_round(
        &self,
        coord: &mut Coordinator,
        examples: &[Example],
        weights: WeightBatch,
        codes: Option<&OutputCodeMatrix>,
    ) -> Result<RoundReport, EnsembleError> {
        let changed = AtomicBool::new(false);
        debug!(
            round = coord.rounds + 1,
            examples = examples.len(),
            members = self.members.len(),
            "dispatching member tasks"
        );

        let failures = self.executor.run(self.members.len(), |i| {
            let mut member = self.members[i].write();
            for (position, example) in examples.iter().enumerate() {
                let k = weights.member(i)[position];
                if k <= 0.0 {
                    continue;
                }
                let view = example.reweighted(example.weight() * k, label_for(codes, i, example));
                let misclassified = member.train_and_evaluate(&view);
                if self.bank.observe(&mut *member, misclassified) {
                    changed.store(true, Ordering::Relaxed);
                }
            }
        });

        if let Some(first) = failures.first() {
            warn!(
                member = first.member,
                failed = failures.len(),
                message = %first.message,
                "member training failed"
            );
            return Err(EnsembleError::MemberTask {
                member: first.member,
                failed: failures.len(),
                message: first.message.clone(),
            });
        }

        coord.rounds += 1;
        let change_detected = changed.load(Ordering::Relaxed);
        let replaced_member = if change_detected {
            coord.changes_detected += 1;
            info!(
                round = coord.rounds,
                detections = coord.changes_detected,
                "change detected"
            );
            self.bank.apply_policy(&self.members)
        } else {
            None
        };

        Ok(RoundReport {
            change_detected,
            replaced_member,
            weights,
        })
    }
}

fn label_for(codes: Option<&OutputCodeMatrix>, member: usize, example: &Example) -> usize {
    let class = example.class_value();
    codes
        .and_then(|c| c.encode(member, class))
        .unwrap_or(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::{LearnerChoice, NoParams, WeightingStrategy};
    use crate::streams::generators::BlobGenerator;
    use crate::testing::dummies::{example, header_binary, header_three_class};
    use crate::testing::stubs::{
        OracleClassifier, PanickingClassifier, StubMonitor, TrainSpyClassifier,
    };

    fn config(n: usize, weighting: WeightingStrategy, cores: i32) -> EnsembleConfig {
        EnsembleConfig {
            ensemble_size: n,
            weighting,
            cores,
            ..EnsembleConfig::default()
        }
    }

    fn drifting_stream(seed: u64) -> BlobGenerator {
        BlobGenerator::new(3, 2, 1.0, 0.0, Some(500), Some(1_000), seed).unwrap()
    }

    fn take(stream: &mut BlobGenerator, n: usize) -> Vec<Example> {
        (0..n).map_while(|_| stream.next_instance()).collect()
    }

    #[test]
    fn construction_validates_config() {
        let bad = EnsembleConfig {
            ensemble_size: 0,
            ..EnsembleConfig::default()
        };
        assert!(matches!(
            LeveragingBag::from_config(bad, StdRng::seed_from_u64(0)),
            Err(EnsembleError::Config(_))
        ));
        let bad_cores = EnsembleConfig {
            cores: -3,
            ..EnsembleConfig::default()
        };
        assert!(matches!(
            LeveragingBag::from_config(bad_cores, StdRng::seed_from_u64(0)),
            Err(EnsembleError::Config(_))
        ));
    }

    #[test]
    fn sequential_runs_are_bit_identical() {
        let run = || {
            let bag = LeveragingBag::from_config(
                config(5, WeightingStrategy::PoissonBootstrap, 1),
                StdRng::seed_from_u64(99),
            )
            .unwrap();
            let mut stream = drifting_stream(3);
            let weights: Vec<WeightBatch> = take(&mut stream, 300)
                .iter()
                .map(|ex| bag.train_on_example(ex).unwrap().weights)
                .collect();
            let estimates: Vec<u64> = bag.error_estimates().iter().map(|e| e.to_bits()).collect();
            (weights, estimates, bag.learners())
        };
        let (w1, e1, l1) = run();
        let (w2, e2, l2) = run();
        assert_eq!(w1, w2);
        assert_eq!(e1, e2);
        assert_eq!(l1, l2);
    }

    #[test]
    fn reset_replays_the_same_weights() {
        let mut bag = LeveragingBag::from_config(
            config(4, WeightingStrategy::Half, 1),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        let mut stream = drifting_stream(8);
        let examples = take(&mut stream, 20);
        let first: Vec<_> = examples
            .iter()
            .map(|ex| bag.train_on_example(ex).unwrap().weights)
            .collect();
        bag.reset();
        assert_eq!(bag.changes_detected(), 0);
        let second: Vec<_> = examples
            .iter()
            .map(|ex| bag.train_on_example(ex).unwrap().weights)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn drift_after_shift_replaces_a_member() {
        let bag = LeveragingBag::from_config(
            config(5, WeightingStrategy::PoissonBootstrap, 1),
            StdRng::seed_from_u64(42),
        )
        .unwrap();
        let mut stream = drifting_stream(7);
        let mut replacements = Vec::new();
        let mut index = 0usize;
        while let Some(ex) = stream.next_instance() {
            let report = bag.train_on_example(&ex).unwrap();
            if let Some(member) = report.replaced_member {
                replacements.push((index, member));
            }
            index += 1;
        }
        assert_eq!(index, 1_000);
        assert!(
            replacements.iter().all(|&(at, _)| at >= 500),
            "replacement before the shift: {replacements:?}"
        );
        assert!(!replacements.is_empty(), "no replacement after the shift");
        assert!(bag.changes_detected() >= replacements.len() as u64);
    }

    #[test]
    fn disabled_detection_never_replaces() {
        let cfg = EnsembleConfig {
            detect_drift: false,
            ..config(5, WeightingStrategy::PoissonBootstrap, 1)
        };
        let bag = LeveragingBag::from_config(cfg, StdRng::seed_from_u64(42)).unwrap();
        let mut stream = drifting_stream(7);
        while let Some(ex) = stream.next_instance() {
            assert_eq!(bag.train_on_example(&ex).unwrap().replaced_member, None);
        }
        assert!(bag.error_estimates().iter().any(|&e| e > 0.0));
    }

    #[test]
    fn batch_and_per_example_training_agree_on_forced_weights() {
        for output_codes in [false, true] {
            let cfg = EnsembleConfig {
                detect_drift: false,
                output_codes,
                ..config(5, WeightingStrategy::PoissonBootstrap, 1)
            };
            let per_example =
                LeveragingBag::from_config(cfg.clone(), StdRng::seed_from_u64(1)).unwrap();
            let batched = LeveragingBag::from_config(cfg, StdRng::seed_from_u64(1)).unwrap();

            let mut stream = drifting_stream(21);
            let examples = take(&mut stream, 60);
            let mut batch = WeightBatch::new(5);
            for (j, ex) in examples.iter().enumerate() {
                let column: Vec<f64> = (0..5).map(|i| ((i + j) % 4) as f64).collect();
                per_example.train_with_weights(ex, &column).unwrap();
                batch.push_column(&column).unwrap();
            }
            let report = batched.train_batch_with_weights(&examples, batch.clone()).unwrap();
            assert_eq!(report.weights, batch);

            assert_eq!(per_example.learners(), batched.learners());
            assert_eq!(per_example.error_estimates(), batched.error_estimates());
            assert_eq!(per_example.output_code_matrix(), batched.output_code_matrix());
        }
    }

    #[test]
    fn batch_weights_cover_every_member_and_example() {
        let bag = LeveragingBag::from_config(
            config(4, WeightingStrategy::WithoutReplacement, 1),
            StdRng::seed_from_u64(2),
        )
        .unwrap();
        let mut stream = drifting_stream(2);
        let examples = take(&mut stream, 25);
        let report = bag.train_on_batch(&examples).unwrap();
        assert_eq!(report.weights.ensemble_size(), 4);
        assert_eq!(report.weights.len(), 25);
        assert!((0..4).all(|i| report.weights.member(i).iter().all(|&k| k >= 1.0)));

        let empty = bag.train_on_batch(&[]).unwrap();
        assert!(empty.weights.is_empty());

        let ms = bag.model_measurements();
        let value = |name: &str| ms.iter().find(|m| m.name == name).map(|m| m.value);
        assert_eq!(value("ensemble size"), Some(4.0));
        assert_eq!(value("batches processed"), Some(1.0));
        assert_eq!(value("rounds"), Some(1.0));
        assert_eq!(value("change detections"), Some(0.0));
    }

    #[test]
    fn forced_weights_are_validated() {
        let bag = LeveragingBag::from_config(
            config(3, WeightingStrategy::PoissonBootstrap, 1),
            StdRng::seed_from_u64(2),
        )
        .unwrap();
        let h = header_three_class();
        let ex = example(&h, [0.0, 0.0], 0);
        assert!(matches!(
            bag.train_with_weights(&ex, &[1.0, 1.0]),
            Err(EnsembleError::WeightCount {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            bag.train_with_weights(&ex, &[1.0, -1.0, 1.0]),
            Err(EnsembleError::NegativeWeight { member: 1, .. })
        ));
        assert!(matches!(
            bag.train_batch_with_weights(&[ex.clone()], WeightBatch::new(3)),
            Err(EnsembleError::WeightCount {
                expected: 1,
                actual: 0
            })
        ));
        assert!(matches!(
            bag.train_batch_with_weights(&[ex], WeightBatch::new(2)),
            Err(EnsembleError::WeightCount {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn zero_weight_members_skip_training_and_observation() {
        let cfg = config(3, WeightingStrategy::PoissonBootstrap, 1);
        let bag: LeveragingBag<TrainSpyClassifier> =
            LeveragingBag::new(TrainSpyClassifier::new(), cfg, StdRng::seed_from_u64(0)).unwrap();
        let h = header_three_class();
        let ex = Example::new(h, vec![1.0, 2.0], 2, 0.5).unwrap();
        bag.train_with_weights(&ex, &[2.0, 0.0, 1.0]).unwrap();
        let learners = bag.learners();
        assert_eq!(learners[0].seen(), &[(1.0, 2)]);
        assert!(learners[1].seen().is_empty());
        assert_eq!(learners[2].seen(), &[(0.5, 2)]);
        assert_eq!(bag.with_member(1, |m| m.monitor().width()), Some(0));
        assert_eq!(bag.with_member(0, |m| m.monitor().width()), Some(1));
    }

    #[test]
    fn output_codes_relabel_training_examples() {
        let cfg = EnsembleConfig {
            output_codes: true,
            ..config(3, WeightingStrategy::PoissonBootstrap, 1)
        };
        let bag: LeveragingBag<TrainSpyClassifier> =
            LeveragingBag::new(TrainSpyClassifier::new(), cfg, StdRng::seed_from_u64(6)).unwrap();
        let h = header_three_class();
        let probe = example(&h, [0.0, 0.0], 2);
        assert_eq!(bag.get_votes_for_instance(&probe), vec![0.0, 0.0, 0.0]);

        bag.train_with_weights(&probe, &[1.0, 1.0, 1.0]).unwrap();
        let codes = bag.output_code_matrix().unwrap().clone();
        for (i, learner) in bag.learners().iter().enumerate() {
            assert_eq!(learner.seen(), &[(1.0, codes.encode(i, 2).unwrap())]);
        }
        // each member supports every class whose code matches its vote
        let votes = bag.get_votes_for_instance(&probe);
        assert_eq!(votes.len(), 3);
        let support: f64 = votes.iter().sum();
        assert!((3.0..=6.0).contains(&support), "{votes:?}");
    }

    #[test]
    fn output_codes_reject_unbalanced_shapes() {
        let cfg = EnsembleConfig {
            output_codes: true,
            ..config(4, WeightingStrategy::PoissonBootstrap, 1)
        };
        let mut bag = LeveragingBag::from_config(cfg, StdRng::seed_from_u64(6)).unwrap();
        let h = header_three_class();
        assert!(matches!(
            bag.set_model_context(h.clone()),
            Err(EnsembleError::UnbalancedOutputCodes {
                num_classes: 3,
                ensemble_size: 4
            })
        ));
        assert!(matches!(
            bag.train_on_example(&example(&h, [0.0, 0.0], 0)),
            Err(EnsembleError::UnbalancedOutputCodes { .. })
        ));
        assert!(bag.set_model_context(header_binary()).is_ok());
        assert!(bag.model_context().is_some());
    }

    #[test]
    fn output_codes_separate_clusters() {
        let cfg = EnsembleConfig {
            output_codes: true,
            detect_drift: false,
            ..config(9, WeightingStrategy::PoissonBootstrap, 1)
        };
        let bag = LeveragingBag::from_config(cfg, StdRng::seed_from_u64(13)).unwrap();
        let mut stream = BlobGenerator::new(3, 2, 0.5, 0.0, None, Some(400), 5).unwrap();
        bag.train_on_stream(&mut stream, 1).unwrap();
        let h = stream.header().clone();
        for class in 0..3 {
            let centre = class as f64 * 10.0;
            let votes = bag.get_votes_for_instance(&example(&h, [centre, centre], class));
            assert_eq!(crate::utils::math::max_index(&votes), Some(class), "{votes:?}");
        }
    }

    #[test]
    fn parallel_strategies_agree_with_each_other() {
        let run = |cores: i32| {
            let bag = LeveragingBag::from_config(
                config(6, WeightingStrategy::MarginError, cores),
                StdRng::seed_from_u64(77),
            )
            .unwrap();
            let mut stream = drifting_stream(4);
            let reports: Vec<RoundReport> = take(&mut stream, 700)
                .iter()
                .map(|ex| bag.train_on_example(ex).unwrap())
                .collect();
            (reports, bag.learners(), bag.error_estimates())
        };
        let unbounded = run(0);
        let pooled = run(3);
        assert_eq!(unbounded, pooled);
    }

    #[test]
    fn batched_stream_training_runs_on_a_pool() {
        let bag = LeveragingBag::from_config(
            config(5, WeightingStrategy::PoissonBootstrap, 2),
            StdRng::seed_from_u64(31),
        )
        .unwrap();
        assert_eq!(bag.parallelism(), Parallelism::Bounded(2));
        let mut stream = drifting_stream(31);
        assert_eq!(bag.train_on_stream(&mut stream, 64).unwrap(), 1_000);
        let ms = bag.model_measurements();
        assert_eq!(
            ms.iter().find(|m| m.name == "batches processed").map(|m| m.value),
            Some(16.0)
        );
        let h = stream.header().clone();
        let votes = bag.get_votes_for_instance(&example(&h, [10.0, 10.0], 2));
        assert_eq!(votes.len(), 3);
        assert!(votes.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn failed_member_task_fails_the_round_and_keeps_other_work() {
        for cores in [1, 0, 2] {
            let bag: LeveragingBag<PanickingClassifier> = LeveragingBag::new(
                PanickingClassifier::panicking_above(50.0),
                config(4, WeightingStrategy::PoissonBootstrap, cores),
                StdRng::seed_from_u64(3),
            )
            .unwrap();
            let h = header_three_class();
            let ex = example(&h, [0.0, 0.0], 1);
            let err = bag.train_with_weights(&ex, &[1.0, 1.0, 100.0, 1.0]).unwrap_err();
            match err {
                EnsembleError::MemberTask {
                    member,
                    failed,
                    message,
                } => {
                    assert_eq!(member, 2);
                    assert_eq!(failed, 1);
                    assert!(message.contains("100"), "{message}");
                }
                other => panic!("unexpected error {other:?}"),
            }
            let learners = bag.learners();
            assert_eq!(learners[0].trained_weight(), 1.0);
            assert_eq!(learners[3].trained_weight(), 1.0);
            assert_eq!(bag.changes_detected(), 0);

            let rounds = || {
                bag.model_measurements()
                    .iter()
                    .find(|m| m.name == "rounds")
                    .map(|m| m.value)
            };
            assert_eq!(rounds(), Some(0.0));

            // the ensemble stays usable
            bag.train_with_weights(&ex, &[1.0, 1.0, 1.0, 1.0]).unwrap();
            assert_eq!(bag.learners()[0].trained_weight(), 2.0);
            assert_eq!(rounds(), Some(1.0));
        }
    }

    #[test]
    fn failed_batches_are_not_counted() {
        let bag: LeveragingBag<PanickingClassifier> = LeveragingBag::new(
            PanickingClassifier::panicking_above(50.0),
            config(2, WeightingStrategy::PoissonBootstrap, 1),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        let h = header_three_class();
        let examples = vec![example(&h, [0.0, 0.0], 0), example(&h, [1.0, 1.0], 1)];
        let mut weights = WeightBatch::new(2);
        weights.push_column(&[1.0, 1.0]).unwrap();
        weights.push_column(&[1.0, 80.0]).unwrap();
        assert!(matches!(
            bag.train_batch_with_weights(&examples, weights),
            Err(EnsembleError::MemberTask { member: 1, .. })
        ));

        let mut weights = WeightBatch::new(2);
        weights.push_column(&[1.0, 1.0]).unwrap();
        weights.push_column(&[2.0, 0.0]).unwrap();
        let report = bag.train_batch_with_weights(&examples, weights.clone()).unwrap();
        assert_eq!(report.weights, weights);

        let ms = bag.model_measurements();
        let value = |name: &str| ms.iter().find(|m| m.name == name).map(|m| m.value);
        assert_eq!(value("rounds"), Some(1.0));
        assert_eq!(value("batches processed"), Some(1.0));
    }

    #[test]
    fn always_correct_members_never_flag_change() {
        let bag: LeveragingBag<OracleClassifier, StubMonitor> = LeveragingBag::new(
            OracleClassifier::new(),
            config(3, WeightingStrategy::PoissonBootstrap, 1),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        let h = header_three_class();
        let ex = example(&h, [0.0, 0.0], 0);
        for _ in 0..100 {
            let report = bag.train_with_weights(&ex, &[1.0, 1.0, 1.0]).unwrap();
            assert!(!report.change_detected);
            assert_eq!(report.replaced_member, None);
        }
        assert_eq!(bag.error_estimates(), vec![0.0; 3]);
        let ids: Vec<usize> = (0..3)
            .filter_map(|i| bag.with_member(i, |m| m.monitor().id()))
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2]);
    }

    #[test]
    fn predictions_run_alongside_training() {
        let bag = LeveragingBag::from_config(
            config(4, WeightingStrategy::PoissonBootstrap, 2),
            StdRng::seed_from_u64(8),
        )
        .unwrap();
        let mut stream = drifting_stream(8);
        let examples = take(&mut stream, 600);
        let h = stream.header().clone();
        std::thread::scope(|s| {
            s.spawn(|| {
                for ex in &examples {
                    bag.train_on_example(ex).unwrap();
                }
            });
            for _ in 0..2 {
                s.spawn(|| {
                    for i in 0..300 {
                        let probe = example(&h, [(i % 30) as f64, 1.0], i % 3);
                        let votes = bag.get_votes_for_instance(&probe);
                        assert!(votes.len() <= 3);
                        assert!(votes.iter().all(|v| v.is_finite() && *v >= 0.0));
                    }
                });
            }
        });
        assert_eq!(
            bag.model_measurements()
                .iter()
                .find(|m| m.name == "rounds")
                .map(|m| m.value),
            Some(600.0)
        );
    }

    #[test]
    fn majority_class_prototype_from_config() {
        let cfg = EnsembleConfig {
            learner: LearnerChoice::MajorityClass(NoParams::default()),
            ..config(2, WeightingStrategy::WithoutReplacement, 1)
        };
        let bag = LeveragingBag::from_config(cfg, StdRng::seed_from_u64(1)).unwrap();
        let h = header_three_class();
        bag.train_on_example(&example(&h, [0.0, 0.0], 2)).unwrap();
        assert_eq!(bag.get_votes_for_instance(&example(&h, [5.0, 5.0], 0)), vec![0.0, 0.0, 2.0]);
        assert!(bag.learners().iter().all(|l| matches!(l, BaseLearner::MajorityClass(_))));
    }
}
