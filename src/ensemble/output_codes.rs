use crate::ensemble::EnsembleError;
use rand::Rng;

/// Random error-correcting output codes: one binary code per (member, class).
///
/// Row `i` relabels every class for member `i`, turning the multiclass
/// problem into a binary one. Each row holds as many ones as zeros, give or
/// take one when the ensemble size is odd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCodeMatrix {
    codes: Vec<Vec<u8>>,
    num_classes: usize,
}

impl OutputCodeMatrix {
    /// Whether balanced rows exist for this shape. A row over an odd number
    /// of classes can only balance to within one, which an even ensemble
    /// does not tolerate.
    pub fn is_satisfiable(ensemble_size: usize, num_classes: usize) -> bool {
        num_classes % 2 == 0 || ensemble_size % 2 == 1
    }

    pub fn generate<R: Rng + ?Sized>(
        ensemble_size: usize,
        num_classes: usize,
        rng: &mut R,
    ) -> Result<Self, EnsembleError> {
        if !Self::is_satisfiable(ensemble_size, num_classes) {
            return Err(EnsembleError::UnbalancedOutputCodes {
                num_classes,
                ensemble_size,
            });
        }
        let tolerance = (ensemble_size % 2) as i64;
        let mut codes = Vec::with_capacity(ensemble_size);
        for _ in 0..ensemble_size {
            let mut row = vec![0u8; num_classes];
            loop {
                let mut balance = 0i64;
                for j in 0..num_classes {
                    row[j] = if j == 1 && num_classes == 2 {
                        1 - row[0]
                    } else {
                        u8::from(rng.random_bool(0.5))
                    };
                    balance += if row[j] == 1 { 1 } else { -1 };
                }
                if balance * balance <= tolerance {
                    break;
                }
            }
            codes.push(row);
        }
        Ok(Self { codes, num_classes })
    }

    pub fn ensemble_size(&self) -> usize {
        self.codes.len()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn row(&self, member: usize) -> &[u8] {
        &self.codes[member]
    }

    /// Binary label member `member` trains on for `class`.
    pub fn encode(&self, member: usize, class: usize) -> Option<usize> {
        self.codes
            .get(member)
            .and_then(|row| row.get(class))
            .map(|&c| c as usize)
    }

    /// Adds one unit of support to every class whose code for `member`
    /// equals `vote_class`.
    pub fn accumulate(&self, member: usize, vote_class: usize, combined: &mut [f64]) {
        for (slot, &code) in combined.iter_mut().zip(&self.codes[member]) {
            if code as usize == vote_class {
                *slot += 1.0;
            }
        }
    }
}
