/// Index of the largest finite value; ties go to the first index.
pub fn max_index(values: &[f64]) -> Option<usize> {
    let mut best = None;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &x) in values.iter().enumerate() {
        if !x.is_finite() {
            continue;
        }
        if best.is_none() || x > best_value {
            best = Some(i);
            best_value = x;
        }
    }
    best
}

/// Divides `values` by their sum in place. Returns `false` and leaves the
/// slice untouched when the sum is not positive.
pub fn normalize_l1(values: &mut [f64]) -> bool {
    let sum: f64 = values.iter().sum();
    if sum.is_nan() || sum <= 0.0 {
        return false;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
    true
}

/// Adds `other` into `acc` element-wise, growing `acc` as needed.
pub fn add_values(acc: &mut Vec<f64>, other: &[f64]) {
    if other.len() > acc.len() {
        acc.resize(other.len(), 0.0);
    }
    for (a, b) in acc.iter_mut().zip(other) {
        *a += *b;
    }
}
