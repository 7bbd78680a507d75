use crate::drift::DriftMonitor;
use std::collections::VecDeque;

const CLOCK: u64 = 32;
const MAX_BUCKETS: usize = 5;
const MIN_WINDOW_LENGTH: usize = 5;
const MIN_WIDTH_TO_CHECK: usize = 10;

/// Summary of `2^row` consecutive observations.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    total: f64,
    /// Sum of squared deviations from the bucket mean.
    variance: f64,
}

fn bucket_size(row: usize) -> usize {
    1 << row
}

/// ADWIN adaptive windowing estimator over an exponential histogram.
///
/// Row `i` holds at most [`MAX_BUCKETS`] buckets of `2^i` observations,
/// oldest at the front. When a row overflows its two oldest buckets merge
/// into the next row, so a window of width `W` is kept in `O(log W)` buckets.
///
/// Every [`CLOCK`] observations (once the window is wider than
/// [`MIN_WIDTH_TO_CHECK`]) each bucket boundary is tested as a split into an
/// older and a newer sub-window. While some split shows a mean difference
/// above the Hoeffding-style bound the oldest bucket is dropped. Both
/// sub-windows must hold at least [`MIN_WINDOW_LENGTH`] observations.
#[derive(Debug, Clone)]
pub struct Adwin {
    delta: f64,
    rows: Vec<VecDeque<Bucket>>,
    width: usize,
    total: f64,
    variance: f64,
    ticks: u64,
    detections: u64,
}

impl Adwin {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            rows: Vec::new(),
            width: 0,
            total: 0.0,
            variance: 0.0,
            ticks: 0,
            detections: 0,
        }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// How many times the window has shrunk.
    pub fn detections(&self) -> u64 {
        self.detections
    }

    /// Number of buckets currently stored.
    pub fn buckets(&self) -> usize {
        self.rows.iter().map(VecDeque::len).sum()
    }

    /// Adds a real-valued observation; returns `true` if the window shrank.
    pub fn add(&mut self, value: f64) -> bool {
        self.insert(value);
        self.ticks += 1;

        if self.ticks % CLOCK != 0 || self.width <= MIN_WIDTH_TO_CHECK {
            return false;
        }

        let mut shrank = false;
        while self.cut_found() {
            self.drop_oldest_bucket();
            shrank = true;
        }
        if shrank {
            self.detections += 1;
        }
        shrank
    }

    /// Population variance of the window.
    pub fn variance(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.variance / self.width as f64
        }
    }

    fn insert(&mut self, value: f64) {
        self.width += 1;
        if self.width > 1 {
            let previous = (self.width - 1) as f64;
            let diff = value - self.total / previous;
            self.variance += previous * diff * diff / self.width as f64;
        }
        self.total += value;

        if self.rows.is_empty() {
            self.rows.push(VecDeque::with_capacity(MAX_BUCKETS + 1));
        }
        self.rows[0].push_back(Bucket {
            total: value,
            variance: 0.0,
        });
        self.compress();
    }

    fn compress(&mut self) {
        let mut row = 0;
        while row < self.rows.len() && self.rows[row].len() > MAX_BUCKETS {
            let (Some(older), Some(newer)) = (self.rows[row].pop_front(), self.rows[row].pop_front())
            else {
                break;
            };
            let n = bucket_size(row) as f64;
            let diff = older.total / n - newer.total / n;
            let merged = Bucket {
                total: older.total + newer.total,
                variance: older.variance + newer.variance + n * n * diff * diff / (2.0 * n),
            };
            if row + 1 == self.rows.len() {
                self.rows.push(VecDeque::with_capacity(MAX_BUCKETS + 1));
            }
            self.rows[row + 1].push_back(merged);
            row += 1;
        }
    }

    fn drop_oldest_bucket(&mut self) {
        let Some(last) = self.rows.len().checked_sub(1) else {
            return;
        };
        let Some(bucket) = self.rows[last].pop_front() else {
            return;
        };
        if self.rows[last].is_empty() {
            self.rows.pop();
        }

        let n = bucket_size(last);
        self.width -= n;
        self.total -= bucket.total;
        if self.width == 0 {
            self.total = 0.0;
            self.variance = 0.0;
            return;
        }
        let (n, w) = (n as f64, self.width as f64);
        let diff = bucket.total / n - self.total / w;
        self.variance -= bucket.variance + n * w * diff * diff / (n + w);
        self.variance = self.variance.max(0.0);
    }

    fn cut_found(&self) -> bool {
        if self.width <= 2 * MIN_WINDOW_LENGTH {
            return false;
        }
        let n = self.width as f64;
        let variance = self.variance();
        let dd = (2.0 * n.ln() / self.delta).ln();

        let mut n0 = 0usize;
        let mut u0 = 0.0;
        for (row, buckets) in self.rows.iter().enumerate().rev() {
            for bucket in buckets {
                n0 += bucket_size(row);
                u0 += bucket.total;
                let n1 = self.width - n0;
                if n1 < MIN_WINDOW_LENGTH {
                    return false;
                }
                if n0 < MIN_WINDOW_LENGTH {
                    continue;
                }
                let u1 = self.total - u0;
                let diff = u0 / n0 as f64 - u1 / n1 as f64;
                if diff.abs() > self.bound(n0, n1, variance, dd) {
                    return true;
                }
            }
        }
        false
    }

    fn bound(&self, n0: usize, n1: usize, variance: f64, dd: f64) -> f64 {
        let m = 1.0 / (n0 - MIN_WINDOW_LENGTH + 1) as f64 + 1.0 / (n1 - MIN_WINDOW_LENGTH + 1) as f64;
        (2.0 * m * variance * dd).sqrt() + 2.0 / 3.0 * dd * m
    }
}

impl DriftMonitor for Adwin {
    fn with_confidence(delta: f64) -> Self {
        Adwin::new(delta)
    }

    fn observe(&mut self, misclassified: bool) -> bool {
        self.add(if misclassified { 1.0 } else { 0.0 })
    }

    fn estimate(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.total / self.width as f64
        }
    }

    fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_monitor_is_empty() {
        let a = Adwin::with_confidence(0.002);
        assert_eq!(a.estimate(), 0.0);
        assert_eq!(a.width(), 0);
        assert_eq!(a.delta(), 0.002);
    }

    #[test]
    fn stationary_input_never_shrinks() {
        let mut a = Adwin::new(0.002);
        for i in 0..2_000 {
            assert!(!a.observe(i % 4 == 0), "shrank at {i}");
        }
        assert_eq!(a.width(), 2_000);
        assert!((a.estimate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn no_check_between_clock_ticks() {
        let mut a = Adwin::new(0.9);
        for _ in 0..20 {
            a.observe(false);
        }
        for i in 20..(CLOCK as usize - 1) {
            assert!(!a.observe(true), "shrank at {i}");
        }
    }

    #[test]
    fn abrupt_increase_shrinks_window_and_raises_estimate() {
        let mut a = Adwin::new(0.002);
        for _ in 0..500 {
            a.observe(false);
        }
        let before = a.estimate();
        let mut shrank_at = None;
        for i in 0..200 {
            if a.observe(true) {
                shrank_at = Some(i);
                break;
            }
        }
        let at = shrank_at.expect("change should be detected");
        assert!(at < 100, "detected too late: {at}");
        assert!(a.estimate() > before);
        assert!(a.width() < 500);
        assert_eq!(a.detections(), 1);
    }

    #[test]
    fn abrupt_decrease_also_shrinks() {
        let mut a = Adwin::new(0.002);
        for _ in 0..500 {
            a.observe(true);
        }
        let mut shrank = false;
        for _ in 0..200 {
            shrank |= a.observe(false);
        }
        assert!(shrank);
        assert!(a.estimate() < 1.0);
    }

    #[test]
    fn long_stationary_stream_keeps_few_buckets() {
        let mut a = Adwin::new(0.002);
        for i in 0..1_000_000 {
            assert!(!a.observe(i % 4 == 0), "shrank at {i}");
        }
        assert_eq!(a.width(), 1_000_000);
        assert_eq!(a.detections(), 0);
        assert!((a.estimate() - 0.25).abs() < 1e-9);
        assert!((a.variance() - 0.1875).abs() < 1e-6, "variance = {}", a.variance());
        // 2^20 > 10^6, so at most 20 rows
        assert!(a.buckets() <= MAX_BUCKETS * 20, "buckets = {}", a.buckets());
    }

    #[test]
    fn rows_hold_at_most_max_buckets_and_sum_to_width() {
        let mut a = Adwin::new(0.002);
        for i in 0..777 {
            a.add((i % 3) as f64);
            assert!(a.rows.iter().all(|r| r.len() <= MAX_BUCKETS));
            let covered: usize = a
                .rows
                .iter()
                .enumerate()
                .map(|(row, buckets)| bucket_size(row) * buckets.len())
                .sum();
            assert_eq!(covered, a.width());
        }
        let totals: f64 = a.rows.iter().flatten().map(|b| b.total).sum();
        assert_eq!(totals, a.total);
    }
}
