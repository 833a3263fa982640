//! Adaptive intensity thresholds.
//!
//! Cut points follow the distribution of the window's own non-zero values,
//! so light and heavy users both get a usable spread of colors.

use std::fmt;


/// Thresholds used when the window has no usage at all.
pub const DEFAULT_THRESHOLDS: [u64; 4] = [1, 10, 100, 1000];

const QUANTILES: [f64; 4] = [0.25, 0.50, 0.75, 1.0];


/// Five ordinal color buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Intensity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Max,
}


impl Intensity {
    pub const ALL: [Intensity; 5] = [
        Intensity::None,
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::Max,
    ];

    /// Palette slot, 0..=4.
    pub fn level(&self) -> usize {
        *self as usize
    }
}


/// Four non-decreasing cut points, each at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds([u64; 4]);


impl Default for Thresholds {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS)
    }
}


impl Thresholds {
    pub fn values(&self) -> &[u64; 4] {
        &self.0
    }

    /// Map a day's value to its bucket.
    ///
    /// Zero, negative and NaN values are all "no usage".
    pub fn classify(&self, value: f64) -> Intensity {
        if value.is_nan() || value <= 0.0 {
            return Intensity::None;
        }

        let [t0, t1, t2, _] = self.0;
        if value <= t0 as f64 {
            Intensity::Low
        } else if value <= t1 as f64 {
            Intensity::Medium
        } else if value <= t2 as f64 {
            Intensity::High
        } else {
            Intensity::Max
        }
    }
}


impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}


/// Linear-interpolated quantile over ascending-sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}


/// Compute thresholds from every value in the window.
pub fn compute_thresholds(values: &[f64]) -> Thresholds {
    let mut positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return Thresholds::default();
    }
    positive.sort_by(f64::total_cmp);

    let mut cuts: Vec<u64> = Vec::with_capacity(4);
    for q in QUANTILES {
        let cut = quantile(&positive, q).ceil().max(1.0) as u64;
        if !cuts.contains(&cut) {
            cuts.push(cut);
        }
    }
    cuts.sort_unstable();

    while cuts.len() < 4 {
        let next = cuts.last().map_or(1, |last| last.saturating_mul(2));
        cuts.push(next);
    }
    cuts.truncate(4);

    Thresholds([cuts[0], cuts[1], cuts[2], cuts[3]])
}


#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(th: &Thresholds) {
        let v = th.values();
        assert!(v.iter().all(|t| *t >= 1), "{th}");
        assert!(v.windows(2).all(|w| w[0] <= w[1]), "{th}");
    }

    #[test]
    fn test_defaults_without_usage() {
        assert_eq!(compute_thresholds(&[]).values(), &DEFAULT_THRESHOLDS);
        assert_eq!(compute_thresholds(&[0.0, 0.0, 0.0]).values(), &DEFAULT_THRESHOLDS);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&sorted, 0.0), 10.0);
        assert_eq!(quantile(&sorted, 1.0), 40.0);
        assert!((quantile(&sorted, 0.25) - 17.5).abs() < 1e-9);
        assert!((quantile(&sorted, 0.5) - 25.0).abs() < 1e-9);
        assert_eq!(quantile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_thresholds_from_spread() {
        let th = compute_thresholds(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(th.values(), &[18, 25, 33, 40]);
    }

    #[test]
    fn test_single_value_pads_by_doubling() {
        let th = compute_thresholds(&[500.0]);
        assert_eq!(th.values(), &[500, 1000, 2000, 4000]);
    }

    #[test]
    fn test_huge_values_saturate() {
        let th = compute_thresholds(&[1.0e19]);
        assert_eq!(th.values()[0], 10_000_000_000_000_000_000);
        assert_eq!(th.values()[3], u64::MAX);
        assert!(th.values().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_fractional_values_round_up_and_floor_at_one() {
        let th = compute_thresholds(&[0.01, 0.02]);
        assert_eq!(th.values(), &[1, 2, 4, 8]);
        assert_well_formed(&th);
    }

    #[test]
    fn test_always_well_formed() {
        let samples: [&[f64]; 5] = [
            &[1.0],
            &[3.0, 3.0, 3.0],
            &[1.0, 1_000_000.0],
            &[0.5, 7.25, 7.25, 99.0, 12_345.6],
            &[-5.0, 2.0],
        ];
        for values in samples {
            let th = compute_thresholds(values);
            assert_eq!(th.values().len(), 4);
            assert_well_formed(&th);
        }
    }

    #[test]
    fn test_deterministic_for_same_multiset() {
        let a = compute_thresholds(&[5.0, 1.0, 9.0, 3.0]);
        let b = compute_thresholds(&[9.0, 3.0, 5.0, 1.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_classify_buckets() {
        let th = Thresholds([10, 20, 30, 40]);
        assert_eq!(th.classify(0.0), Intensity::None);
        assert_eq!(th.classify(f64::NAN), Intensity::None);
        assert_eq!(th.classify(-3.0), Intensity::None);
        assert_eq!(th.classify(0.5), Intensity::Low);
        assert_eq!(th.classify(10.0), Intensity::Low);
        assert_eq!(th.classify(10.5), Intensity::Medium);
        assert_eq!(th.classify(30.0), Intensity::High);
        assert_eq!(th.classify(31.0), Intensity::Max);
        assert_eq!(th.classify(1e12), Intensity::Max);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let th = compute_thresholds(&[3.0, 70.0, 900.0, 4_000.0]);
        let mut previous = Intensity::None;
        for step in 0..6_000 {
            let level = th.classify(step as f64);
            assert!(level >= previous, "dropped at {step}");
            previous = level;
        }
    }
}
