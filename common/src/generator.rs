//! A module that searches for fixed points of the Kaprekar routine in a base.
//!
//! Rather than walking every L-digit string, the search walks digit distributions and only
//! builds those the subtraction could possibly map onto themselves:
//!
//! 1. Digits are added in complementary pairs `d` and `base - 1 - d` with equal frequency,
//!    plus an extra frequency on `base - 1` to fix the parity of the length.
//! 2. From length 4 upwards (and in bases above 2), every fixed point also holds one "outer"
//!    pair summing to `base` and one "compensation" pair summing to `base - 2`. The outer loop
//!    fixes these first, and the outer pair doubles as a hint that lets the subtraction bail
//!    out after its first digit.
//! 3. Each complete distribution is subtracted once with a filter that aborts as soon as some
//!    digit appears more often in the difference than in the candidate. Survivors are
//!    subtracted again to write out the actual digits.
//!
//! The recursion depth is bounded by `base / 2`, regardless of the length.

use crate::distribution::CandidateDistribution;
use crate::routine::to_digit_string;
use log::{debug, trace};
use serde::Serialize;

/// Receives each fixed point found, most significant digit first.
pub trait Collector {
    fn collect(&mut self, digits: Vec<u32>);
}

impl<F> Collector for F
where
    F: FnMut(Vec<u32>),
{
    fn collect(&mut self, digits: Vec<u32>) {
        self(digits);
    }
}

/// Statistics tracking for one search.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Complete distributions handed to the check
    pub distributions_built: u64,

    /// Distributions skipped for being a single repeated digit
    pub rejected_uniform: u64,

    /// Distributions dropped by the filtered subtraction
    pub rejected_filter: u64,

    /// Fixed points passed to the collector
    pub accepted: u64,
}

impl SearchStats {
    pub fn log_summary(&self, base: u32, length: usize) {
        #[allow(clippy::cast_precision_loss)]
        let accept_rate = if self.distributions_built > 0 {
            (self.accepted as f64 / self.distributions_built as f64) * 100.0
        } else {
            0.0
        };

        debug!(
            "Search stats for base {} length {}: built={}, uniform={}, filtered={}, accepted={} ({:.3}%)",
            base,
            length,
            self.distributions_built,
            self.rejected_uniform,
            self.rejected_filter,
            self.accepted,
            accept_rate
        );
    }
}

/// Check if a candidate's difference uses each digit no more often than the candidate does.
/// Once the difference is complete the lengths match, so this is multiset equality.
#[must_use]
pub fn passes_filter(candidate: &CandidateDistribution) -> bool {
    let mut seen = CandidateDistribution::new(candidate.base());
    candidate.subtract_max_min(|run| {
        seen.increment(run.digit, run.count) <= candidate.frequency(run.digit)
    })
}

/// Write out the difference of a candidate, most significant digit first.
#[must_use]
pub fn materialize(candidate: &CandidateDistribution) -> Vec<u32> {
    let length = candidate.len();
    let mut digits = vec![0; length];
    candidate.subtract_max_min(|run| {
        let end = length - run.position;
        digits[end - run.count..end].fill(run.digit);
        true
    });
    digits
}

/// Generates all Kaprekar fixed points of a given length in one base.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Generator {
    base: u32,
}

impl Generator {
    /// # Panics
    /// Panics if the base is less than 2.
    #[must_use]
    pub fn new(base: u32) -> Self {
        assert!(base >= 2, "Base must be at least 2, got {base}");
        Self { base }
    }

    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Find every fixed point with `length` digits and pass each one to the collector.
    /// Results come out in the same order on every call.
    ///
    /// # Panics
    /// Panics if the length is zero.
    pub fn generate<C>(&self, length: usize, collector: &mut C) -> SearchStats
    where
        C: Collector + ?Sized,
    {
        assert!(length > 0, "Length must be at least 1");

        let base = self.base;
        let mut search = Search {
            base,
            length,
            collector,
            stats: SearchStats::default(),
        };
        let mut candidate = CandidateDistribution::new(base);

        if length == 1 {
            // Only base candidates, just try them all
            for digit in 0..base {
                candidate.increment(digit, 1);
                search.calculate(&candidate);
                candidate.decrement(digit, 1);
            }
        } else if length < 4 || base == 2 {
            // Too short for an outer and a compensation pair, or only one pair exists
            search.fill(&mut candidate);
        } else {
            let compensation = base - 2;
            for outer1 in 1..=base / 2 {
                let outer2 = base - outer1;
                debug!("Searching base {base} length {length} with outer digits ({outer1}, {outer2})");

                candidate.increment(outer1, 1);
                candidate.increment(outer2, 1);
                candidate.set_outer_digits(outer1, outer2);

                for compensation1 in 0..=compensation / 2 {
                    let compensation2 = compensation - compensation1;

                    candidate.increment(compensation1, 1);
                    candidate.increment(compensation2, 1);

                    search.fill(&mut candidate);

                    candidate.decrement(compensation1, 1);
                    candidate.decrement(compensation2, 1);
                }

                candidate.decrement(outer1, 1);
                candidate.decrement(outer2, 1);
            }
            candidate.clear_outer_digits();
        }

        debug_assert!(candidate.is_empty());
        search.stats
    }
}

/// State of a single `generate` call.
struct Search<'a, C: Collector + ?Sized> {
    base: u32,
    length: usize,
    collector: &'a mut C,
    stats: SearchStats,
}

impl<C: Collector + ?Sized> Search<'_, C> {
    /// Fill the rest of the length: first the top digit with the right parity, then pairs.
    fn fill(&mut self, candidate: &mut CandidateDistribution) {
        let top = self.base - 1;
        let rest = self.length - candidate.len();

        for frequency in ((rest & 1)..=rest).step_by(2) {
            candidate.increment(top, frequency);
            self.fill_pairs(candidate, 0);
            candidate.decrement(top, frequency);
        }
    }

    /// Give `low` and its complement the same frequency, then move inwards.
    /// The innermost pair takes whatever is left.
    fn fill_pairs(&mut self, candidate: &mut CandidateDistribution, low: u32) {
        let high = self.base - 1 - low;
        debug_assert!(low <= high);

        let rest = self.length - candidate.len();
        debug_assert_eq!(rest % 2, 0, "Pairs can only fill an even length");

        if low + 2 > high {
            let frequency = rest / 2;
            candidate.increment(low, frequency);
            candidate.increment(high, frequency);

            self.calculate(candidate);

            candidate.decrement(low, frequency);
            candidate.decrement(high, frequency);
        } else {
            for frequency in 0..=rest / 2 {
                candidate.increment(low, frequency);
                candidate.increment(high, frequency);

                self.fill_pairs(candidate, low + 1);

                candidate.decrement(low, frequency);
                candidate.decrement(high, frequency);
            }
        }
    }

    /// Check a complete candidate and emit its difference if it is a fixed point.
    fn calculate(&mut self, candidate: &CandidateDistribution) {
        debug_assert_eq!(candidate.len(), self.length);
        self.stats.distributions_built += 1;

        if self.length > 1 && candidate.distinct_digits() < 2 {
            self.stats.rejected_uniform += 1;
            return;
        }

        if !passes_filter(candidate) {
            self.stats.rejected_filter += 1;
            return;
        }

        let digits = materialize(candidate);
        trace!(
            "Found fixed point {} from distribution {}",
            to_digit_string(&digits),
            candidate
        );
        self.stats.accepted += 1;
        self.collector.collect(digits);
    }
}
