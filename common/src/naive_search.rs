//! A module for the brute-force search: apply the routine to every digit multiset.
//!
//! Every multiset of `length` digits is tried, so the cost grows like
//! `C(length + base - 1, length)`. It exists to check the pruned generator against and to
//! answer small questions without trusting any of the pruning.

use crate::generator::{Collector, SearchStats};
use crate::routine::{is_fixed_point, kaprekar_step};
use itertools::Itertools;
use log::trace;

/// Pass every fixed point with `length` digits to the collector, most significant digit
/// first. Multisets are visited in lexicographic order of their ascending digits.
///
/// # Panics
/// Panics if the base is less than 2 or the length is zero.
pub fn naive_search<C>(length: usize, base: u32, collector: &mut C) -> SearchStats
where
    C: Collector + ?Sized,
{
    assert!(base >= 2, "Base must be at least 2, got {base}");
    assert!(length > 0, "Length must be at least 1");

    let mut stats = SearchStats::default();
    for digits in (0..base).combinations_with_replacement(length) {
        stats.distributions_built += 1;
        if length > 1 && digits.iter().all_equal() {
            stats.rejected_uniform += 1;
            continue;
        }
        if !is_fixed_point(&digits, base) {
            stats.rejected_filter += 1;
            continue;
        }
        trace!("Naive search found multiset {digits:?}");
        stats.accepted += 1;
        collector.collect(kaprekar_step(&digits, base));
    }
    stats
}

/// Collect every fixed point with `length` digits into a list.
#[must_use]
pub fn naive_fixed_points(length: usize, base: u32) -> Vec<Vec<u32>> {
    let mut results = Vec::new();
    naive_search(length, base, &mut |digits: Vec<u32>| results.push(digits));
    results
}
