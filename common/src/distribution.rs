//! A module holding the digit-frequency form of a candidate and the max-minus-min subtraction.
//!
//! A candidate never stores its digits, only how often each digit of the base occurs. That is
//! enough to subtract the ascending arrangement from the descending one: the digits of both
//! arrangements are read off the two ends of the sorted digit range, so the difference comes
//! out as a handful of runs instead of one digit at a time.
//!
//! ## How It Works
//!
//! Two cursors walk the sorted digits, one down from the largest digit present (the
//! descending arrangement) and one up from the smallest (the ascending arrangement). Reading
//! positions from the least significant end:
//!
//! 1. The first position has no incoming borrow. `low - high` is negative unless the candidate
//!    is a single digit, so it borrows and yields `low - high + base`.
//! 2. While the cursors have not crossed, every position borrows and passes the borrow on,
//!    yielding `low - high - 1 + base` for as long as neither cursor leaves its current digit.
//! 3. The position where the cursors cross consumes the borrow: `low - high - 1`.
//! 4. The remaining positions are borrow free: `low - high`.
//!
//! For 954 - 459 in base 10 this gives the runs 5, 9, 4 (least significant first), i.e. 495.

use crate::routine::digit_char;
use std::fmt;

/// A span of equal digits in the difference. Adjacent runs may carry the same digit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Run {
    /// Index of the first digit of the run, counted from the least significant digit.
    pub position: usize,
    /// The digit repeated over the whole run.
    pub digit: u32,
    /// Number of positions covered by the run.
    pub count: usize,
}

/// How many times each digit of a base occurs in a multiset of digits.
///
/// The total length and the number of distinct digits are kept up to date on every change so
/// the search never has to rescan the frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDistribution {
    base: u32,
    frequency: Vec<usize>,
    length: usize,
    distinct_digits: usize,
    outer_digits: Option<(u32, u32)>,
}

impl CandidateDistribution {
    /// Create an empty distribution for a base.
    ///
    /// # Panics
    /// Panics if the base is less than 2.
    #[must_use]
    pub fn new(base: u32) -> Self {
        assert!(base >= 2, "Base must be at least 2, got {base}");
        Self {
            base,
            frequency: vec![0; base as usize],
            length: 0,
            distinct_digits: 0,
            outer_digits: None,
        }
    }

    /// Build a distribution by counting a list of digits.
    ///
    /// # Panics
    /// Panics if the base is less than 2 or any digit is out of range.
    #[must_use]
    pub fn from_digits(base: u32, digits: &[u32]) -> Self {
        let mut distribution = Self::new(base);
        for &digit in digits {
            distribution.increment(digit, 1);
        }
        distribution
    }

    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// The number of digits in the multiset (sum of all frequencies).
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The number of digits that occur at least once.
    #[must_use]
    pub fn distinct_digits(&self) -> usize {
        self.distinct_digits
    }

    /// How many times a digit occurs.
    ///
    /// # Panics
    /// Panics if the digit is out of range for the base.
    #[must_use]
    pub fn frequency(&self, digit: u32) -> usize {
        self.check_digit(digit);
        self.frequency[digit as usize]
    }

    /// The full frequency table, indexed by digit.
    #[must_use]
    pub fn frequencies(&self) -> &[usize] {
        &self.frequency
    }

    #[must_use]
    pub fn outer_digits(&self) -> Option<(u32, u32)> {
        self.outer_digits
    }

    fn check_digit(&self, digit: u32) {
        assert!(
            digit < self.base,
            "Digit {digit} is out of range for base {}",
            self.base
        );
    }

    /// Add `by` occurrences of a digit and return its new frequency.
    ///
    /// # Panics
    /// Panics if the digit is out of range for the base.
    pub fn increment(&mut self, digit: u32, by: usize) -> usize {
        self.check_digit(digit);
        let slot = &mut self.frequency[digit as usize];
        if by > 0 {
            if *slot == 0 {
                self.distinct_digits += 1;
            }
            *slot += by;
            self.length += by;
        }
        *slot
    }

    /// Remove `by` occurrences of a digit and return its new frequency.
    ///
    /// # Panics
    /// Panics if the digit is out of range or occurs fewer than `by` times.
    pub fn decrement(&mut self, digit: u32, by: usize) -> usize {
        self.check_digit(digit);
        let slot = &mut self.frequency[digit as usize];
        assert!(
            by <= *slot,
            "Cannot remove {by} occurrences of digit {digit}, only {} present",
            *slot
        );
        if by > 0 {
            *slot -= by;
            self.length -= by;
            if *slot == 0 {
                self.distinct_digits -= 1;
            }
        }
        *slot
    }

    /// Set the frequency of a digit, adjusting the counters by the difference.
    ///
    /// # Panics
    /// Panics if the digit is out of range for the base.
    pub fn set_frequency(&mut self, digit: u32, value: usize) -> usize {
        let current = self.frequency(digit);
        if value > current {
            self.increment(digit, value - current)
        } else {
            self.decrement(digit, current - value)
        }
    }

    /// Record the pair of digits the least significant digit of the difference must match.
    /// Any other leading digit makes [`Self::subtract_max_min`] abort right after the first run.
    ///
    /// # Panics
    /// Panics unless `0 < digit1 < base` and `digit1 + digit2 == base`.
    pub fn set_outer_digits(&mut self, digit1: u32, digit2: u32) {
        assert!(
            digit1 > 0 && digit1 < self.base && digit1 + digit2 == self.base,
            "Outer digits ({digit1}, {digit2}) must be nonzero and sum to base {}",
            self.base
        );
        self.outer_digits = Some((digit1, digit2));
    }

    pub fn clear_outer_digits(&mut self) {
        self.outer_digits = None;
    }

    /// Compute (descending arrangement) - (ascending arrangement) of the digits and hand the
    /// result to `handler` run by run, least significant position first.
    ///
    /// The handler returns `false` to stop the computation. Returns `true` if every run was
    /// delivered, `false` if the handler or the outer digit check stopped it early.
    ///
    /// # Panics
    /// Panics if the distribution is empty. A distribution longer than one digit must contain
    /// at least two distinct digits.
    pub fn subtract_max_min<F>(&self, mut handler: F) -> bool
    where
        F: FnMut(Run) -> bool,
    {
        assert!(self.length > 0, "Cannot subtract an empty distribution");
        debug_assert!(
            self.length == 1 || self.distinct_digits > 1,
            "A repeated single digit has no difference to subtract"
        );

        let mut high = Cursor::new(&self.frequency, Direction::Down);
        let mut low = Cursor::new(&self.frequency, Direction::Up);

        // First position, no borrow coming in
        let spread = high.digit - low.digit;
        if spread == 0 {
            debug_assert_eq!(self.length, 1);
            return handler(Run {
                position: 0,
                digit: 0,
                count: 1,
            });
        }
        let digit = self.base - spread;
        if !handler(Run {
            position: 0,
            digit,
            count: 1,
        }) {
            return false;
        }
        if let Some((outer1, outer2)) = self.outer_digits
            && digit != outer1
            && digit != outer2
        {
            return false;
        }

        // Borrow in, borrow out until the cursors cross
        let mut position = 1;
        high.advance(&self.frequency, 1);
        low.advance(&self.frequency, 1);
        while low.digit <= high.digit {
            let count = high.remaining().min(low.remaining());
            debug_assert!(count > 0);
            let digit = self.base - 1 - (high.digit - low.digit);
            if !handler(Run {
                position,
                digit,
                count,
            }) {
                return false;
            }
            high.advance(&self.frequency, count);
            low.advance(&self.frequency, count);
            position += count;
        }

        // The crossing position settles the borrow
        let digit = low.digit - high.digit - 1;
        if !handler(Run {
            position,
            digit,
            count: 1,
        }) {
            return false;
        }
        position += 1;
        if position == self.length {
            return true;
        }
        high.advance(&self.frequency, 1);
        low.advance(&self.frequency, 1);

        // No borrow for the rest
        loop {
            let count = high.remaining().min(low.remaining());
            debug_assert!(count > 0);
            let digit = low.digit - high.digit;
            if !handler(Run {
                position,
                digit,
                count,
            }) {
                return false;
            }
            position += count;
            if position == self.length {
                return true;
            }
            debug_assert!(position < self.length);
            high.advance(&self.frequency, count);
            low.advance(&self.frequency, count);
        }
    }
}

impl fmt::Display for CandidateDistribution {
    /// Digits in ascending order, e.g. `1467` for the distribution of 6174.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (digit, &count) in (0u32..).zip(&self.frequency) {
            for _ in 0..count {
                write!(f, "{}", digit_char(digit))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
enum Direction {
    Down,
    Up,
}

/// A position in the sorted digits: the current digit and how much of its quota is used.
#[derive(Debug)]
struct Cursor {
    digit: u32,
    taken: usize,
    quota: usize,
    direction: Direction,
}

impl Cursor {
    /// Start at the largest (`Down`) or smallest (`Up`) digit present.
    /// The frequency table must not be all zeros.
    fn new(frequency: &[usize], direction: Direction) -> Self {
        let digit = match direction {
            Direction::Down => frequency.len() as u32 - 1,
            Direction::Up => 0,
        };
        let mut cursor = Self {
            digit,
            taken: 0,
            quota: 0,
            direction,
        };
        cursor.settle(frequency);
        cursor
    }

    fn step(&mut self) {
        match self.direction {
            Direction::Down => self.digit -= 1,
            Direction::Up => self.digit += 1,
        }
    }

    /// Move onto the nearest digit present, starting from the current one.
    fn settle(&mut self, frequency: &[usize]) {
        while frequency[self.digit as usize] == 0 {
            self.step();
        }
        self.taken = 0;
        self.quota = frequency[self.digit as usize];
    }

    fn advance(&mut self, frequency: &[usize], count: usize) {
        self.taken += count;
        if self.taken >= self.quota {
            self.step();
            self.settle(frequency);
        }
    }

    fn remaining(&self) -> usize {
        self.quota - self.taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs_of(distribution: &CandidateDistribution) -> (bool, Vec<Run>) {
        let mut runs = Vec::new();
        let finished = distribution.subtract_max_min(|run| {
            runs.push(run);
            true
        });
        (finished, runs)
    }

    fn run(position: usize, digit: u32, count: usize) -> Run {
        Run {
            position,
            digit,
            count,
        }
    }

    #[test_log::test]
    fn test_counters_follow_changes() {
        let mut distribution = CandidateDistribution::new(10);
        assert!(distribution.is_empty());
        assert_eq!(distribution.distinct_digits(), 0);

        assert_eq!(distribution.increment(7, 1), 1);
        assert_eq!(distribution.increment(7, 2), 3);
        assert_eq!(distribution.increment(0, 1), 1);
        assert_eq!(distribution.len(), 4);
        assert_eq!(distribution.distinct_digits(), 2);

        assert_eq!(distribution.decrement(7, 3), 0);
        assert_eq!(distribution.len(), 1);
        assert_eq!(distribution.distinct_digits(), 1);

        // Zero-sized changes leave everything alone
        assert_eq!(distribution.increment(4, 0), 0);
        assert_eq!(distribution.decrement(0, 0), 1);
        assert_eq!(distribution.len(), 1);
        assert_eq!(distribution.distinct_digits(), 1);
    }

    #[test_log::test]
    fn test_counters_match_table_over_walk() {
        let mut distribution = CandidateDistribution::new(7);
        // A fixed walk of increments and decrements across all digits
        for step in 0u32..200 {
            let digit = (step * 5 + 3) % 7;
            if step % 3 == 2 && distribution.frequency(digit) > 0 {
                distribution.decrement(digit, 1);
            } else {
                distribution.increment(digit, (step % 4) as usize);
            }
            let table = distribution.frequencies();
            assert_eq!(distribution.len(), table.iter().sum::<usize>());
            assert_eq!(
                distribution.distinct_digits(),
                table.iter().filter(|&&count| count > 0).count()
            );
        }
    }

    #[test_log::test]
    fn test_set_frequency() {
        let mut distribution = CandidateDistribution::new(10);
        assert_eq!(distribution.set_frequency(3, 4), 4);
        assert_eq!(distribution.set_frequency(3, 1), 1);
        assert_eq!(distribution.set_frequency(5, 2), 2);
        assert_eq!(distribution.len(), 3);
        assert_eq!(distribution.distinct_digits(), 2);
        assert_eq!(distribution.set_frequency(3, 0), 0);
        assert_eq!(distribution.distinct_digits(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_digit_out_of_range() {
        let mut distribution = CandidateDistribution::new(10);
        distribution.increment(10, 1);
    }

    #[test]
    #[should_panic(expected = "Cannot remove")]
    fn test_decrement_below_zero() {
        let mut distribution = CandidateDistribution::new(10);
        distribution.increment(2, 1);
        distribution.decrement(2, 2);
    }

    #[test]
    #[should_panic(expected = "at least 2")]
    fn test_base_too_small() {
        let _ = CandidateDistribution::new(1);
    }

    #[test]
    #[should_panic(expected = "sum to base")]
    fn test_outer_digits_must_sum_to_base() {
        let mut distribution = CandidateDistribution::new(10);
        distribution.set_outer_digits(3, 6);
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn test_subtract_empty() {
        let distribution = CandidateDistribution::new(10);
        distribution.subtract_max_min(|_| true);
    }

    #[test_log::test]
    fn test_outer_digits_set_and_clear() {
        let mut distribution = CandidateDistribution::new(10);
        assert_eq!(distribution.outer_digits(), None);
        distribution.set_outer_digits(4, 6);
        assert_eq!(distribution.outer_digits(), Some((4, 6)));
        distribution.clear_outer_digits();
        assert_eq!(distribution.outer_digits(), None);
    }

    #[test_log::test]
    fn test_subtract_single_digit() {
        let distribution = CandidateDistribution::from_digits(10, &[7]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(runs, vec![run(0, 0, 1)]);
    }

    #[test_log::test]
    fn test_subtract_495() {
        // 954 - 459 = 495
        let distribution = CandidateDistribution::from_digits(10, &[4, 9, 5]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(runs, vec![run(0, 5, 1), run(1, 9, 1), run(2, 4, 1)]);
    }

    #[test_log::test]
    fn test_subtract_6174() {
        // 7641 - 1467 = 6174
        let distribution = CandidateDistribution::from_digits(10, &[6, 1, 7, 4]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(
            runs,
            vec![run(0, 4, 1), run(1, 7, 1), run(2, 1, 1), run(3, 6, 1)]
        );
    }

    #[test_log::test]
    fn test_subtract_long_runs() {
        // 95551 - 15559 = 79992
        let distribution = CandidateDistribution::from_digits(10, &[1, 5, 5, 5, 9]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(runs, vec![run(0, 2, 1), run(1, 9, 3), run(4, 7, 1)]);
    }

    #[test_log::test]
    fn test_subtract_repeated_minimum() {
        // 9333 - 3339 = 5994
        let distribution = CandidateDistribution::from_digits(10, &[3, 3, 3, 9]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(runs, vec![run(0, 4, 1), run(1, 9, 2), run(3, 5, 1)]);
    }

    #[test_log::test]
    fn test_subtract_base_two() {
        // 1100 - 0011 = 1001 in base 2. Runs split where either cursor changes digit, so
        // the two zeros come out separately.
        let distribution = CandidateDistribution::from_digits(2, &[0, 0, 1, 1]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        assert_eq!(
            runs,
            vec![run(0, 1, 1), run(1, 0, 1), run(2, 0, 1), run(3, 1, 1)]
        );
    }

    #[test_log::test]
    fn test_runs_cover_every_position() {
        let distribution = CandidateDistribution::from_digits(16, &[0, 3, 3, 8, 8, 8, 15, 12, 1]);
        let (finished, runs) = runs_of(&distribution);
        assert!(finished);
        let mut next = 0;
        for run in runs {
            assert_eq!(run.position, next);
            assert!(run.count > 0);
            assert!(run.digit < 16);
            next += run.count;
        }
        assert_eq!(next, distribution.len());
    }

    #[test_log::test]
    fn test_handler_abort_stops_immediately() {
        let distribution = CandidateDistribution::from_digits(10, &[6, 1, 7, 4]);
        let mut calls = 0;
        let finished = distribution.subtract_max_min(|_| {
            calls += 1;
            calls < 2
        });
        assert!(!finished);
        assert_eq!(calls, 2);
    }

    #[test_log::test]
    fn test_outer_digits_reject_leading_digit() {
        let mut distribution = CandidateDistribution::from_digits(10, &[6, 1, 7, 4]);

        // Least significant digit of 6174 is 4, which is part of (4, 6)
        distribution.set_outer_digits(4, 6);
        assert!(runs_of(&distribution).0);

        // ... but not of (3, 7), so only the first run gets out
        distribution.set_outer_digits(3, 7);
        let (finished, runs) = runs_of(&distribution);
        assert!(!finished);
        assert_eq!(runs, vec![run(0, 4, 1)]);
    }

    #[test_log::test]
    fn test_display_ascending() {
        let distribution = CandidateDistribution::from_digits(16, &[6, 1, 15, 10, 4]);
        assert_eq!(distribution.to_string(), "146AF");
    }
}
