//! A module with a plain, digit-array version of one Kaprekar step and digit formatting.
//!
//! This is the slow, obvious version of what [`crate::distribution`] does on frequency counts.
//! It is used to double check results and as the inner step of the naive search.

use itertools::Itertools;

/// Apply one step of the Kaprekar routine: sort the digits descending and ascending and
/// subtract. The result is zero padded to the input length, most significant digit first.
///
/// # Panics
/// Panics if a digit is not below the base.
#[must_use]
pub fn kaprekar_step(digits: &[u32], base: u32) -> Vec<u32> {
    assert!(
        digits.iter().all(|&digit| digit < base),
        "Digits {digits:?} are not all valid in base {base}"
    );

    let descending: Vec<u32> = digits.iter().copied().sorted_unstable_by(|a, b| b.cmp(a)).collect();
    let ascending: Vec<u32> = descending.iter().rev().copied().collect();

    // Schoolbook subtraction from the least significant end
    let mut difference = vec![0; digits.len()];
    let mut borrow = 0;
    for i in (0..digits.len()).rev() {
        let subtrahend = ascending[i] + borrow;
        if descending[i] >= subtrahend {
            difference[i] = descending[i] - subtrahend;
            borrow = 0;
        } else {
            difference[i] = descending[i] + base - subtrahend;
            borrow = 1;
        }
    }
    debug_assert_eq!(borrow, 0, "Descending arrangement is never below ascending");

    difference
}

/// Check if two digit lists are the same multiset.
#[must_use]
pub fn same_digits(a: &[u32], b: &[u32]) -> bool {
    a.len() == b.len() && a.iter().counts() == b.iter().counts()
}

/// Check if the Kaprekar step maps these digits onto a rearrangement of themselves.
/// A single digit repeated more than once is never counted: its step is all zeros.
#[must_use]
pub fn is_fixed_point(digits: &[u32], base: u32) -> bool {
    if digits.is_empty() || (digits.len() > 1 && digits.iter().all_equal()) {
        return false;
    }
    same_digits(&kaprekar_step(digits, base), digits)
}

/// Render a single digit: 0-9 as themselves, 10 and above as letters starting at 'A'.
///
/// # Panics
/// Panics if the digit is 36 or larger.
#[must_use]
pub fn digit_char(digit: u32) -> char {
    match char::from_digit(digit, 36) {
        Some(c) => c.to_ascii_uppercase(),
        None => panic!("Digit {digit} has no single character representation"),
    }
}

/// Render a list of digits in order.
#[must_use]
pub fn to_digit_string(digits: &[u32]) -> String {
    digits.iter().map(|&digit| digit_char(digit)).collect()
}
