//! A library for finding the fixed points of the generalized Kaprekar routine.
//!
//! The routine sorts the digits of a number descending and ascending and subtracts. For a
//! given length and base, the numbers it maps onto a rearrangement of their own digits are
//! the candidates for that base's Kaprekar constant (495 for three digits in base ten, 6174
//! for four).

pub mod distribution;
pub mod generator;
pub mod naive_search;
pub mod routine;

use clap::ValueEnum;
use generator::{Collector, Generator, SearchStats};
use serde::Serialize;
use std::fmt;

pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Smallest supported base.
pub const MIN_BASE: u32 = 2;
/// Largest supported base, so every digit renders as a single character.
pub const MAX_BASE: u32 = 16;
pub const DEFAULT_BASE: u32 = 10;

/// Each search strategy the client supports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Recursive search over digit distributions.
    Pruned,
    /// Try every digit multiset. Only practical for small lengths.
    Naive,
}

impl SearchMode {
    /// Run a search in this mode, passing each fixed point to the collector.
    pub fn run<C>(self, length: usize, base: u32, collector: &mut C) -> SearchStats
    where
        C: Collector + ?Sized,
    {
        match self {
            SearchMode::Pruned => Generator::new(base).generate(length, collector),
            SearchMode::Naive => naive_search::naive_search(length, base, collector),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The compiled results of one search, used for machine-readable output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationReport {
    pub client_version: String,
    pub base: u32,
    pub length: usize,
    pub mode: SearchMode,
    pub results: Vec<String>,
    pub stats: SearchStats,
    pub duration_secs: f64,
}
