//! A simple CLI for the kaprekar library.

#![warn(clippy::all, clippy::pedantic)]

extern crate kaprekar_common;
use kaprekar_common::generator::Collector;
use kaprekar_common::routine::{is_fixed_point, kaprekar_step, to_digit_string};
use kaprekar_common::{
    CLIENT_VERSION, DEFAULT_BASE, GenerationReport, MAX_BASE, MIN_BASE, SearchMode,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::io::{self, BufWriter, Write};
use std::time::Instant;

/// How results are written to standard output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One result per line followed by a summary
    Text,
    /// A single JSON report
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The number of digits of each result
    #[arg(value_parser = clap::value_parser!(u64).range(1..), env = "KAPREKAR_LENGTH")]
    length: u64,

    /// The base to search in
    #[arg(
        default_value_t = DEFAULT_BASE,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_BASE)..=i64::from(MAX_BASE)),
        env = "KAPREKAR_BASE"
    )]
    base: u32,

    /// The search strategy to use
    #[arg(long, value_enum, default_value = "pruned", env = "KAPREKAR_MODE")]
    mode: SearchMode,

    /// The output format
    #[arg(long, value_enum, default_value = "text", env = "KAPREKAR_FORMAT")]
    format: OutputFormat,

    /// Re-check every result with a direct Kaprekar step
    #[arg(long, env = "KAPREKAR_VERIFY")]
    verify: bool,

    /// Only print the results, no summary
    #[arg(short, long, env = "KAPREKAR_QUIET")]
    quiet: bool,

    /// Show additional output
    #[arg(short, long, env = "KAPREKAR_VERBOSE")]
    verbose: bool,
}

/// Receives results from the search, writing them out as they arrive in text mode.
struct ResultSink<W: Write> {
    out: W,
    base: u32,
    verify: bool,
    stream: bool,
    count: usize,
    results: Vec<String>,
    mismatches: usize,
    error: Option<io::Error>,
}

impl<W: Write> ResultSink<W> {
    fn new(out: W, base: u32, verify: bool, stream: bool) -> Self {
        Self {
            out,
            base,
            verify,
            stream,
            count: 0,
            results: Vec::new(),
            mismatches: 0,
            error: None,
        }
    }
}

impl<W: Write> Collector for ResultSink<W> {
    fn collect(&mut self, digits: Vec<u32>) {
        self.count += 1;
        let text = to_digit_string(&digits);

        if self.verify && !is_fixed_point(&digits, self.base) {
            error!(
                "Result {} is not a fixed point, one step gives {}",
                text,
                to_digit_string(&kaprekar_step(&digits, self.base))
            );
            self.mismatches += 1;
        }

        if !self.stream {
            self.results.push(text);
        } else if self.error.is_none()
            && let Err(e) = writeln!(self.out, "{text}")
        {
            // Keep searching, the error is reported once the search returns
            self.error = Some(e);
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up logger
    env_logger::init();

    if cli.verbose {
        println!("Kaprekar Client v{CLIENT_VERSION} started in {} mode.", cli.mode);
        println!("CLI Inputs: {cli:?}");
    }

    let length = usize::try_from(cli.length).context("Length is too large for this platform")?;
    let base = cli.base;
    info!("Searching for fixed points of length {length} in base {base}");

    let stdout = io::stdout();
    let mut sink = ResultSink::new(
        BufWriter::new(stdout.lock()),
        base,
        cli.verify,
        cli.format == OutputFormat::Text,
    );

    let start = Instant::now();
    let stats = cli.mode.run(length, base, &mut sink);
    let duration = start.elapsed();
    stats.log_summary(base, length);

    if let Some(e) = sink.error.take() {
        return Err(e).context("Failed to write results");
    }
    if sink.mismatches > 0 {
        bail!("{} results failed verification", sink.mismatches);
    }

    let mut out = sink.out;
    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                writeln!(out)?;
                writeln!(out, "Base    : {base}")?;
                writeln!(out, "Length  : {length}")?;
                writeln!(out, "Results : {}", sink.count)?;
                writeln!(out, "Duration: {:.6} seconds", duration.as_secs_f64())?;
                writeln!(out)?;
            }
        }
        OutputFormat::Json => {
            let report = GenerationReport {
                client_version: CLIENT_VERSION.to_string(),
                base,
                length,
                mode: cli.mode,
                results: sink.results,
                stats,
                duration_secs: duration.as_secs_f64(),
            };
            serde_json::to_writer_pretty(&mut out, &report)
                .context("Failed to serialize report")?;
            writeln!(out)?;
        }
    }
    if cli.verbose {
        writeln!(out, "Search stats: {stats:?}")?;
    }
    out.flush().context("Failed to flush output")?;

    Ok(())
}
