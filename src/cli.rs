//! The cmdspec Command-Line Interface.
//!
//! This module parses arguments, resolves them into a [`RunConfig`], and
//! drives the load → execute → classify → render pipeline.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use miette::Report;

use crate::errors::CompileError;
use crate::loader::{self, DEFAULT_FILENAME};
use crate::render::{render, Summary};
use crate::test::result::{run_all, TestResult};

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "cmdspec",
    version,
    about = "Runs the commands described in a YAML test file and checks their output."
)]
pub struct CmdspecArgs {
    /// Test file to load.
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    pub filename: PathBuf,

    /// Run only the test with this name.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Display each test's raw execution log.
    #[arg(short, long)]
    pub log: bool,

    /// Display the full error chain on failure (implies --log).
    #[arg(short, long)]
    pub verbose: bool,

    /// Development mode: debug logging on stderr (implies --verbose).
    #[arg(short, long)]
    pub dev: bool,

    /// When to color the report.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

/// Fully resolved settings for one run, with flag implications applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub filename: PathBuf,
    pub target: Option<String>,
    pub log: bool,
    pub verbose: bool,
    pub dev: bool,
    pub use_colors: bool,
}

impl RunConfig {
    pub fn from_args(args: CmdspecArgs) -> Self {
        let verbose = args.verbose || args.dev;
        let use_colors = match args.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
        };
        Self {
            filename: args.filename,
            target: args.target,
            log: args.log || verbose,
            verbose,
            dev: args.dev,
            use_colors,
        }
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.dev {
            "debug"
        } else {
            "warn"
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_FILENAME),
            target: None,
            log: false,
            verbose: false,
            dev: false,
            use_colors: false,
        }
    }
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Parses the command line into a [`RunConfig`].
pub fn parse_config() -> RunConfig {
    RunConfig::from_args(CmdspecArgs::parse())
}

/// Runs the configured test file and exits the process.
///
/// Exits with status 1 on any fatal compile error or when any test did not
/// pass, and 0 otherwise.
pub fn run(config: &RunConfig) -> ! {
    match execute_suite(config) {
        Ok(results) => {
            println!("{}", render(&results, config.log, config.use_colors));
            let code = if Summary::of(&results).all_passed() { 0 } else { 1 };
            process::exit(code);
        }
        Err(e) => {
            eprintln!("{}", format_error(e, config.verbose));
            process::exit(1);
        }
    }
}

/// Loads, executes and classifies every selected test, in order.
pub fn execute_suite(config: &RunConfig) -> Result<Vec<TestResult>, CompileError> {
    let tests = loader::load(&config.filename, config.target.as_deref())?.ok_or_else(|| {
        CompileError::NoTests {
            target: config.target.clone(),
        }
    })?;
    Ok(run_all(&tests))
}

/// Formats a fatal error.
///
/// The default form is `Kind: message`. The verbose form is the full `miette`
/// report, including diagnostic code, help text and the chained cause.
pub fn format_error(error: CompileError, verbose: bool) -> String {
    if verbose {
        format!("{:?}", Report::new(error))
    } else {
        format!("{}: {}", error.kind_name(), error)
    }
}
