//! Module describing all possible commands and sub-commands to the `epictl`
//! main driver.
//!
//! We have two tasks and a helper:
//!
//! - `cases`
//! - `coverage`
//! - `completion`
//!
//! `cases` downloads the public case counts CSV and archives it under
//! `cases/measles_cases_<run_date>.csv`.
//!
//! `coverage` downloads the two vaccination coverage CSV files (MCV1 then
//! MCV2) and archives them under
//! `coverage/run_date=<run_date>/measles_coverage_<name>.csv`.
//!
//! Both print the run result as JSON on stdout and exit non-zero on any
//! failure, which is the whole of the contract with the scheduler that
//! triggers them.
//!
//! `completion` is here just to configure the various shells completion
//! system.
//!

use clap::{crate_description, crate_name, crate_version, Parser};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!())]
pub struct Opts {
    /// debug mode.
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Display utility full version.
    #[clap(short = 'V', long)]
    pub version: bool,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `cases [--date DATE]`
/// `coverage [--date DATE]`
/// `completion SHELL`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Fetch & archive the case counts CSV
    Cases(RunOpts),
    /// Fetch & archive the two coverage CSV files
    Coverage(RunOpts),
    /// Generate Completion stuff
    Completion(ComplOpts),
}

// ------

/// Options shared by both tasks.
///
#[derive(Debug, Parser)]
pub struct RunOpts {
    /// Run as if on that date instead of today (backfill).
    #[clap(long)]
    pub date: Option<String>,
}

/// Options to generate completion files
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    /// Shell selection
    #[clap(value_parser)]
    pub shell: Shell,
}
