//! `epictl` is the trigger binary for the two archive tasks.
//!
//! The intended caller is a scheduler (cron, systemd timer) that runs one
//! sub-command per invocation.  Configuration comes from the environment,
//! exactly as the tasks expect it:
//!
//! - `MEASLES_BUCKET` for both tasks
//! - `CASES_URL` for `cases`
//! - `COVERAGE_URL_MCV1` & `COVERAGE_URL_MCV2` for `coverage`
//! - `MEASLES_STORE_DIR` (optional) to archive into a local tree instead of S3
//!
//! On success the run result is printed as one JSON document on stdout; any
//! missing configuration, fetch failure or store failure aborts the run with
//! a non-zero exit status.
//!

use std::{env, io};

use chrono::{DateTime, Utc};
use clap::{crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::{eyre, Result};
use tracing::trace;

use epifetch_common::{init_logging, stamp, version};
use epifetch_engine::{open_store, CasesConfig, CoverageConfig, Runner};

mod cli;

use cli::{Opts, RunOpts, SubCommand};

/// Binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    // `-v`/`-D` raise the default filter when `RUST_LOG` is unset.
    //
    if env::var("RUST_LOG").is_err() {
        let level = if opts.debug {
            "debug"
        } else {
            match opts.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };
        env::set_var("RUST_LOG", level);
    }

    // Initialise logging.
    //
    init_logging()?;

    if opts.version {
        eprintln!("{}/{} ({})", NAME, VERSION, version());
        return Ok(());
    }

    handle_subcmd(&opts.subcmd)
}

pub fn handle_subcmd(subcmd: &SubCommand) -> Result<()> {
    match subcmd {
        // Handle `cases`
        //
        SubCommand::Cases(ropts) => {
            trace!("cases");

            // Configuration first: a hole in it must abort before any client
            // is even built.
            //
            let cfg = CasesConfig::from_env()?;
            let runner = Runner::new(open_store(&cfg.bucket)?);

            let res = match run_date(ropts)? {
                Some(date) => runner.cases_for(&cfg, &date)?,
                None => runner.cases(&cfg)?,
            };
            println!("{}", serde_json::to_string(&res)?);
        }

        // Handle `coverage`
        //
        SubCommand::Coverage(ropts) => {
            trace!("coverage");

            let cfg = CoverageConfig::from_env()?;
            let runner = Runner::new(open_store(&cfg.bucket)?);

            let res = match run_date(ropts)? {
                Some(date) => runner.coverage_for(&cfg, &date)?,
                None => runner.coverage(&cfg)?,
            };
            println!("{}", serde_json::to_string(&res)?);
        }

        // Standalone completion generation
        //
        // NOTE: you can generate UNIX shells completion on Windows and
        //       vice-versa.  Not worth trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        }
    }
    Ok(())
}

/// Turn the optional `--date` into an 8-digit run date.
///
fn run_date(opts: &RunOpts) -> Result<Option<String>> {
    match &opts.date {
        Some(date) => {
            let parsed: DateTime<Utc> = dateparser::parse(date)
                .map_err(|_| eyre!("bad date: {}", date))?;
            Ok(Some(stamp(parsed)))
        }
        None => Ok(None),
    }
}
