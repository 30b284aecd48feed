//! Common logging initializer.
//!

use eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging early.
///
/// Filters are loaded from the environment (`RUST_LOG`), events go to stderr
/// so that stdout carries nothing but the run result.
///
pub fn init_logging() -> Result<()> {
    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .compact();

    // Load filters from environment
    //
    let filter = EnvFilter::from_default_env();

    // Combine filter & specific format
    //
    tracing_subscriber::registry().with(filter).with(fmt).init();

    Ok(())
}
