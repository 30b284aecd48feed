//! Library implementing the two scheduled fetch-and-archive tasks.
//!
//! The different submodules deal with the steps of a run:
//!
//! - `config` describes what a task needs (bucket, source URLs)
//! - `fetch` downloads a source as raw bytes
//! - `store` writes those bytes into the archive bucket
//! - `task` drives the whole thing and assembles the run result
//!
//! Each invocation is a single synchronous pass: compute the run date once,
//! then fetch and store every configured source in order.  Nothing is kept
//! across invocations besides the date-stamped keys themselves.
//!

// Re-export these modules for a shorter import path.
//
pub use config::*;
pub use error::*;
pub use fetch::*;
pub use store::*;
pub use task::*;

mod config;
mod error;
mod fetch;
mod store;
mod task;

#[macro_use]
mod macros;
