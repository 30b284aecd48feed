//! Run date handling.
//!
//! Every archived object is namespaced by the UTC calendar day of the run,
//! formatted as an 8-digit `YYYYMMDD` string with no separators.  The date is
//! computed once at the start of an invocation and reused for every key built
//! during that run.
//!

use chrono::{DateTime, Utc};

/// Format used for all date-stamped keys.
const STAMP: &str = "%Y%m%d";

/// Return the given instant's UTC day as `YYYYMMDD`.
///
pub fn stamp(date: DateTime<Utc>) -> String {
    date.format(STAMP).to_string()
}

/// Return today's date as `YYYYMMDD` in UTC.
///
pub fn today() -> String {
    stamp(Utc::now())
}
