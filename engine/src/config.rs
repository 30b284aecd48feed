//! Task configuration.
//!
//! Each task gets an explicit configuration struct rather than reading the
//! process environment deep inside the run: `from_env()` is called once by
//! the trigger binary, before any HTTP client or store handle is built, so a
//! missing variable aborts the invocation before any network activity.
//!

use std::env;

use serde::Deserialize;

use crate::ConfigError;

/// Bucket receiving every archived object.
pub const ENV_BUCKET: &str = "MEASLES_BUCKET";
/// Public URL of the case counts CSV.
pub const ENV_CASES_URL: &str = "CASES_URL";
/// Public URL of the first-dose coverage CSV.
pub const ENV_MCV1_URL: &str = "COVERAGE_URL_MCV1";
/// Public URL of the second-dose coverage CSV.
pub const ENV_MCV2_URL: &str = "COVERAGE_URL_MCV2";

/// What the single-source (cases) task needs.
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CasesConfig {
    /// Destination bucket
    pub bucket: String,
    /// Where the case counts CSV lives
    pub cases_url: String,
}

impl CasesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CasesConfig {
            bucket: var(ENV_BUCKET)?,
            cases_url: var(ENV_CASES_URL)?,
        })
    }
}

/// What the multi-source (coverage) task needs.
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CoverageConfig {
    /// Destination bucket
    pub bucket: String,
    /// First dose (MCV1) coverage CSV
    pub mcv1_url: String,
    /// Second dose (MCV2) coverage CSV
    pub mcv2_url: String,
}

impl CoverageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CoverageConfig {
            bucket: var(ENV_BUCKET)?,
            mcv1_url: var(ENV_MCV1_URL)?,
            mcv2_url: var(ENV_MCV2_URL)?,
        })
    }
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}
