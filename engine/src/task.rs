//! The two task runners.
//!
//! Each run is triggered externally (timer, cron, operator) and performs one
//! linear pass: compute the run date once, then for each configured source
//! fetch the CSV and archive it under a date-stamped key.  Any failure aborts
//! the remaining steps and propagates out of the run, there is no partial
//! result.
//!
//! Key layout in the bucket:
//!
//! - `cases/measles_cases_<run_date>.csv`
//! - `coverage/run_date=<run_date>/measles_coverage_<name>.csv`
//!

use eyre::Result;
use serde::Serialize;
use tracing::{info, trace};

use epifetch_common::today;

use crate::{Archiver, CasesConfig, CoverageConfig, Fetcher};

/// Result of one cases run, handed back to the trigger.
///
#[derive(Debug, Serialize)]
pub struct CasesRun {
    pub status: String,
    pub bucket: String,
    pub run_date: String,
    pub cases_key: String,
}

/// Result of one coverage run, handed back to the trigger.
///
#[derive(Debug, Serialize)]
pub struct CoverageRun {
    pub status: String,
    pub bucket: String,
    pub run_date: String,
    pub coverage_keys: Vec<String>,
}

/// Drives a run: one fetcher, one archiver, no other state.
///
pub struct Runner {
    fetcher: Fetcher,
    archiver: Archiver,
}

impl Runner {
    pub fn new(archiver: Archiver) -> Self {
        Runner {
            fetcher: Fetcher::new(),
            archiver,
        }
    }

    /// Access to the underlying archiver (read-back, bucket name).
    ///
    pub fn archiver(&self) -> &Archiver {
        &self.archiver
    }

    /// Single-source task: archive today's case counts CSV.
    ///
    #[tracing::instrument(skip(self))]
    pub fn cases(&self, cfg: &CasesConfig) -> Result<CasesRun> {
        self.cases_for(cfg, &today())
    }

    /// Same, for an explicit run date (backfill).
    ///
    #[tracing::instrument(skip(self))]
    pub fn cases_for(&self, cfg: &CasesConfig, run_date: &str) -> Result<CasesRun> {
        trace!("runner::cases_for({})", run_date);

        let key = format!("cases/measles_cases_{}.csv", run_date);

        let data = self.fetcher.fetch(&cfg.cases_url)?;
        let (bucket, key) = self.archiver.store(&key, data)?;

        info!("cases run {} archived as {}/{}", run_date, bucket, key);
        Ok(CasesRun {
            status: "ok".to_owned(),
            bucket,
            run_date: run_date.to_owned(),
            cases_key: key,
        })
    }

    /// Multi-source task: archive today's two vaccination coverage CSV files.
    ///
    #[tracing::instrument(skip(self))]
    pub fn coverage(&self, cfg: &CoverageConfig) -> Result<CoverageRun> {
        self.coverage_for(cfg, &today())
    }

    /// Same, for an explicit run date (backfill).
    ///
    /// Sources are processed strictly in order, MCV1 then MCV2; a failure on
    /// either aborts the run before the next source is touched.
    ///
    #[tracing::instrument(skip(self))]
    pub fn coverage_for(&self, cfg: &CoverageConfig, run_date: &str) -> Result<CoverageRun> {
        trace!("runner::coverage_for({})", run_date);

        let sources = [("mcv1", &cfg.mcv1_url), ("mcv2", &cfg.mcv2_url)];

        let mut keys = vec![];
        for (name, url) in sources {
            let key = format!(
                "coverage/run_date={}/measles_coverage_{}.csv",
                run_date, name
            );

            let data = self.fetcher.fetch(url)?;
            let (_, key) = self.archiver.store(&key, data)?;
            keys.push(key);
        }

        info!(
            "coverage run {} archived {} objects into {}",
            run_date,
            keys.len(),
            self.archiver.bucket()
        );
        Ok(CoverageRun {
            status: "ok".to_owned(),
            bucket: self.archiver.bucket().to_owned(),
            run_date: run_date.to_owned(),
            coverage_keys: keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::prelude::*;
    use object_store::memory::InMemory;
    use serde_json::json;

    use super::*;

    fn runner() -> Runner {
        Runner::new(Archiver::with_store("measles-archive", Arc::new(InMemory::new())).unwrap())
    }

    #[test]
    fn test_cases_run() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/cases.csv");
            then.status(200).body("a,b\n1,2\n");
        });

        let cfg = CasesConfig {
            bucket: "measles-archive".to_string(),
            cases_url: server.url("/cases.csv"),
        };
        let runner = runner();
        let res = runner.cases_for(&cfg, "20240115").unwrap();

        m.assert();
        assert_eq!(
            json!({
                "status": "ok",
                "bucket": "measles-archive",
                "run_date": "20240115",
                "cases_key": "cases/measles_cases_20240115.csv",
            }),
            serde_json::to_value(&res).unwrap()
        );

        // Round-trip: the archived object is byte-for-byte the payload.
        let stored = runner.archiver().retrieve(&res.cases_key).unwrap();
        assert_eq!(b"a,b\n1,2\n".to_vec(), stored);
    }

    #[test]
    fn test_coverage_run() {
        let server = MockServer::start();
        let m1 = server.mock(|when, then| {
            when.method(GET).path("/mcv1.csv");
            then.status(200).body("c1\n");
        });
        let m2 = server.mock(|when, then| {
            when.method(GET).path("/mcv2.csv");
            then.status(200).body("c2\n");
        });

        let cfg = CoverageConfig {
            bucket: "measles-archive".to_string(),
            mcv1_url: server.url("/mcv1.csv"),
            mcv2_url: server.url("/mcv2.csv"),
        };
        let runner = runner();
        let res = runner.coverage_for(&cfg, "20240115").unwrap();

        m1.assert();
        m2.assert();
        assert_eq!(
            json!({
                "status": "ok",
                "bucket": "measles-archive",
                "run_date": "20240115",
                "coverage_keys": [
                    "coverage/run_date=20240115/measles_coverage_mcv1.csv",
                    "coverage/run_date=20240115/measles_coverage_mcv2.csv",
                ],
            }),
            serde_json::to_value(&res).unwrap()
        );

        // Each key holds its own payload.
        let a = runner.archiver();
        assert_eq!(b"c1\n".to_vec(), a.retrieve(&res.coverage_keys[0]).unwrap());
        assert_eq!(b"c2\n".to_vec(), a.retrieve(&res.coverage_keys[1]).unwrap());
    }

    #[test]
    fn test_coverage_fail_fast() {
        let server = MockServer::start();
        let m1 = server.mock(|when, then| {
            when.method(GET).path("/mcv1.csv");
            then.status(500);
        });
        let m2 = server.mock(|when, then| {
            when.method(GET).path("/mcv2.csv");
            then.status(200).body("c2\n");
        });

        let cfg = CoverageConfig {
            bucket: "measles-archive".to_string(),
            mcv1_url: server.url("/mcv1.csv"),
            mcv2_url: server.url("/mcv2.csv"),
        };
        let runner = runner();
        let res = runner.coverage_for(&cfg, "20240115");

        // First source failed, second was never fetched nor stored.
        assert!(res.is_err());
        m1.assert();
        assert_eq!(0, m2.hits());
        assert!(runner
            .archiver()
            .retrieve("coverage/run_date=20240115/measles_coverage_mcv2.csv")
            .is_err());
    }

    #[test]
    fn test_same_day_rerun_overwrites() {
        let server = MockServer::start();
        let mut first = server.mock(|when, then| {
            when.method(GET).path("/cases.csv");
            then.status(200).body("v1\n");
        });

        let cfg = CasesConfig {
            bucket: "measles-archive".to_string(),
            cases_url: server.url("/cases.csv"),
        };
        let runner = runner();
        let r1 = runner.cases_for(&cfg, "20240115").unwrap();

        first.delete();
        server.mock(|when, then| {
            when.method(GET).path("/cases.csv");
            then.status(200).body("v2\n");
        });
        let r2 = runner.cases_for(&cfg, "20240115").unwrap();

        // Identical keys, second payload wins, no error.
        assert_eq!(r1.cases_key, r2.cases_key);
        assert_eq!(
            b"v2\n".to_vec(),
            runner.archiver().retrieve(&r2.cases_key).unwrap()
        );
    }
}
