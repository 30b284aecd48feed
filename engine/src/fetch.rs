//! Download side of a run.
//!
//! The sources we pull from are plain public URLs serving CSV, so there is no
//! authentication phase, just one GET per source.  The body is returned as
//! raw bytes and never inspected: whatever the endpoint serves is what ends
//! up in the archive.
//!

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use tracing::{debug, trace};

use crate::{http_get, FetchError};

/// Blocking downloader, one `reqwest` client reused across sources.
///
#[derive(Clone, Debug, Default)]
pub struct Fetcher {
    /// reqwest blocking client
    pub client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Fetcher {
            client: Client::new(),
        }
    }

    /// Fetch the complete body from the given URL as raw bytes.
    ///
    /// Any transport failure or non-2xx status is an error; there is no
    /// retry, the caller sees exactly one request per call.
    ///
    #[tracing::instrument(skip(self))]
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!("fetcher::fetch({})", url);

        let resp = http_get!(self, url).map_err(|e| FetchError::Unreachable {
            url: url.to_owned(),
            msg: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = resp.bytes().map_err(|e| FetchError::Body {
            url: url.to_owned(),
            msg: e.to_string(),
        })?;

        debug!("{} bytes read.", body.len());
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_fetch_ok() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .header(
                    "user-agent",
                    format!("{}/{}", crate_name!(), crate_version!()),
                )
                .path("/cases.csv");
            then.status(200).body("a,b\n1,2\n");
        });

        let url = server.url("/cases.csv");
        let data = Fetcher::new().fetch(&url);

        m.assert();
        assert_eq!(b"a,b\n1,2\n".to_vec(), data.unwrap());
    }

    #[rstest]
    #[case(404)]
    #[case(500)]
    #[case(503)]
    fn test_fetch_bad_status(#[case] code: u16) {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/gone.csv");
            then.status(code);
        });

        let url = server.url("/gone.csv");
        let r = Fetcher::new().fetch(&url);

        m.assert();
        match r {
            Err(FetchError::Status { code: got, .. }) => assert_eq!(code, got),
            _ => panic!("expected a status error"),
        }
    }

    #[test]
    fn test_fetch_unreachable() {
        // Nothing listens on this port.
        let r = Fetcher::new().fetch("http://127.0.0.1:1/cases.csv");
        assert!(matches!(r, Err(FetchError::Unreachable { .. })));
    }
}
