use thiserror::Error;

/// Raised before any network activity when the invocation is missing part of
/// its configuration.
///
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
}

/// Custom error type for downloads, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Can not reach {url}: {msg}")]
    Unreachable { url: String, msg: String },
    #[error("HTTP {code} fetching {url}")]
    Status { code: u16, url: String },
    #[error("Reading body from {url}: {msg}")]
    Body { url: String, msg: String },
}

/// Custom error type for the archive side.
///
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Can not initialise store: {0}")]
    Init(String),
    #[error("Can not store {key} into {bucket}: {msg}")]
    Write {
        bucket: String,
        key: String,
        msg: String,
    },
    #[error("Can not read back {key} from {bucket}: {msg}")]
    Read {
        bucket: String,
        key: String,
        msg: String,
    },
}
