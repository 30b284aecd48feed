//! Archive side of a run.
//!
//! We write each downloaded payload as one object into a bucket, behind the
//! `object_store` abstraction so the same code drives an actual S3 bucket, a
//! local directory tree or the in-memory store used by tests.  Writing to an
//! existing key is a plain overwrite, last-write-wins: two runs on the same
//! day target the same key on purpose.
//!
//! `object_store` is async; callers of this crate are not.  The `Archiver`
//! owns a small current-thread runtime and blocks on each call, keeping the
//! whole run a single synchronous pass.
//!

use std::env;
use std::path::Path as FsPath;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, trace};

use crate::StoreError;

/// Name of the environment variable that switches the archive to a local
/// directory tree instead of S3.
pub const ENV_STORE_DIR: &str = "MEASLES_STORE_DIR";

/// Handle on the archive bucket.
///
pub struct Archiver {
    /// Bucket the objects go into
    bucket: String,
    /// Actual backend
    store: Arc<dyn ObjectStore>,
    /// Runtime we block on for each call
    rt: Runtime,
}

impl Archiver {
    /// Archive into an S3 bucket, credentials & region from the environment.
    ///
    #[tracing::instrument]
    pub fn s3(bucket: &str) -> Result<Self, StoreError> {
        trace!("archiver::s3({})", bucket);

        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StoreError::Init(e.to_string()))?;
        Self::with_store(bucket, Arc::new(store))
    }

    /// Archive into `root/bucket` on the local filesystem, created if absent.
    ///
    #[tracing::instrument]
    pub fn directory(root: &FsPath, bucket: &str) -> Result<Self, StoreError> {
        trace!("archiver::directory({:?}, {})", root, bucket);

        let base = root.join(bucket);
        if !base.exists() {
            std::fs::create_dir_all(&base).map_err(|e| StoreError::Init(e.to_string()))?;
        }
        let store =
            LocalFileSystem::new_with_prefix(&base).map_err(|e| StoreError::Init(e.to_string()))?;
        Self::with_store(bucket, Arc::new(store))
    }

    /// Archive into an explicitly injected backend.
    ///
    pub fn with_store(bucket: &str, store: Arc<dyn ObjectStore>) -> Result<Self, StoreError> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Init(e.to_string()))?;
        Ok(Archiver {
            bucket: bucket.to_owned(),
            store,
            rt,
        })
    }

    /// Bucket this archiver writes into.
    ///
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Write the payload as one object under `key` and return the
    /// `(bucket, key)` pair written.  An existing object at the same key is
    /// silently replaced.
    ///
    #[tracing::instrument(skip(self, payload))]
    pub fn store(&self, key: &str, payload: Vec<u8>) -> Result<(String, String), StoreError> {
        trace!("archiver::store({}/{})", self.bucket, key);

        let len = payload.len();
        let location = Path::from(key);
        self.rt
            .block_on(self.store.put(&location, PutPayload::from(payload)))
            .map_err(|e| StoreError::Write {
                bucket: self.bucket.clone(),
                key: key.to_owned(),
                msg: e.to_string(),
            })?;

        debug!("{} bytes written to {}/{}", len, self.bucket, key);
        Ok((self.bucket.clone(), key.to_owned()))
    }

    /// Read an archived object back.  Round-trip checks mostly.
    ///
    #[tracing::instrument(skip(self))]
    pub fn retrieve(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let location = Path::from(key);
        let read = |e: object_store::Error| StoreError::Read {
            bucket: self.bucket.clone(),
            key: key.to_owned(),
            msg: e.to_string(),
        };
        let body = self
            .rt
            .block_on(async {
                let r = self.store.get(&location).await?;
                r.bytes().await
            })
            .map_err(read)?;
        Ok(body.to_vec())
    }
}

/// Pick the archive backend for the given bucket from the environment:
/// `MEASLES_STORE_DIR` set means a local tree under that directory, anything
/// else means S3 proper.
///
#[tracing::instrument]
pub fn open_store(bucket: &str) -> Result<Archiver, StoreError> {
    match env::var(ENV_STORE_DIR) {
        Ok(dir) => Archiver::directory(FsPath::new(&dir), bucket),
        Err(_) => Archiver::s3(bucket),
    }
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;

    fn memory(bucket: &str) -> Archiver {
        Archiver::with_store(bucket, Arc::new(InMemory::new())).unwrap()
    }

    #[test]
    fn test_store_roundtrip() {
        let a = memory("bucket");
        let (bucket, key) = a
            .store("cases/measles_cases_20240115.csv", b"a,b\n1,2\n".to_vec())
            .unwrap();

        assert_eq!("bucket", bucket);
        assert_eq!("cases/measles_cases_20240115.csv", key);
        assert_eq!(b"a,b\n1,2\n".to_vec(), a.retrieve(&key).unwrap());
    }

    #[test]
    fn test_store_overwrite_wins() {
        let a = memory("bucket");
        a.store("k.csv", b"first".to_vec()).unwrap();
        a.store("k.csv", b"second".to_vec()).unwrap();

        assert_eq!(b"second".to_vec(), a.retrieve("k.csv").unwrap());
    }

    #[test]
    fn test_retrieve_missing() {
        let a = memory("bucket");
        assert!(matches!(
            a.retrieve("nope.csv"),
            Err(StoreError::Read { .. })
        ));
    }

    #[test]
    fn test_directory_backend() {
        let tmp = tempfile::tempdir().unwrap();
        let a = Archiver::directory(tmp.path(), "measles-archive").unwrap();

        a.store("coverage/run_date=20240115/measles_coverage_mcv1.csv", b"x\n".to_vec())
            .unwrap();

        let on_disk = tmp
            .path()
            .join("measles-archive")
            .join("coverage/run_date=20240115/measles_coverage_mcv1.csv");
        assert_eq!(b"x\n".to_vec(), std::fs::read(on_disk).unwrap());
    }
}
