// Disk cache store for raw commits responses.
// One directory per partition, one file per request descriptor, atomic writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::KeyedCache;
use super::paths;
use crate::error::{Result, ViewError};

/// A named cache partition backed by a directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Open (or create) the partition `partition` under `root`.
    pub fn open(root: &Path, partition: &str) -> Result<Self> {
        let dir = paths::partition_dir(root, partition);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open the partition under the platform cache directory.
    pub fn open_default(partition: &str) -> Result<Self> {
        let root = paths::cache_dir().ok_or(ViewError::NoCacheDir)?;
        Self::open(&root, partition)
    }

    /// Directory backing this partition.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// When the entry for `key` was last written.
    pub fn cached_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let path = paths::entry_path(&self.dir, key);
        if !path.exists() {
            return Ok(None);
        }
        let modified = fs::metadata(&path)?.modified()?;
        Ok(Some(DateTime::<Utc>::from(modified)))
    }

    /// Age of the entry for `key`, if present.
    pub fn age(&self, key: &str) -> Result<Option<Duration>> {
        Ok(self.cached_at(key)?.map(|at| {
            Utc::now()
                .signed_duration_since(at)
                .to_std()
                .unwrap_or(Duration::ZERO)
        }))
    }
}

impl KeyedCache for DiskCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = paths::entry_path(&self.dir, key);
        if !path.exists() {
            trace!(key, "cache miss");
            return Ok(None);
        }

        let body = fs::read(&path)?;
        let age = self.age(key)?.unwrap_or_default();
        debug!(key, bytes = body.len(), age_secs = age.as_secs(), "cache hit");
        Ok(Some(body))
    }

    fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let path = paths::entry_path(&self.dir, key);

        // Ensure the partition still exists
        fs::create_dir_all(&self.dir)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(body)?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        trace!(key, bytes = body.len(), "cache store");
        Ok(())
    }
}
