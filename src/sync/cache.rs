use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Snapshot;

/// Bumped whenever the on-disk shape changes; an old blob is treated as
/// corrupt rather than misread.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached state at {0}")]
    Missing(PathBuf),
    #[error("cache io: {0}")]
    Io(#[from] io::Error),
    #[error("cache is not readable json: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("cache version {found}, expected {CACHE_VERSION}")]
    Version { found: u32 },
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    state: Snapshot,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    state: &'a Snapshot,
}

/// The whole snapshot as one JSON blob on disk. Read once at startup,
/// rewritten wholesale after every store change.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Snapshot, CacheError> {
        if !self.path.exists() {
            return Err(CacheError::Missing(self.path.clone()));
        }
        let raw = fs::read_to_string(&self.path)?;
        let envelope: Envelope = serde_json::from_str(&raw)?;
        if envelope.version != CACHE_VERSION {
            return Err(CacheError::Version {
                found: envelope.version,
            });
        }
        Ok(envelope.state)
    }

    pub fn store(&self, snapshot: &Snapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let envelope = EnvelopeRef {
            version: CACHE_VERSION,
            state: snapshot,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::habit::{Frequency, Habit};
    use crate::core::task::Task;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("flowstate-cache-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn round_trip_preserves_every_collection() {
        let mut snapshot = Snapshot::seeded();
        snapshot.tasks.push(Task::new("Pay rent"));
        snapshot.habits.push(Habit::new("Stretch", Frequency::Daily));
        snapshot.dark_mode = false;

        let cache = SnapshotCache::new(scratch_path());
        cache.store(&snapshot).unwrap();
        let reloaded = cache.load().unwrap();
        let _ = fs::remove_file(cache.path());

        assert_eq!(reloaded, snapshot);
    }

    #[test]
    fn missing_file_is_distinguishable() {
        let cache = SnapshotCache::new(scratch_path());
        assert!(matches!(cache.load(), Err(CacheError::Missing(_))));
    }

    #[test]
    fn corrupt_blob_is_distinguishable() {
        let cache = SnapshotCache::new(scratch_path());
        fs::write(cache.path(), "definitely not json").unwrap();
        assert!(matches!(cache.load(), Err(CacheError::Corrupt(_))));
        let _ = fs::remove_file(cache.path());
    }

    #[test]
    fn version_mismatch_is_distinguishable() {
        let cache = SnapshotCache::new(scratch_path());
        let envelope = EnvelopeRef {
            version: CACHE_VERSION + 1,
            state: &Snapshot::seeded(),
        };
        fs::write(cache.path(), serde_json::to_string(&envelope).unwrap()).unwrap();
        assert!(matches!(
            cache.load(),
            Err(CacheError::Version { found }) if found == CACHE_VERSION + 1
        ));
        let _ = fs::remove_file(cache.path());
    }
}
