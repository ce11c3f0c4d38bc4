//! Filesystem-backed collection store.
//!
//! Each collection is one pretty-printed JSON array on disk, replaced
//! wholesale on every write. Reads that fail (missing file, corrupt content,
//! permission errors) degrade to an empty collection instead of propagating;
//! the store favors availability over consistency and only write failures
//! surface as errors.
//!
//! Every collection carries its own mutex so request-time mutations and the
//! scheduler's reads cannot interleave a read-modify-write cycle.

use crate::errors::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// The fixed set of persisted collections, one file per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Businesses,
    Advertisements,
}

impl Collection {
    pub const ALL: [Self; 2] = [Self::Businesses, Self::Advertisements];

    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Businesses => "businesses.json",
            Self::Advertisements => "advertisements.json",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Businesses => 0,
            Self::Advertisements => 1,
        }
    }
}

pub struct CollectionStore {
    data_dir: PathBuf,
    locks: [Mutex<()>; 2],
}

impl CollectionStore {
    /// Opens the store, creating the data directory and materializing empty
    /// collection files for each known collection on first use.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let store = Self {
            data_dir,
            locks: [Mutex::new(()), Mutex::new(())],
        };
        for collection in Collection::ALL {
            if !store.path(collection).exists() {
                store.write_unlocked::<serde_json::Value>(collection, &[])?;
            }
        }
        info!(data_dir = %store.data_dir.display(), "Collection store initialized");
        Ok(store)
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    fn guard(&self, collection: Collection) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock is still usable.
        self.locks[collection.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the full collection. Missing, unreadable, or corrupt files are
    /// treated as an empty collection rather than an error.
    pub fn read<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let _guard = self.guard(collection);
        self.read_unlocked(collection)
    }

    fn read_unlocked<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let path = self.path(collection);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                if path.exists() {
                    warn!(file = collection.file_name(), error = %e, "Failed to read collection; treating as empty");
                }
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(docs) => docs,
            Err(e) => {
                warn!(file = collection.file_name(), error = %e, "Corrupt collection file; treating as empty");
                Vec::new()
            }
        }
    }

    /// Fully replaces the collection contents on disk.
    pub fn write<T: Serialize>(&self, collection: Collection, docs: &[T]) -> Result<()> {
        let _guard = self.guard(collection);
        self.write_unlocked(collection, docs)
    }

    fn write_unlocked<T: Serialize>(&self, collection: Collection, docs: &[T]) -> Result<()> {
        let body = serde_json::to_string_pretty(docs).map_err(|e| Error::Storage {
            message: format!("Failed to serialize {}: {e}", collection.file_name()),
        })?;
        fs::write(self.path(collection), body)?;
        debug!(file = collection.file_name(), count = docs.len(), "Collection written");
        Ok(())
    }

    /// Runs a read-modify-write cycle under the collection's lock. The
    /// modified contents are only written back when the closure succeeds, so
    /// a failed mutation leaves the file untouched.
    pub fn update<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.guard(collection);
        let mut docs = self.read_unlocked(collection);
        let out = f(&mut docs)?;
        self.write_unlocked(collection, &docs)?;
        Ok(out)
    }
}
