//! JSON-file key-value store: the on-disk analogue of browser local storage.
//!
//! The whole map is rewritten on every mutation via a temp file and rename,
//! so a crash mid-write leaves the previous state intact. Entries are cached
//! in memory after open; processes sharing one file do not see each other's
//! writes and the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use beacon_core::errors::{BeaconResult, StorageError};
use beacon_core::traits::IKeyValueStore;
use beacon_observability::events;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, creating parent directories. A missing file is an empty
    /// store. An unreadable or corrupt file is set aside as `<path>.corrupt`
    /// and the store starts empty; if it cannot be set aside, that is logged
    /// and the next write replaces it.
    pub fn open(path: impl AsRef<Path>) -> BeaconResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::Unavailable {
                reason: format!("{}: {e}", parent.display()),
            })?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    let aside = path.with_extension("corrupt");
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "storage: state file is corrupt, starting empty"
                    );
                    if let Err(e) = fs::rename(&path, &aside) {
                        events::storage_degraded(
                            "file_store",
                            "set_aside_corrupt",
                            &format!("{} -> {}: {e}", path.display(), aside.display()),
                        );
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StorageError::Unavailable {
                    reason: format!("{}: {e}", path.display()),
                }
                .into())
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>, key: &str) -> BeaconResult<()> {
        let write_err = |reason: String| StorageError::WriteFailed {
            key: key.to_string(),
            reason,
        };
        let raw = serde_json::to_string(entries).map_err(|e| write_err(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| write_err(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| write_err(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Apply `mutate` to a copy of the entries, persist it, and only then
    /// publish it to the cache. A failed write leaves the cache unchanged.
    fn mutate(
        &self,
        key: &str,
        mutate: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> BeaconResult<()> {
        let mut entries = self.entries.lock().map_err(|e| StorageError::Unavailable {
            reason: format!("file store lock poisoned: {e}"),
        })?;
        let mut next = entries.clone();
        mutate(&mut next);
        self.persist(&next, key)?;
        *entries = next;
        Ok(())
    }
}

impl IKeyValueStore for FileStore {
    fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        let entries = self.entries.lock().map_err(|e| StorageError::ReadFailed {
            key: key.to_string(),
            reason: format!("file store lock poisoned: {e}"),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        self.mutate(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> BeaconResult<()> {
        self.mutate(key, |entries| {
            entries.remove(key);
        })
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> BeaconResult<()> {
        let label = pairs.first().map(|(k, _)| *k).unwrap_or_default();
        self.mutate(label, |entries| {
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.to_string());
            }
        })
    }
}
