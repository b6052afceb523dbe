use crate::errors::BeaconResult;

/// String key-value persistence, the shape of browser local storage.
///
/// Implementations must make each call individually atomic. No ordering is
/// promised between writers in different processes sharing one backing store.
pub trait IKeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> BeaconResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> BeaconResult<()>;
    fn remove(&self, key: &str) -> BeaconResult<()>;

    /// Write several keys at once. The default writes them one by one;
    /// backends that can persist them in a single operation should override.
    fn set_many(&self, entries: &[(&str, &str)]) -> BeaconResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}
