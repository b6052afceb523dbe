use std::collections::BTreeSet;

use beacon_core::constants::PII_KEYS;

/// Set of property keys that must never leave the client.
///
/// Always contains the built-in PII keys; configuration can only add to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    keys: BTreeSet<String>,
}

impl Denylist {
    /// The built-in keys only.
    pub fn builtin() -> Self {
        Self {
            keys: PII_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Built-in keys plus `extra`. Blank entries are ignored.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::builtin();
        for key in extra {
            let key = key.as_ref();
            if !key.trim().is_empty() {
                list.keys.insert(key.to_string());
            }
        }
        list
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::builtin()
    }
}
