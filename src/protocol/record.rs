//! Record definitions
//!
//! One parsed block of `Key: Value` lines (a reply or an event).

use std::fmt;

use indexmap::IndexMap;

/// Fields the server adds for its own bookkeeping rather than as payload
pub const TRANSPORT_FIELDS: [&str; 2] = ["response", "actionid"];

/// A parsed reply or event block
///
/// Keys are trimmed and lowercased; values are trimmed. Iteration follows the
/// order in which each key was first seen. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field; the key is matched case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(normalize_key(key).as_str())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(normalize_key(key).as_str())
    }

    /// The `event` field, present on event packets
    pub fn event(&self) -> Option<&str> {
        self.get("event")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(key, value)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// A copy of this record with the given keys removed
    pub fn without(&self, keys: &[&str]) -> Record {
        let removed: Vec<String> = keys.iter().map(|k| normalize_key(k)).collect();
        self.fields
            .iter()
            .filter(|(k, _)| !removed.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Consume the record into its underlying ordered map
    pub fn into_map(self) -> IndexMap<String, String> {
        self.fields
    }

    /// Insert with last-write-wins semantics; an existing key keeps its slot
    pub(crate) fn insert(&mut self, key: &str, value: &str) {
        self.fields
            .insert(normalize_key(key), value.trim().to_string());
    }

    /// Remove a field, returning its value
    pub(crate) fn take(&mut self, key: &str) -> Option<String> {
        self.fields.shift_remove(normalize_key(key).as_str())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            let key = key.as_ref();
            if !key.trim().is_empty() {
                record.insert(key, value.as_ref());
            }
        }
        record
    }
}

/// Renders as `key: value` lines
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
