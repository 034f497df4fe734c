//! Command definitions
//!
//! Represents requests sent to the manager, and the per-session
//! ActionID generator that tags them.

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{AmiError, Result};

/// Parameter name carrying the action
pub const ACTION: &str = "Action";

/// Parameter name carrying the correlation identifier
pub const ACTION_ID: &str = "ActionID";

/// A request: an action plus ordered parameters
///
/// Parameter names keep the caller's casing on the wire. `Action` is always
/// the first parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    params: IndexMap<String, String>,
}

impl Command {
    /// Create a command for the given action
    pub fn new(action: impl Into<String>) -> Self {
        let mut params = IndexMap::new();
        params.insert(ACTION.to_string(), action.into());
        Self { params }
    }

    /// Add a parameter (builder style)
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a parameter. A name equal to an existing one ignoring case
    /// replaces that value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                if let Some((_, slot)) = self.params.get_index_mut(index) {
                    *slot = value;
                }
            }
            None => {
                self.params.insert(name, value);
            }
        }
    }

    /// Attach a caller-chosen ActionID
    pub fn with_action_id(self, id: impl Into<String>) -> Self {
        self.param(ACTION_ID, id)
    }

    pub fn action(&self) -> &str {
        self.get(ACTION).unwrap_or_default()
    }

    /// The caller-supplied ActionID, if any
    pub fn action_id(&self) -> Option<&str> {
        self.get(ACTION_ID)
    }

    /// Look up a parameter, ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.params.get_index(i))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` in insertion order
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check that the command can be framed without corrupting the stream
    pub fn validate(&self) -> Result<()> {
        if self.action().trim().is_empty() {
            return Err(AmiError::transport("command has no action"));
        }
        for (name, value) in self.params() {
            if name.trim().is_empty() {
                return Err(AmiError::transport(format!(
                    "{}: empty parameter name",
                    self.action()
                )));
            }
            if name.contains([':', '\r', '\n']) {
                return Err(AmiError::transport(format!(
                    "{}: invalid parameter name {:?}",
                    self.action(),
                    name
                )));
            }
            if value.contains(['\r', '\n']) {
                return Err(AmiError::transport(format!(
                    "{}: line break in value of {}",
                    self.action(),
                    name
                )));
            }
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.params
            .keys()
            .position(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Generates `<prefix>-<counter>` ActionIDs, unique within a session
#[derive(Debug, Clone)]
pub struct ActionIdGenerator {
    prefix: String,
    counter: u64,
}

impl ActionIdGenerator {
    /// Random prefix, counter seeded from the wall clock
    pub fn new() -> Self {
        let mut prefix = Uuid::new_v4().simple().to_string();
        prefix.truncate(13);
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::with_seed(prefix, seed)
    }

    /// Fixed prefix and starting counter
    pub fn with_seed(prefix: impl Into<String>, counter: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Return the current id and advance the counter
    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.counter);
        self.counter = self.counter.wrapping_add(1);
        id
    }
}

impl Default for ActionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
