//! Programmatic overrides keyed by dotted field path.
//!
//! `("database.url", "pg://...")` answers for the `url` field of the nested
//! `database` struct. Sequence elements use their index as a segment
//! (`servers.0.port`).

use std::borrow::Cow;

use crate::path::FieldPath;
use crate::source::Source;
use crate::tag::Tag;

/// An ordered list of `(dotted key, value)` overrides.
///
/// If multiple entries target the same key, the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: Vec<(String, String)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The value for `key`, honouring last-one-wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        overrides.extend(iter);
        overrides
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Overrides {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl IntoIterator for Overrides {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Source for Overrides {
    fn lookup(&self, path: &FieldPath, _tag: &Tag) -> Option<Cow<'_, str>> {
        self.get(&path.to_string()).map(Cow::Borrowed)
    }
}
