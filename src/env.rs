use std::borrow::Cow;
use std::collections::HashMap;

use log::trace;

use crate::path::FieldPath;
use crate::source::Source;
use crate::tag::Tag;

/// Field values from environment variables matching `{PREFIX}__*`.
///
/// Double underscore `__` separates nesting levels.
/// Single `_` within a segment is literal (part of the field name).
/// Segments are matched case-insensitively against field names, so
/// `APP__DATABASE__POOL_SIZE` answers for `database.pool_size`.
///
/// Values are passed through as-is; the field's type decides how they parse.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    values: HashMap<String, String>,
}

impl EnvSource {
    /// Read the process environment.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
    pub fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let needle = format!("{prefix}__");
        let mut values = HashMap::new();

        for (key, value) in vars {
            let Some(rest) = key.strip_prefix(&needle) else {
                continue;
            };
            if rest.is_empty() || rest.split("__").any(str::is_empty) {
                continue;
            }
            let dotted = rest.split("__").collect::<Vec<_>>().join(".").to_lowercase();
            trace!("env {key} -> {dotted}");
            values.insert(dotted, value);
        }

        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Source for EnvSource {
    fn lookup(&self, path: &FieldPath, _tag: &Tag) -> Option<Cow<'_, str>> {
        self.values
            .get(&path.to_string().to_lowercase())
            .map(|value| Cow::Borrowed(value.as_str()))
    }
}
