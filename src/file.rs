//! Field values from TOML documents.
//!
//! A document is flattened into dotted keys once, when the source is built:
//!
//! | TOML                               | Key            | Source string |
//! |------------------------------------|----------------|---------------|
//! | `port = 8080`                      | `port`         | `8080`        |
//! | `[database]` `url = "pg://"`       | `database.url` | `pg://`       |
//! | `tags = ["a", "b"]`                | `tags`         | `a,b`         |
//! | `[labels]` `env = "prod"`          | `labels`       | `env:prod`    |
//! | `[[servers]]` `port = 81` (twice)  | `servers`      | `len=2`       |
//! |                                    | `servers.0.port` | `81`        |
//!
//! Scalar arrays feed fixed-size arrays, tables of scalars feed maps, and
//! arrays of tables feed sequences of structs.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use log::debug;
use toml::{Table, Value};

use crate::error::ExemplarError;
use crate::path::FieldPath;
use crate::source::Source;
use crate::tag::Tag;

#[derive(Debug, Clone, Default)]
pub struct TomlSource {
    values: HashMap<String, String>,
}

impl TomlSource {
    pub fn from_table(table: &Table) -> Self {
        let mut values = HashMap::new();
        flatten_table(table, "", &mut values);
        Self { values }
    }

    /// Parse a TOML document held in memory.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let table: Table = content.parse()?;
        Ok(Self::from_table(&table))
    }

    /// Read and parse a TOML file. I/O and syntax errors report the path.
    pub fn from_path(path: &Path) -> Result<Self, ExemplarError> {
        let content = std::fs::read_to_string(path).map_err(|source| ExemplarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_file(path, &content)
    }

    /// Like [`from_path`](Self::from_path), but a missing file is `Ok(None)`.
    /// Only actual I/O errors (permissions, etc.) are propagated.
    pub fn from_optional_path(path: &Path) -> Result<Option<Self>, ExemplarError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_file(path, &content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(ExemplarError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn parse_file(path: &Path, content: &str) -> Result<Self, ExemplarError> {
        let source = Self::parse(content).map_err(|source| ExemplarError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded {} keys from {}", source.values.len(), path.display());
        Ok(source)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl Source for TomlSource {
    fn lookup(&self, path: &FieldPath, _tag: &Tag) -> Option<Cow<'_, str>> {
        self.get(&path.to_string()).map(Cow::Borrowed)
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn flatten_table(table: &Table, prefix: &str, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        flatten_value(value, &join_key(prefix, key), out);
    }
}

fn flatten_value(value: &Value, key: &str, out: &mut HashMap<String, String>) {
    if let Some(text) = scalar_text(value) {
        out.insert(key.to_string(), text);
        return;
    }
    match value {
        Value::Table(table) => {
            let pairs: Option<Vec<String>> = table
                .iter()
                .map(|(k, v)| scalar_text(v).map(|text| format!("{k}:{text}")))
                .collect();
            if let Some(pairs) = pairs {
                out.insert(key.to_string(), pairs.join(","));
            }
            flatten_table(table, key, out);
        }
        Value::Array(items) => {
            let scalars: Option<Vec<String>> = items.iter().map(scalar_text).collect();
            match scalars {
                Some(scalars) => {
                    out.insert(key.to_string(), scalars.join(","));
                }
                None => {
                    out.insert(key.to_string(), format!("len={}", items.len()));
                    for (index, item) in items.iter().enumerate() {
                        flatten_value(item, &join_key(key, &index.to_string()), out);
                    }
                }
            }
        }
        _ => {}
    }
}
