use std::path::PathBuf;

use log::debug;

use crate::env::EnvSource;
use crate::error::ExemplarError;
use crate::file::TomlSource;
use crate::overrides::Overrides;
use crate::populate::Populator;
use crate::source::{Source, Tags};

enum FileLayer {
    Loaded(TomlSource),
    Required(PathBuf),
    Optional(PathBuf),
}

enum EnvLayer {
    Process(String),
    Vars(String, Vec<(String, String)>),
}

/// Builder for a layered [`Populator`].
///
/// Layers are consulted in priority-ascending order, the last one that has
/// a value for a field wins:
///
/// ```text
/// Tag defaults          #[example("...")]
///        ↑ overridden by
/// Custom sources        .source(), in the order added
///        ↑ overridden by
/// TOML files/tables     .toml_file() / .toml_table(), in the order added
///        ↑ overridden by
/// Environment vars      PREFIX__KEY
///        ↑ overridden by
/// Overrides             .set_override()
/// ```
pub struct PopulatorBuilder {
    tags: bool,
    sources: Vec<Box<dyn Source>>,
    files: Vec<FileLayer>,
    env: Option<EnvLayer>,
    overrides: Overrides,
    coerce_missing: bool,
}

impl Default for PopulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulatorBuilder {
    pub fn new() -> Self {
        Self {
            tags: true,
            sources: Vec::new(),
            files: Vec::new(),
            env: None,
            overrides: Overrides::new(),
            coerce_missing: false,
        }
    }

    /// Do not read tag defaults.
    pub fn no_tags(mut self) -> Self {
        self.tags = false;
        self
    }

    /// Add a custom source above the tag defaults.
    pub fn source<S: Source + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add an in-memory TOML table.
    pub fn toml_table(mut self, table: &toml::Table) -> Self {
        self.files
            .push(FileLayer::Loaded(TomlSource::from_table(table)));
        self
    }

    /// Add a TOML file, read on [`build`](Self::build). A missing file is an
    /// error.
    pub fn toml_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(FileLayer::Required(path.into()));
        self
    }

    /// Add a TOML file that is silently skipped when it does not exist.
    pub fn toml_file_if_exists(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(FileLayer::Optional(path.into()));
        self
    }

    /// Add `{app_name}.toml` from the platform config directory (XDG on
    /// Linux, `~/Library/Application Support` on macOS), skipped when absent.
    pub fn platform_file(self, app_name: &str) -> Self {
        match directories::ProjectDirs::from("", "", app_name) {
            Some(dirs) => {
                let path = dirs.config_dir().join(format!("{app_name}.toml"));
                self.toml_file_if_exists(path)
            }
            None => {
                debug!("no platform config directory for {app_name}");
                self
            }
        }
    }

    /// Read `{prefix}__*` variables from the process environment on
    /// [`build`](Self::build).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env = Some(EnvLayer::Process(prefix.to_string()));
        self
    }

    /// Like [`env_prefix`](Self::env_prefix), but with explicit variables
    /// instead of `std::env::vars()`.
    pub fn env_vars(
        mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.env = Some(EnvLayer::Vars(prefix.to_string(), vars.into_iter().collect()));
        self
    }

    /// Override one field by dotted path. Later calls take precedence.
    pub fn set_override(mut self, key: &str, value: impl Into<String>) -> Self {
        self.overrides.push(key, value);
        self
    }

    /// Add an override. `None` values are ignored (useful for optional clap args).
    pub fn cli_override<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push(key, v.to_string());
        }
        self
    }

    /// Add several overrides, in order.
    pub fn overrides<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides.extend(entries);
        self
    }

    /// Add the `--config FILE` files and `--set KEY=VALUE` pairs parsed by
    /// clap. The files are required to exist.
    #[cfg(feature = "clap")]
    pub fn cli_args(mut self, args: crate::cli::OverrideArgs) -> Self {
        for path in &args.config {
            self = self.toml_file(path);
        }
        self.overrides(args.into_overrides())
    }

    /// Coerce the empty string into fields no layer has a value for, instead
    /// of leaving them untouched.
    pub fn coerce_missing(mut self, enabled: bool) -> Self {
        self.coerce_missing = enabled;
        self
    }

    /// Read files and environment variables and assemble the populator.
    pub fn build(self) -> Result<Populator, ExemplarError> {
        let mut layers: Vec<Box<dyn Source>> = Vec::new();
        if self.tags {
            layers.push(Box::new(Tags));
        }
        layers.extend(self.sources);

        for file in self.files {
            let source = match file {
                FileLayer::Loaded(source) => source,
                FileLayer::Required(path) => TomlSource::from_path(&path)?,
                FileLayer::Optional(path) => match TomlSource::from_optional_path(&path)? {
                    Some(source) => source,
                    None => continue,
                },
            };
            layers.push(Box::new(source));
        }

        match self.env {
            Some(EnvLayer::Process(prefix)) => layers.push(Box::new(EnvSource::from_env(&prefix))),
            Some(EnvLayer::Vars(prefix, vars)) => {
                layers.push(Box::new(EnvSource::from_vars(&prefix, vars)))
            }
            None => {}
        }

        if !self.overrides.is_empty() {
            layers.push(Box::new(self.overrides));
        }

        debug!("built populator with {} layers", layers.len());
        Ok(Populator::from_layers(layers, self.coerce_missing))
    }
}
