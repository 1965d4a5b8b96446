//! Clap adapter.
//!
//! This module is the **optional integration layer** between the
//! framework-agnostic populator and the [clap](https://docs.rs/clap) CLI
//! parser. It is compiled only when the `clap` Cargo feature is enabled (on
//! by default).
//!
//! [`OverrideArgs`] can be flattened into any clap `#[derive(Parser)]`
//! struct to accept `--config FILE` and `--set KEY=VALUE` flags. Hand the
//! parsed args to [`PopulatorBuilder::cli_args`](crate::PopulatorBuilder::cli_args).

use std::path::PathBuf;

use clap::Args;

use crate::overrides::Overrides;

/// Clap-derived args for file and per-field overrides.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     overrides: OverrideArgs,
/// }
///
/// let cli = Cli::parse();
/// let populator = Populator::builder().cli_args(cli.overrides).build()?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct OverrideArgs {
    /// Read field values from a TOML file. Repeatable; later files win.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Override one field by dotted path (e.g. "database.url=pg://db").
    /// Repeatable; the last one for a key wins.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

impl OverrideArgs {
    /// The `--set` pairs, in command-line order.
    pub fn into_overrides(self) -> Overrides {
        self.set.into_iter().collect()
    }
}

/// Split `KEY=VALUE` at the first `=`. The value may be empty or contain
/// further `=` characters; the key may not be empty.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the flattened args.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        overrides: OverrideArgs,
    }

    fn parse(args: &[&str]) -> OverrideArgs {
        TestCli::try_parse_from(args).unwrap().overrides
    }

    #[test]
    fn parse_nothing() {
        let args = parse(&["test"]);
        assert_eq!(args, OverrideArgs::default());
        assert!(args.into_overrides().is_empty());
    }

    #[test]
    fn parse_single_set() {
        let args = parse(&["test", "--set", "port=3000"]);
        assert_eq!(args.set, vec![("port".to_string(), "3000".to_string())]);
    }

    #[test]
    fn parse_repeated_set_keeps_order() {
        let args = parse(&["test", "--set", "port=1", "--set", "database.url=pg://", "--set", "port=2"]);
        let overrides = args.into_overrides();
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides.get("port"), Some("2"));
        assert_eq!(overrides.get("database.url"), Some("pg://"));
    }

    #[test]
    fn value_may_contain_equals_or_be_empty() {
        let args = parse(&["test", "--set", "query=a=b", "--set", "name="]);
        assert_eq!(
            args.set,
            vec![
                ("query".to_string(), "a=b".to_string()),
                ("name".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn missing_equals_errors() {
        let result = TestCli::try_parse_from(["test", "--set", "port"]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_key_errors() {
        let result = TestCli::try_parse_from(["test", "--set", "=3"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_config_files() {
        let args = parse(&["test", "-c", "base.toml", "--config", "local.toml"]);
        assert_eq!(
            args.config,
            vec![PathBuf::from("base.toml"), PathBuf::from("local.toml")]
        );
    }
}
