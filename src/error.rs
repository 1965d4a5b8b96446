use std::path::PathBuf;

use thiserror::Error;

use crate::capability::{BoxError, Capability};
use crate::duration::DurationError;
use crate::path::FieldPath;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum ExemplarError {
    #[error("target must be a struct, got {type_name}")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(
            code(exemplar::invalid_shape),
            help("pass a mutable reference to a struct that implements `Example`")
        )
    )]
    InvalidShape { type_name: &'static str },

    #[error("assigning to {path} failed: converting '{value}' to type {type_name}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(exemplar::field_assign)))]
    FieldAssign {
        field: &'static str,
        path: FieldPath,
        type_name: &'static str,
        value: String,
        source: CoerceError,
    },

    #[error("Failed to read {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(exemplar::io)))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(exemplar::toml)))]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Why a single source string could not be assigned to a field.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("invalid integer syntax '{value}'")]
    InvalidInt { value: String },

    #[error("'{value}' is out of range for a {bits}-bit integer")]
    IntOutOfRange { value: String, bits: u32 },

    #[error("invalid float syntax '{value}': {source}")]
    InvalidFloat {
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error("invalid boolean syntax '{value}'")]
    InvalidBool { value: String },

    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error("invalid map item: {pair:?}")]
    InvalidMapItem { pair: String },

    #[error("cannot allocate a sequence of {len} elements")]
    SequenceTooLong { len: usize },

    #[error("expected at most {expected} elements, found {found}")]
    TooManyElements { expected: usize, found: usize },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ExemplarError>,
    },

    #[error("type has no {capability} capability")]
    CapabilityMissing { capability: Capability },

    #[error("{0}")]
    Custom(#[source] BoxError),
}
