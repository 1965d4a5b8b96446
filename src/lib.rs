//! Populate Rust structs from per-field example values. Annotate a struct,
//! derive `Example`, and go.
//!
//! Exemplar walks a struct's fields, finds a source string for each one, and
//! converts that string into the field's type. Nested structs are flattened,
//! empty `Option`s of structs are allocated so their fields can be filled,
//! and types can take over their own conversion through four capability
//! traits.
//!
//! ```ignore
//! #[derive(Default, exemplar::Example)]
//! struct Server {
//!     #[example("localhost")]
//!     host: String,
//!     #[example(8080)]
//!     port: u16,
//!     #[example("1m30s")]
//!     timeout: std::time::Duration,
//!     database: Database,
//! }
//!
//! let mut server = Server::default();
//! exemplar::populate(&mut server)?;
//! ```
//!
//! That single call fills every tagged field from its tag, recursing into
//! `database`.
//!
//! # Design: the struct is the schema
//!
//! The derive turns the struct declaration into everything the engine needs:
//!
//! - **`#[example("...")]`** (or `#[example(default = ...)]`, or a bare
//!   integer/float/bool literal) is the field's default source string, the
//!   lowest layer.
//! - **`#[example(ignored)]`** removes a field from population entirely. Its
//!   type does not need to implement [`Example`].
//! - **Nested structs** are flattened: their fields are populated as if they
//!   were declared on the parent, under a dotted path (`database.url`).
//! - **`Option<T>` fields** stay `None` unless a value is found for them.
//!   `Option<Struct>` is always allocated, so its own defaults apply.
//!
//! Hand-written [`Example`] impls are supported for types the derive cannot
//! describe. See the [`value`] module.
//!
//! # Source string grammar
//!
//! | Field type                 | Example input                 |
//! |----------------------------|-------------------------------|
//! | `String`                   | `anything at all`             |
//! | `i8`..`i64`, `isize`       | `-12`, `0x1F`, `0o17`, `017`, `0b101`, `1_000` |
//! | `u8`..`u64`, `usize`       | `255`, `0xff` (no sign)       |
//! | `bool`                     | `1 t T TRUE true True` / `0 f F FALSE false False` |
//! | `f32`, `f64`               | `0.25`, `-1e3`                |
//! | `Duration`                 | `300ms`, `1.5h`, `2h45m`, `0` |
//! | `Vec<T>`                   | `len=3`                       |
//! | `[T; N]`                   | `2,3,5,6`                     |
//! | `HashMap`/`BTreeMap`       | `a:1,b:2`                     |
//!
//! `Vec<Struct>` elements are each populated from their own defaults (and
//! from any layered source answering for `field.<index>.*`). Elements of other
//! types stay default. Arrays of structs work the same way and ignore their
//! source string, unless the struct has a capability: then each positional
//! item is decoded by it.
//!
//! # Capabilities
//!
//! A type can own its conversion by implementing [`Decode`], [`Set`],
//! [`UnmarshalText`] or [`UnmarshalBinary`]. When a type implements more
//! than one, exactly the first in that order is used. A struct with a
//! capability is a single leaf and is not flattened. See the
//! [`capability`] module.
//!
//! # Layer precedence
//!
//! [`populate`] reads tags only. A [`Populator`] built with
//! [`Populator::builder()`] stacks more sources on top:
//!
//! ```text
//! Tag defaults          #[example("...")]
//!        ↑ overridden by
//! Custom sources        .source()
//!        ↑ overridden by
//! TOML files/tables     .toml_file() / .toml_table()
//!        ↑ overridden by
//! Environment vars      PREFIX__KEY
//!        ↑ overridden by
//! Overrides             .set_override()
//! ```
//!
//! Every layer is **sparse**: a layer without a value for a field falls
//! through to the one below, and a field no layer answers for is left as it
//! was.
//!
//! # Environment variables
//!
//! With env prefix `MYAPP`, variables map via double-underscore nesting:
//!
//! | Env var | Field path |
//! |---------|------------|
//! | `MYAPP__HOST` | `host` |
//! | `MYAPP__DATABASE__URL` | `database.url` |
//! | `MYAPP__PEERS__0__PORT` | `peers.0.port` |
//!
//! Values are not reinterpreted: the field's type decides how they parse.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`OverrideArgs`], a flattenable clap struct for `--config FILE` and
//! `--set KEY=VALUE`. To use exemplar without clap:
//!
//! ```toml
//! exemplar = { version = "...", default-features = false, features = ["derive"] }
//! ```
//!
//! # Error handling
//!
//! [`ExemplarError::InvalidShape`] reports a target that is not a struct.
//! [`ExemplarError::FieldAssign`] names the field, its type and the string
//! that failed, with the underlying [`CoerceError`] as its source. With the
//! `rich-errors` feature the errors also implement `miette::Diagnostic`.

extern crate self as exemplar;

pub mod capability;
pub mod error;
pub mod value;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod discover;
mod duration;
mod dynamic;
mod env;
mod file;
mod overrides;
mod parse;
mod path;
mod populate;
mod source;
mod tag;

#[cfg(all(test, feature = "derive"))]
mod fixtures;

pub use builder::PopulatorBuilder;
pub use capability::{
    BoxError, Capabilities, Capability, Decode, Set, UnmarshalBinary, UnmarshalText,
};
#[cfg(feature = "clap")]
pub use cli::OverrideArgs;
pub use coerce::coerce;
pub use discover::{FieldDescriptor, discover};
pub use duration::DurationError;
pub use dynamic::{AnyExample, Dynamic};
pub use env::EnvSource;
pub use error::{CoerceError, ExemplarError};
pub use file::TomlSource;
pub use overrides::Overrides;
pub use path::FieldPath;
pub use populate::{Populator, must_populate, populate};
pub use source::{Source, Tags};
pub use tag::Tag;
pub use value::{
    Array, Example, Field, FloatSlot, IntSlot, Mapping, Pointer, Sequence, Struct, Target,
    UintSlot,
};

#[cfg(feature = "derive")]
pub use exemplar_derive::Example;

#[doc(hidden)]
pub mod __private {
    pub use crate::capability::{
        NoBinary, NoDecode, NoSet, NoText, Probe, ViaBinary, ViaDecode, ViaSet, ViaText,
    };
}
