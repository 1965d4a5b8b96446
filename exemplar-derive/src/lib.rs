//! Derive macro for exemplar's `Example` trait.
//!
//! Use it through the `exemplar` crate (`exemplar::Example`), which
//! re-exports it behind the `derive` feature.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attr;
mod expand;

/// Derive `exemplar::Example` (and `exemplar::Struct` for named-field structs).
///
/// # Shapes
///
/// - Structs with named fields are populated field by field, in declaration
///   order.
/// - Single-field tuple structs take the shape of their field.
/// - Enums, unit structs and other tuple structs are opaque: only a custom
///   capability can assign to them.
///
/// In every case the type's own `Decode`/`Set`/`UnmarshalText`/
/// `UnmarshalBinary` impls are detected and used first.
///
/// # Field attributes
///
/// - `#[example("value")]`, `#[example(8080)]`, `#[example(-1.5)]`,
///   `#[example(true)]`: the field's default source string
/// - `#[example = "value"]`, `#[example(default = "value")]`: same
/// - `#[example(ignored)]`: skip the field; its type need not implement
///   `Example`
///
/// ```ignore
/// #[derive(Default, exemplar::Example)]
/// struct Server {
///     #[example("localhost")]
///     host: String,
///
///     #[example(8080)]
///     port: u16,
///
///     #[example(ignored)]
///     handle: Option<std::fs::File>,
/// }
/// ```
#[proc_macro_derive(Example, attributes(example))]
pub fn derive_example(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
