//! Custom decoding capabilities.
//!
//! A type can take over its own conversion from a source string by
//! implementing one of four traits. When a type implements more than one,
//! exactly one is used, chosen by strict priority:
//!
//! 1. [`Decode`]
//! 2. [`Set`]
//! 3. [`UnmarshalText`]
//! 4. [`UnmarshalBinary`] (receives the string's raw bytes)
//!
//! The traits are collected into a [`Capabilities`] table of function
//! pointers. Derived `Example` impls build the table with the
//! [`capabilities!`](crate::capabilities) macro, which detects the traits a
//! concrete type implements at compile time. Hand-written impls can build it
//! explicitly with [`Capabilities::none`] and the `with_*` methods.

use std::fmt;
use std::marker::PhantomData;

use crate::error::CoerceError;

/// Boxed error returned by capability implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type TextHook<T> = fn(&mut T, &str) -> Result<(), BoxError>;
type BytesHook<T> = fn(&mut T, &[u8]) -> Result<(), BoxError>;

/// Decode a value from its source string. Highest priority.
pub trait Decode {
    type Error: Into<BoxError>;

    fn decode(&mut self, value: &str) -> Result<(), Self::Error>;
}

/// Set a value from its source string. Same role as [`Decode`], one step
/// lower in priority.
pub trait Set {
    type Error: Into<BoxError>;

    fn set(&mut self, value: &str) -> Result<(), Self::Error>;
}

/// Parse a value from its textual form.
pub trait UnmarshalText {
    type Error: Into<BoxError>;

    fn unmarshal_text(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Parse a value from the raw bytes of its source string. Lowest priority.
pub trait UnmarshalBinary {
    type Error: Into<BoxError>;

    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// The capability selected for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Decode,
    Set,
    Text,
    Binary,
    /// No custom decoding; built-in coercion applies.
    None,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Decode => "decode",
            Capability::Set => "set",
            Capability::Text => "text-unmarshal",
            Capability::Binary => "binary-unmarshal",
            Capability::None => "none",
        };
        f.write_str(name)
    }
}

/// The custom decoding hooks available for `T`.
pub struct Capabilities<T> {
    decode: Option<TextHook<T>>,
    set: Option<TextHook<T>>,
    text: Option<TextHook<T>>,
    binary: Option<BytesHook<T>>,
}

impl<T> Default for Capabilities<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for Capabilities<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("decode", &self.decode.is_some())
            .field("set", &self.set.is_some())
            .field("text", &self.text.is_some())
            .field("binary", &self.binary.is_some())
            .finish()
    }
}

impl<T> Capabilities<T> {
    /// A table with no hooks: the type uses built-in coercion.
    pub const fn none() -> Self {
        Self {
            decode: None,
            set: None,
            text: None,
            binary: None,
        }
    }

    #[doc(hidden)]
    pub fn from_hooks(
        decode: Option<TextHook<T>>,
        set: Option<TextHook<T>>,
        text: Option<TextHook<T>>,
        binary: Option<BytesHook<T>>,
    ) -> Self {
        Self {
            decode,
            set,
            text,
            binary,
        }
    }

    pub fn with_decode(mut self) -> Self
    where
        T: Decode,
    {
        self.decode = Some(decode_hook::<T>);
        self
    }

    pub fn with_set(mut self) -> Self
    where
        T: Set,
    {
        self.set = Some(set_hook::<T>);
        self
    }

    pub fn with_text(mut self) -> Self
    where
        T: UnmarshalText,
    {
        self.text = Some(text_hook::<T>);
        self
    }

    pub fn with_binary(mut self) -> Self
    where
        T: UnmarshalBinary,
    {
        self.binary = Some(binary_hook::<T>);
        self
    }

    /// The highest-priority capability present.
    pub fn resolve(&self) -> Capability {
        if self.decode.is_some() {
            Capability::Decode
        } else if self.set.is_some() {
            Capability::Set
        } else if self.text.is_some() {
            Capability::Text
        } else if self.binary.is_some() {
            Capability::Binary
        } else {
            Capability::None
        }
    }

    /// Run one capability's conversion on `target`.
    ///
    /// Errors from the hook are returned as [`CoerceError::Custom`] without
    /// modification.
    pub fn invoke(
        &self,
        target: &mut T,
        capability: Capability,
        value: &str,
    ) -> Result<(), CoerceError> {
        let outcome = match capability {
            Capability::Decode => self.decode.map(|hook| hook(target, value)),
            Capability::Set => self.set.map(|hook| hook(target, value)),
            Capability::Text => self.text.map(|hook| hook(target, value)),
            Capability::Binary => self.binary.map(|hook| hook(target, value.as_bytes())),
            Capability::None => None,
        };
        match outcome {
            Some(result) => result.map_err(CoerceError::Custom),
            None => Err(CoerceError::CapabilityMissing { capability }),
        }
    }
}

fn decode_hook<T: Decode>(target: &mut T, value: &str) -> Result<(), BoxError> {
    target.decode(value).map_err(Into::into)
}

fn set_hook<T: Set>(target: &mut T, value: &str) -> Result<(), BoxError> {
    target.set(value).map_err(Into::into)
}

fn text_hook<T: UnmarshalText>(target: &mut T, value: &str) -> Result<(), BoxError> {
    target.unmarshal_text(value).map_err(Into::into)
}

fn binary_hook<T: UnmarshalBinary>(target: &mut T, data: &[u8]) -> Result<(), BoxError> {
    target.unmarshal_binary(data).map_err(Into::into)
}

// Compile-time detection. `(&Probe::<T>::new()).decode_hook()` resolves to the
// `Via*` impl when `T` implements the trait, and falls back to the `No*` impl
// one autoref step later when it does not. Only works on concrete types, which
// is why it lives behind a macro expanded at the impl site.

#[doc(hidden)]
pub struct Probe<T>(PhantomData<T>);

impl<T> Probe<T> {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Probe(PhantomData)
    }
}

#[doc(hidden)]
pub trait ViaDecode<T> {
    fn decode_hook(&self) -> Option<TextHook<T>>;
}

impl<T: Decode> ViaDecode<T> for Probe<T> {
    fn decode_hook(&self) -> Option<TextHook<T>> {
        Some(decode_hook::<T>)
    }
}

#[doc(hidden)]
pub trait NoDecode<T> {
    fn decode_hook(&self) -> Option<TextHook<T>> {
        None
    }
}

impl<T> NoDecode<T> for &Probe<T> {}

#[doc(hidden)]
pub trait ViaSet<T> {
    fn set_hook(&self) -> Option<TextHook<T>>;
}

impl<T: Set> ViaSet<T> for Probe<T> {
    fn set_hook(&self) -> Option<TextHook<T>> {
        Some(set_hook::<T>)
    }
}

#[doc(hidden)]
pub trait NoSet<T> {
    fn set_hook(&self) -> Option<TextHook<T>> {
        None
    }
}

impl<T> NoSet<T> for &Probe<T> {}

#[doc(hidden)]
pub trait ViaText<T> {
    fn text_hook(&self) -> Option<TextHook<T>>;
}

impl<T: UnmarshalText> ViaText<T> for Probe<T> {
    fn text_hook(&self) -> Option<TextHook<T>> {
        Some(text_hook::<T>)
    }
}

#[doc(hidden)]
pub trait NoText<T> {
    fn text_hook(&self) -> Option<TextHook<T>> {
        None
    }
}

impl<T> NoText<T> for &Probe<T> {}

#[doc(hidden)]
pub trait ViaBinary<T> {
    fn binary_hook(&self) -> Option<BytesHook<T>>;
}

impl<T: UnmarshalBinary> ViaBinary<T> for Probe<T> {
    fn binary_hook(&self) -> Option<BytesHook<T>> {
        Some(binary_hook::<T>)
    }
}

#[doc(hidden)]
pub trait NoBinary<T> {
    fn binary_hook(&self) -> Option<BytesHook<T>> {
        None
    }
}

impl<T> NoBinary<T> for &Probe<T> {}

/// Build the [`Capabilities`] table of a concrete type by detecting which of
/// the four capability traits it implements.
///
/// ```ignore
/// impl exemplar::Example for Level {
///     fn capability(&self) -> exemplar::Capability {
///         exemplar::capabilities!(Self).resolve()
///     }
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! capabilities {
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::__private::{
            NoBinary as _, NoDecode as _, NoSet as _, NoText as _, ViaBinary as _,
            ViaDecode as _, ViaSet as _, ViaText as _,
        };
        $crate::Capabilities::<$ty>::from_hooks(
            (&$crate::__private::Probe::<$ty>::new()).decode_hook(),
            (&$crate::__private::Probe::<$ty>::new()).set_hook(),
            (&$crate::__private::Probe::<$ty>::new()).text_hook(),
            (&$crate::__private::Probe::<$ty>::new()).binary_hook(),
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Journal {
        calls: Vec<&'static str>,
    }

    impl Decode for Journal {
        type Error = String;

        fn decode(&mut self, _value: &str) -> Result<(), String> {
            self.calls.push("decode");
            Ok(())
        }
    }

    impl Set for Journal {
        type Error = String;

        fn set(&mut self, _value: &str) -> Result<(), String> {
            self.calls.push("set");
            Ok(())
        }
    }

    impl UnmarshalText for Journal {
        type Error = String;

        fn unmarshal_text(&mut self, _text: &str) -> Result<(), String> {
            self.calls.push("text");
            Ok(())
        }
    }

    impl UnmarshalBinary for Journal {
        type Error = String;

        fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), String> {
            if data.is_empty() {
                return Err("empty payload".into());
            }
            self.calls.push("binary");
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Plain;

    #[derive(Debug, Default)]
    struct TextOnly(String);

    impl UnmarshalText for TextOnly {
        type Error = std::convert::Infallible;

        fn unmarshal_text(&mut self, text: &str) -> Result<(), Self::Error> {
            self.0 = text.to_uppercase();
            Ok(())
        }
    }

    #[test]
    fn none_resolves_to_none() {
        assert_eq!(Capabilities::<Journal>::none().resolve(), Capability::None);
    }

    #[test]
    fn priority_is_decode_set_text_binary() {
        let all = Capabilities::<Journal>::none()
            .with_binary()
            .with_text()
            .with_set()
            .with_decode();
        assert_eq!(all.resolve(), Capability::Decode);

        let no_decode = Capabilities::<Journal>::none()
            .with_binary()
            .with_text()
            .with_set();
        assert_eq!(no_decode.resolve(), Capability::Set);

        let text_and_binary = Capabilities::<Journal>::none().with_binary().with_text();
        assert_eq!(text_and_binary.resolve(), Capability::Text);

        let binary = Capabilities::<Journal>::none().with_binary();
        assert_eq!(binary.resolve(), Capability::Binary);
    }

    #[test]
    fn invoke_runs_only_the_resolved_hook() {
        let caps = Capabilities::<Journal>::none().with_set().with_text();
        let mut journal = Journal::default();
        caps.invoke(&mut journal, caps.resolve(), "x").unwrap();
        assert_eq!(journal.calls, vec!["set"]);
    }

    #[test]
    fn binary_hook_receives_bytes_and_errors_pass_through() {
        let caps = Capabilities::<Journal>::none().with_binary();
        let mut journal = Journal::default();
        let err = caps
            .invoke(&mut journal, Capability::Binary, "")
            .unwrap_err();
        assert!(matches!(err, CoerceError::Custom(_)));
        assert_eq!(err.to_string(), "empty payload");
    }

    #[test]
    fn invoke_missing_capability_errors() {
        let caps = Capabilities::<Journal>::none();
        let mut journal = Journal::default();
        let err = caps
            .invoke(&mut journal, Capability::Decode, "x")
            .unwrap_err();
        assert!(matches!(
            err,
            CoerceError::CapabilityMissing {
                capability: Capability::Decode
            }
        ));
    }

    #[test]
    fn macro_detects_all_traits() {
        assert_eq!(capabilities!(Journal).resolve(), Capability::Decode);
    }

    #[test]
    fn macro_detects_no_traits() {
        assert_eq!(capabilities!(Plain).resolve(), Capability::None);
    }

    #[test]
    fn macro_detects_text_only() {
        let caps = capabilities!(TextOnly);
        assert_eq!(caps.resolve(), Capability::Text);
        let mut value = TextOnly::default();
        caps.invoke(&mut value, Capability::Text, "abc").unwrap();
        assert_eq!(value.0, "ABC");
    }
}
