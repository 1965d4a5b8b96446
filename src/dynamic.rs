//! Fields whose shape is only known at runtime.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::capability::Capability;
use crate::error::CoerceError;
use crate::value::{Example, FloatSlot, IntSlot, Target, UintSlot};

/// An [`Example`] that can be recovered as its concrete type.
pub trait AnyExample: Example + Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Example + Any> AnyExample for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value whose shape is chosen when it is constructed rather than by its
/// declared type.
///
/// The variant in place when population starts decides how the value is
/// discovered and coerced: `Struct` is flattened like any nested struct,
/// `List` takes `len=N`, `Map` takes `k:v` pairs with string keys, and the
/// scalar variants parse their own grammar. `Null` has no shape and is left
/// alone.
#[derive(Default)]
pub enum Dynamic {
    #[default]
    Null,
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    List(Vec<Dynamic>),
    Map(BTreeMap<String, Dynamic>),
    Struct(Box<dyn AnyExample>),
}

impl Dynamic {
    pub fn structure<T: AnyExample>(value: T) -> Self {
        Dynamic::Struct(Box::new(value))
    }

    /// The held struct, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Dynamic::Struct(inner) => inner.as_any().downcast_ref(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Dynamic::Struct(inner) => inner.as_any_mut().downcast_mut(),
            _ => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => f.write_str("Null"),
            Dynamic::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Dynamic::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Dynamic::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Dynamic::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Dynamic::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Dynamic::List(v) => f.debug_tuple("List").field(v).finish(),
            Dynamic::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Dynamic::Struct(v) => f.debug_tuple("Struct").field(&v.type_name()).finish(),
        }
    }
}

impl Example for Dynamic {
    fn capability(&self) -> Capability {
        match self {
            Dynamic::Struct(inner) => inner.capability(),
            _ => Capability::None,
        }
    }

    fn invoke(&mut self, capability: Capability, value: &str) -> Result<(), CoerceError> {
        match self {
            Dynamic::Struct(inner) => inner.invoke(capability, value),
            _ => Err(CoerceError::CapabilityMissing { capability }),
        }
    }

    fn target(&mut self) -> Target<'_> {
        match self {
            Dynamic::Null => Target::Opaque,
            Dynamic::Str(v) => Target::Str(v),
            Dynamic::Int(v) => Target::Int(IntSlot::I64(v)),
            Dynamic::Uint(v) => Target::Uint(UintSlot::U64(v)),
            Dynamic::Float(v) => Target::Float(FloatSlot::F64(v)),
            Dynamic::Bool(v) => Target::Bool(v),
            Dynamic::List(v) => Target::Sequence(v),
            Dynamic::Map(v) => Target::Mapping(v),
            Dynamic::Struct(inner) => inner.target(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Struct(inner) => inner.type_name(),
            _ => std::any::type_name::<Self>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::coerce;

    #[test]
    fn scalars_parse_their_own_grammar() {
        let mut value = Dynamic::Int(0);
        coerce("-0x10", &mut value).unwrap();
        assert!(matches!(value, Dynamic::Int(-16)));

        let mut value = Dynamic::Bool(false);
        coerce("TRUE", &mut value).unwrap();
        assert!(matches!(value, Dynamic::Bool(true)));
    }

    #[test]
    fn null_is_left_alone() {
        let mut value = Dynamic::Null;
        coerce("anything", &mut value).unwrap();
        assert!(matches!(value, Dynamic::Null));
    }

    #[test]
    fn map_holds_dynamic_values() {
        let mut value = Dynamic::Map(BTreeMap::new());
        coerce("a:1,b:2", &mut value).unwrap();
        let Dynamic::Map(map) = &value else {
            panic!("expected a map");
        };
        // Fresh values are Null, which takes nothing.
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|v| matches!(v, Dynamic::Null)));
    }

    #[test]
    fn downcast_recovers_struct() {
        let mut value = Dynamic::structure(String::from("inner"));
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("inner"));
        assert!(value.downcast_ref::<u8>().is_none());
        if let Some(inner) = value.downcast_mut::<String>() {
            inner.push('!');
        }
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("inner!"));
        assert!(Dynamic::Null.downcast_ref::<String>().is_none());
    }
}
