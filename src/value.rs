//! How a value describes its shape to the engine.
//!
//! Every type the engine can populate implements [`Example`]. The trait has
//! two jobs:
//!
//! - report the type's custom decoding [`Capability`] (see
//!   [`capability`](crate::capability)), and
//! - expose a mutable [`Target`] view of the value, which tells the coercer
//!   what kind of value it is writing into.
//!
//! Implementations ship for the std primitives (`String`, all integer
//! widths, `bool`, `f32`/`f64`, [`Duration`]), pointers (`Option<T>`,
//! `Box<T>`), sequences (`Vec<T>`), fixed-size arrays, and maps (`HashMap`,
//! `BTreeMap`, and `IndexMap` behind the `indexmap` feature). Structs get
//! theirs from `#[derive(Example)]`.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use crate::capability::Capability;
use crate::discover::is_flattenable;
use crate::error::CoerceError;
use crate::tag::Tag;

/// A value the engine can populate.
pub trait Example {
    /// Whether values of this type are structs with their own fields.
    ///
    /// Used before a value exists, to decide whether an empty pointer to
    /// this type should be allocated during discovery.
    fn is_struct() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// The custom decoding capability this value uses, if any.
    fn capability(&self) -> Capability {
        Capability::None
    }

    /// Run the conversion of the given capability.
    fn invoke(&mut self, capability: Capability, _value: &str) -> Result<(), CoerceError> {
        Err(CoerceError::CapabilityMissing { capability })
    }

    /// A mutable view of the value's shape.
    fn target(&mut self) -> Target<'_>;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Mutable view of a value, by kind.
pub enum Target<'a> {
    Str(&'a mut String),
    Int(IntSlot<'a>),
    Uint(UintSlot<'a>),
    Bool(&'a mut bool),
    Float(FloatSlot<'a>),
    Duration(&'a mut Duration),
    Pointer(&'a mut dyn Pointer),
    Sequence(&'a mut dyn Sequence),
    Array(&'a mut dyn Array),
    Mapping(&'a mut dyn Mapping),
    Struct(&'a mut dyn Struct),
    /// A value with no shape the engine understands. Only capabilities can
    /// assign to it.
    Opaque,
}

pub enum IntSlot<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
}

impl IntSlot<'_> {
    pub fn bits(&self) -> u32 {
        match self {
            IntSlot::I8(_) => i8::BITS,
            IntSlot::I16(_) => i16::BITS,
            IntSlot::I32(_) => i32::BITS,
            IntSlot::I64(_) => i64::BITS,
            IntSlot::Isize(_) => isize::BITS,
        }
    }

    /// Store a value already range-checked against [`bits`](Self::bits).
    pub fn store(self, value: i64) {
        match self {
            IntSlot::I8(slot) => *slot = value as i8,
            IntSlot::I16(slot) => *slot = value as i16,
            IntSlot::I32(slot) => *slot = value as i32,
            IntSlot::I64(slot) => *slot = value,
            IntSlot::Isize(slot) => *slot = value as isize,
        }
    }
}

pub enum UintSlot<'a> {
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
}

impl UintSlot<'_> {
    pub fn bits(&self) -> u32 {
        match self {
            UintSlot::U8(_) => u8::BITS,
            UintSlot::U16(_) => u16::BITS,
            UintSlot::U32(_) => u32::BITS,
            UintSlot::U64(_) => u64::BITS,
            UintSlot::Usize(_) => usize::BITS,
        }
    }

    /// Store a value already range-checked against [`bits`](Self::bits).
    pub fn store(self, value: u64) {
        match self {
            UintSlot::U8(slot) => *slot = value as u8,
            UintSlot::U16(slot) => *slot = value as u16,
            UintSlot::U32(slot) => *slot = value as u32,
            UintSlot::U64(slot) => *slot = value,
            UintSlot::Usize(slot) => *slot = value as usize,
        }
    }
}

pub enum FloatSlot<'a> {
    F32(&'a mut f32),
    F64(&'a mut f64),
}

/// A struct's fields, in declaration order.
pub trait Struct {
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One declared field of a struct, borrowed from the live value.
pub struct Field<'a> {
    pub name: &'static str,
    pub tag: Tag,
    pub value: &'a mut dyn Example,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, tag: Tag, value: &'a mut dyn Example) -> Self {
        Self { name, tag, value }
    }
}

/// A possibly-empty owning pointer.
pub trait Pointer {
    fn is_null(&self) -> bool;

    fn pointee_is_struct(&self) -> bool;

    /// The pointee, allocated with its `Default` value first if empty.
    fn get_or_alloc(&mut self) -> &mut dyn Example;

    /// Make the pointer empty again. No-op for pointers that cannot be empty.
    fn reset(&mut self);
}

/// Callback filling one element of a freshly built sequence or array.
pub type FillElement<'f> = dyn FnMut(usize, &mut dyn Example) -> Result<(), CoerceError> + 'f;

/// Callback coercing one source string into a map key or value.
pub type CoerceEntry<'f> = dyn FnMut(&str, &mut dyn Example) -> Result<(), CoerceError> + 'f;

/// A growable sequence.
pub trait Sequence {
    /// Replace the contents with `len` default elements, each passed through
    /// `fill`. The existing contents are kept if any `fill` call fails.
    fn rebuild(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), CoerceError>;
}

/// A fixed-size array.
pub trait Array {
    fn size(&self) -> usize;

    /// Whether elements are structs populated field by field. Elements with
    /// a custom capability are not: they are coerced from a positional item.
    fn flattens_elements(&self) -> bool;

    /// Replace every element with a default one passed through `fill`. The
    /// existing contents are kept if any `fill` call fails.
    fn rebuild(&mut self, fill: &mut FillElement<'_>) -> Result<(), CoerceError>;
}

/// A key-value map.
pub trait Mapping {
    /// Replace the contents with `entries`, each side converted by `coerce`.
    /// Entries are inserted in order, so later duplicates win. The existing
    /// contents are kept if any conversion fails.
    fn rebuild(
        &mut self,
        entries: &[(&str, &str)],
        coerce: &mut CoerceEntry<'_>,
    ) -> Result<(), CoerceError>;
}

impl Example for String {
    fn target(&mut self) -> Target<'_> {
        Target::Str(self)
    }
}

impl Example for bool {
    fn target(&mut self) -> Target<'_> {
        Target::Bool(self)
    }
}

impl Example for Duration {
    fn target(&mut self) -> Target<'_> {
        Target::Duration(self)
    }
}

macro_rules! impl_slot {
    ($target:ident, $slot:ident, $($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Example for $ty {
                fn target(&mut self) -> Target<'_> {
                    Target::$target($slot::$variant(self))
                }
            }
        )*
    };
}

impl_slot!(Int, IntSlot, i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
impl_slot!(Uint, UintSlot, u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);
impl_slot!(Float, FloatSlot, f32 => F32, f64 => F64);

impl<T: Example + Default> Example for Option<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Pointer(self)
    }
}

impl<T: Example + Default> Pointer for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn pointee_is_struct(&self) -> bool {
        T::is_struct()
    }

    fn get_or_alloc(&mut self) -> &mut dyn Example {
        self.get_or_insert_with(T::default)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl<T: Example> Example for Box<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Pointer(self)
    }
}

impl<T: Example> Pointer for Box<T> {
    fn is_null(&self) -> bool {
        false
    }

    fn pointee_is_struct(&self) -> bool {
        T::is_struct()
    }

    fn get_or_alloc(&mut self) -> &mut dyn Example {
        &mut **self
    }

    fn reset(&mut self) {}
}

impl<T: Example + Default> Example for Vec<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Sequence(self)
    }
}

impl<T: Example + Default> Sequence for Vec<T> {
    fn rebuild(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), CoerceError> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(len)
            .map_err(|_| CoerceError::SequenceTooLong { len })?;
        for index in 0..len {
            let mut item = T::default();
            fill(index, &mut item)?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }
}

impl<T: Example + Default, const N: usize> Example for [T; N] {
    fn target(&mut self) -> Target<'_> {
        Target::Array(self)
    }
}

impl<T: Example + Default, const N: usize> Array for [T; N] {
    fn size(&self) -> usize {
        N
    }

    fn flattens_elements(&self) -> bool {
        T::is_struct() && is_flattenable(&mut T::default())
    }

    fn rebuild(&mut self, fill: &mut FillElement<'_>) -> Result<(), CoerceError> {
        let mut items: [T; N] = std::array::from_fn(|_| T::default());
        for (index, item) in items.iter_mut().enumerate() {
            fill(index, item)?;
        }
        *self = items;
        Ok(())
    }
}

/// Convert `entries` into typed pairs and hand each to `insert`, in order.
fn fill_entries<K, V>(
    entries: &[(&str, &str)],
    coerce: &mut CoerceEntry<'_>,
    mut insert: impl FnMut(K, V),
) -> Result<(), CoerceError>
where
    K: Example + Default,
    V: Example + Default,
{
    for (key_text, value_text) in entries {
        let mut key = K::default();
        coerce(key_text, &mut key)?;
        let mut value = V::default();
        coerce(value_text, &mut value)?;
        insert(key, value);
    }
    Ok(())
}

impl<K, V, S> Example for HashMap<K, V, S>
where
    K: Example + Default + Eq + Hash,
    V: Example + Default,
    S: BuildHasher + Default,
{
    fn target(&mut self) -> Target<'_> {
        Target::Mapping(self)
    }
}

impl<K, V, S> Mapping for HashMap<K, V, S>
where
    K: Example + Default + Eq + Hash,
    V: Example + Default,
    S: BuildHasher + Default,
{
    fn rebuild(
        &mut self,
        entries: &[(&str, &str)],
        coerce: &mut CoerceEntry<'_>,
    ) -> Result<(), CoerceError> {
        let mut map = HashMap::with_capacity_and_hasher(entries.len(), S::default());
        fill_entries(entries, coerce, |key, value| {
            map.insert(key, value);
        })?;
        *self = map;
        Ok(())
    }
}

impl<K, V> Example for BTreeMap<K, V>
where
    K: Example + Default + Ord,
    V: Example + Default,
{
    fn target(&mut self) -> Target<'_> {
        Target::Mapping(self)
    }
}

impl<K, V> Mapping for BTreeMap<K, V>
where
    K: Example + Default + Ord,
    V: Example + Default,
{
    fn rebuild(
        &mut self,
        entries: &[(&str, &str)],
        coerce: &mut CoerceEntry<'_>,
    ) -> Result<(), CoerceError> {
        let mut map = BTreeMap::new();
        fill_entries(entries, coerce, |key, value| {
            map.insert(key, value);
        })?;
        *self = map;
        Ok(())
    }
}

#[cfg(feature = "indexmap")]
impl<K, V, S> Example for indexmap::IndexMap<K, V, S>
where
    K: Example + Default + Eq + Hash,
    V: Example + Default,
    S: BuildHasher + Default,
{
    fn target(&mut self) -> Target<'_> {
        Target::Mapping(self)
    }
}

#[cfg(feature = "indexmap")]
impl<K, V, S> Mapping for indexmap::IndexMap<K, V, S>
where
    K: Example + Default + Eq + Hash,
    V: Example + Default,
    S: BuildHasher + Default,
{
    fn rebuild(
        &mut self,
        entries: &[(&str, &str)],
        coerce: &mut CoerceEntry<'_>,
    ) -> Result<(), CoerceError> {
        let mut map = indexmap::IndexMap::with_capacity_and_hasher(entries.len(), S::default());
        fill_entries(entries, coerce, |key, value| {
            map.insert(key, value);
        })?;
        *self = map;
        Ok(())
    }
}
